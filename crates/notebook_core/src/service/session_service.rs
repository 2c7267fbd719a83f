//! Login session service.
//!
//! # Responsibility
//! - Validate login form input before reaching the auth provider.
//! - Hold the current user identity for the session.
//!
//! # Invariants
//! - A failed login leaves the previous session state untouched.
//! - Passwords are never logged.

use crate::model::user::{Credentials, User};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Generic user-facing message for any failed login.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";

const MOCK_TOKEN: &str = "mock-jwt-token";

/// Errors from login attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    UsernameRequired,
    PasswordRequired,
    /// Provider-side failure; the reason is opaque diagnostics text.
    Provider(String),
}

impl LoginError {
    /// Message a UI should display for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UsernameRequired => "Username is required",
            Self::PasswordRequired => "Password is required",
            Self::Provider(_) => LOGIN_FAILED_MESSAGE,
        }
    }
}

impl Display for LoginError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsernameRequired => write!(f, "username is required"),
            Self::PasswordRequired => write!(f, "password is required"),
            Self::Provider(reason) => write!(f, "auth provider failure: {reason}"),
        }
    }
}

impl Error for LoginError {}

impl Credentials {
    /// Checks that both fields are non-empty. Values are taken as typed.
    pub fn validate(&self) -> Result<(), LoginError> {
        if self.username.is_empty() {
            return Err(LoginError::UsernameRequired);
        }
        if self.password.is_empty() {
            return Err(LoginError::PasswordRequired);
        }
        Ok(())
    }
}

/// Source of user identities.
pub trait AuthProvider {
    fn authenticate(&self, credentials: &Credentials) -> Result<User, LoginError>;
}

/// Provider that accepts any credentials and fabricates a fixed identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAuthProvider;

impl AuthProvider for MockAuthProvider {
    fn authenticate(&self, credentials: &Credentials) -> Result<User, LoginError> {
        let username = &credentials.username;
        Ok(User {
            id: 1,
            username: username.clone(),
            email: format!("{username}@example.com"),
            token: MOCK_TOKEN.to_string(),
        })
    }
}

/// Current-user holder over an auth provider.
pub struct SessionService<A: AuthProvider> {
    provider: A,
    current_user: Option<User>,
}

impl SessionService<MockAuthProvider> {
    pub fn mock() -> Self {
        Self::new(MockAuthProvider)
    }
}

impl<A: AuthProvider> SessionService<A> {
    pub fn new(provider: A) -> Self {
        Self {
            provider,
            current_user: None,
        }
    }

    /// Validates credentials, authenticates and stores the user.
    pub fn login(&mut self, credentials: &Credentials) -> Result<&User, LoginError> {
        if let Err(err) = credentials.validate() {
            warn!("event=login module=session status=rejected reason={err}");
            return Err(err);
        }

        match self.provider.authenticate(credentials) {
            Ok(user) => {
                info!("event=login module=session status=ok user_id={}", user.id);
                Ok(self.current_user.insert(user))
            }
            Err(err) => {
                error!("event=login module=session status=error error={err}");
                Err(err)
            }
        }
    }

    /// Clears the current user. Returns whether someone was logged in.
    pub fn logout(&mut self) -> bool {
        let was_logged_in = self.current_user.take().is_some();
        if was_logged_in {
            info!("event=logout module=session status=ok");
        }
        was_logged_in
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }
}
