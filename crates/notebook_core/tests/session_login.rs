use notebook_core::{
    AuthProvider, Credentials, LoginError, SessionService, User, LOGIN_FAILED_MESSAGE,
};

struct RejectingProvider;

impl AuthProvider for RejectingProvider {
    fn authenticate(&self, _credentials: &Credentials) -> Result<User, LoginError> {
        Err(LoginError::Provider("connection refused".to_string()))
    }
}

#[test]
fn mock_login_fabricates_identity_from_username() {
    let mut session = SessionService::mock();
    let user = session
        .login(&Credentials::new("alice", "secret"))
        .unwrap()
        .clone();

    assert_eq!(user.id, 1);
    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.token, "mock-jwt-token");
    assert_eq!(session.current_user(), Some(&user));
}

#[test]
fn login_requires_username_and_password() {
    let mut session = SessionService::mock();

    assert_eq!(
        session.login(&Credentials::new("", "secret")).unwrap_err(),
        LoginError::UsernameRequired
    );
    assert_eq!(
        session.login(&Credentials::new("alice", "")).unwrap_err(),
        LoginError::PasswordRequired
    );
    assert!(!session.is_authenticated());
}

#[test]
fn login_takes_username_and_password_as_typed() {
    let mut session = SessionService::mock();
    let user = session
        .login(&Credentials::new(" Al ", "  "))
        .unwrap()
        .clone();

    assert_eq!(user.username, " Al ");
    assert_eq!(user.email, " Al @example.com");

    let blank = session
        .login(&Credentials::new("  ", "pw"))
        .unwrap()
        .clone();
    assert_eq!(blank.username, "  ");
    assert!(session.is_authenticated());
}

#[test]
fn provider_failure_keeps_previous_session_and_shows_generic_message() {
    let mut session = SessionService::new(RejectingProvider);
    let err = session
        .login(&Credentials::new("alice", "secret"))
        .unwrap_err();

    assert_eq!(err.user_message(), LOGIN_FAILED_MESSAGE);
    assert!(err.to_string().contains("connection refused"));
    assert!(session.current_user().is_none());
}

#[test]
fn logout_clears_current_user_once() {
    let mut session = SessionService::mock();
    session.login(&Credentials::new("bob", "pw")).unwrap();

    assert!(session.logout());
    assert!(!session.logout());
    assert!(session.current_user().is_none());
}
