//! Note domain model, editor drafts and image attachments.
//!
//! # Responsibility
//! - Define the stored `Note` record and the `NoteDraft` form payload.
//! - Convert picked image files into inline `data:` URLs for preview.
//!
//! # Invariants
//! - `created_at` is set once by the store and never rewritten.
//! - `updated_at >= created_at`.
//! - Image order is preserved exactly as attached.

use crate::model::category::PageKey;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Store-assigned note identifier.
pub type NoteId = i64;

static DATA_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:(image/[A-Za-z0-9.+-]+);base64,([A-Za-z0-9+/]*={0,2})$")
        .expect("valid data url regex")
});

/// User-authored entry owned by one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Refreshed on every mutation.
    pub updated_at: i64,
    /// Serialized as `pageId` to match external schema naming.
    #[serde(rename = "pageId")]
    pub page: PageKey,
    pub images: Vec<NoteImage>,
}

/// Image attached to a note, rendered from `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteImage {
    pub url: String,
    pub name: String,
}

/// Errors from image attachment conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// File extension does not map to a known `image/*` type.
    UnsupportedType(String),
    /// File has no bytes.
    Empty(String),
    /// URL is not a base64 `data:image/...` URL.
    MalformedDataUrl(String),
}

impl Display for ImageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedType(name) => write!(f, "unsupported image type: `{name}`"),
            Self::Empty(name) => write!(f, "image file is empty: `{name}`"),
            Self::MalformedDataUrl(name) => write!(f, "malformed image data url: `{name}`"),
        }
    }
}

impl Error for ImageError {}

impl NoteImage {
    /// Builds an inline preview from raw file bytes.
    ///
    /// The mime type is inferred from the file extension of `name`.
    ///
    /// # Errors
    /// - `Empty` when `bytes` is empty.
    /// - `UnsupportedType` when the extension is not a known image type.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, ImageError> {
        let name = name.into();
        if bytes.is_empty() {
            return Err(ImageError::Empty(name));
        }
        let mime =
            image_mime_type(&name).ok_or_else(|| ImageError::UnsupportedType(name.clone()))?;
        Ok(Self {
            url: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
            name,
        })
    }

    /// Accepts an already-encoded `data:image/...;base64,` URL.
    ///
    /// # Errors
    /// - `MalformedDataUrl` when the URL is not base64 `image/*` data.
    /// - `Empty` when the payload decodes to no bytes.
    pub fn from_data_url(
        name: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<Self, ImageError> {
        let name = name.into();
        let url = url.into();
        let payload = DATA_URL_RE
            .captures(&url)
            .and_then(|caps| caps.get(2))
            .map(|m| m.as_str())
            .ok_or_else(|| ImageError::MalformedDataUrl(name.clone()))?;
        match STANDARD.decode(payload) {
            Ok(bytes) if bytes.is_empty() => Err(ImageError::Empty(name)),
            Ok(_) => Ok(Self { url, name }),
            Err(_) => Err(ImageError::MalformedDataUrl(name)),
        }
    }

    /// Returns the `image/*` mime type for data URLs.
    pub fn mime_type(&self) -> Option<&str> {
        DATA_URL_RE
            .captures(&self.url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

fn image_mime_type(name: &str) -> Option<&'static str> {
    let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Form-level validation failures for note drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    TitleRequired,
    ContentRequired,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TitleRequired => write!(f, "note title is required"),
            Self::ContentRequired => write!(f, "note content is required"),
        }
    }
}

impl Error for NoteValidationError {}

/// Editable note payload submitted by the editor for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    #[serde(rename = "pageId")]
    pub page: PageKey,
    #[serde(default)]
    pub images: Vec<NoteImage>,
}

impl NoteDraft {
    pub fn new(page: PageKey, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            page,
            images: Vec::new(),
        }
    }

    /// Prefills a draft from a stored note, for editing.
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            page: note.page,
            images: note.images.clone(),
        }
    }

    /// Checks the fields the editor marks as required.
    ///
    /// Only empty strings fail; whitespace-only text is a value.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.is_empty() {
            return Err(NoteValidationError::TitleRequired);
        }
        if self.content.is_empty() {
            return Err(NoteValidationError::ContentRequired);
        }
        Ok(())
    }

    pub fn add_image(&mut self, image: NoteImage) {
        self.images.push(image);
    }

    /// Removes the image at `index`, returning it when the index was valid.
    pub fn remove_image(&mut self, index: usize) -> Option<NoteImage> {
        if index < self.images.len() {
            Some(self.images.remove(index))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageError, NoteDraft, NoteImage, NoteValidationError};
    use crate::model::category::PageKey;

    #[test]
    fn from_bytes_builds_base64_data_url() {
        let image = NoteImage::from_bytes("cover.PNG", b"abc").unwrap();
        assert_eq!(image.url, "data:image/png;base64,YWJj");
        assert_eq!(image.name, "cover.PNG");
        assert_eq!(image.mime_type(), Some("image/png"));
    }

    #[test]
    fn from_bytes_rejects_non_images_and_empty_files() {
        assert_eq!(
            NoteImage::from_bytes("notes.txt", b"abc"),
            Err(ImageError::UnsupportedType("notes.txt".to_string()))
        );
        assert_eq!(
            NoteImage::from_bytes("empty.png", b""),
            Err(ImageError::Empty("empty.png".to_string()))
        );
    }

    #[test]
    fn from_data_url_requires_image_base64_payload() {
        assert!(NoteImage::from_data_url("a.gif", "data:image/gif;base64,R0lGODlh=").is_err());
        assert!(NoteImage::from_data_url("a.gif", "data:image/gif;base64,R0lGODlh").is_ok());
        assert!(NoteImage::from_data_url("a.txt", "data:text/plain;base64,YWJj").is_err());
        assert!(NoteImage::from_data_url("a.png", "https://example.com/a.png").is_err());
    }

    #[test]
    fn from_data_url_rejects_empty_payload_like_empty_file() {
        assert_eq!(
            NoteImage::from_data_url("a.png", "data:image/png;base64,"),
            Err(ImageError::Empty("a.png".to_string()))
        );
        assert_eq!(
            NoteImage::from_bytes("a.png", b""),
            Err(ImageError::Empty("a.png".to_string()))
        );
    }

    #[test]
    fn validate_requires_title_then_content() {
        let page = PageKey::new(1, 1);
        assert_eq!(
            NoteDraft::new(page, "", "body").validate(),
            Err(NoteValidationError::TitleRequired)
        );
        assert_eq!(
            NoteDraft::new(page, "Title", "").validate(),
            Err(NoteValidationError::ContentRequired)
        );
        assert!(NoteDraft::new(page, "Title", "body").validate().is_ok());
    }

    #[test]
    fn validate_accepts_whitespace_only_text() {
        let page = PageKey::new(1, 1);
        assert!(NoteDraft::new(page, " ", "body").validate().is_ok());
        assert!(NoteDraft::new(page, "Title", "\n").validate().is_ok());
    }

    #[test]
    fn remove_image_ignores_out_of_range_index() {
        let mut draft = NoteDraft::new(PageKey::new(1, 1), "Title", "body");
        draft.add_image(NoteImage::from_bytes("a.png", b"a").unwrap());
        draft.add_image(NoteImage::from_bytes("b.png", b"b").unwrap());

        assert!(draft.remove_image(5).is_none());
        let removed = draft.remove_image(0).unwrap();
        assert_eq!(removed.name, "a.png");
        assert_eq!(draft.images.len(), 1);
        assert_eq!(draft.images[0].name, "b.png");
    }
}
