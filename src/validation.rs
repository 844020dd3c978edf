use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationErrorKind};

/// The largest accepted upload, 10 MiB.
pub const MAXIMUM_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

const UNSUPPORTED_TYPE_MESSAGE: &str = "Invalid file type. Please upload a PNG or JPG image.";
const TOO_LARGE_MESSAGE: &str = "File size exceeds 10MB limit. Please choose a smaller file.";
const CONTENT_MISMATCH_MESSAGE: &str =
    "The file content is not a PNG or JPG image. Please upload a valid image.";

/// The outcome of validating an upload, reported to the user instead of being raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    kind: Option<ValidationErrorKind>,
}

impl ValidationResult {
    pub fn accepted() -> Self {
        ValidationResult {
            valid: true,
            error: None,
            kind: None,
        }
    }

    fn refused(kind: ValidationErrorKind, message: &str) -> Self {
        ValidationResult {
            valid: false,
            error: Some(message.to_string()),
            kind: Some(kind),
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match (self.valid, self.error) {
            (true, _) => Ok(()),
            (false, message) => Err(ValidationError {
                kind: self.kind.unwrap_or(ValidationErrorKind::UnsupportedType),
                message: message.unwrap_or_default(),
            }),
        }
    }
}

/// Checks the declared type and the size of an uploaded image.
pub fn validate_image_upload(mime_type: &str, size: u64) -> ValidationResult {
    if !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return ValidationResult::refused(
            ValidationErrorKind::UnsupportedType,
            UNSUPPORTED_TYPE_MESSAGE,
        );
    }
    if size > MAXIMUM_FILE_SIZE {
        return ValidationResult::refused(ValidationErrorKind::TooLarge, TOO_LARGE_MESSAGE);
    }

    ValidationResult::accepted()
}

/// Like `validate_image_upload`, additionally checking that the bytes really are a PNG or
/// JPEG image as their signature tells.
pub fn validate_image_bytes(mime_type: &str, bytes: &[u8]) -> ValidationResult {
    let result = validate_image_upload(mime_type, bytes.len() as u64);
    if !result.valid {
        return result;
    }

    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) | Ok(ImageFormat::Jpeg) => ValidationResult::accepted(),
        Ok(format) => {
            log::debug!("Refused an upload detected as {:?}", format);
            ValidationResult::refused(
                ValidationErrorKind::ContentMismatch,
                CONTENT_MISMATCH_MESSAGE,
            )
        }
        Err(error) => {
            log::debug!("Refused an upload of unknown format: {}", error);
            ValidationResult::refused(
                ValidationErrorKind::ContentMismatch,
                CONTENT_MISMATCH_MESSAGE,
            )
        }
    }
}

/// The MIME type of an image file judging by its extension, as a browser would report it.
pub fn mime_type_from_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}
