use serde::{Deserialize, Serialize};

/// A struct that represents an error with a context and possibly the propagated source error.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ContextError {
    pub context: String,
    pub source_error: Option<String>,
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_with_source(formatter, &self.context, self.source_error.as_deref())
    }
}

impl std::error::Error for ContextError {}

impl ContextError {
    /// Create a new `ContextError` with the given context.
    pub fn with_context<S: Into<String>>(context: S) -> ContextError {
        ContextError {
            context: context.into(),
            source_error: None,
        }
    }

    /// Create a new `ContextError` with the given context and source error.
    pub fn with_error<S: Into<String>>(context: S, error: &dyn std::error::Error) -> ContextError {
        ContextError {
            context: context.into(),
            source_error: Some(error.to_string()),
        }
    }
}

/// The reason why a page could not be rendered.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RenderErrorKind {
    /// The drawing surface, or a resource it needs such as the font, could not be acquired.
    SurfaceUnavailable,
    /// The finished canvas could not be encoded, or the encoder produced no data.
    EncodingFailed,
}

impl std::fmt::Display for RenderErrorKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderErrorKind::SurfaceUnavailable => write!(formatter, "surface unavailable"),
            RenderErrorKind::EncodingFailed => write!(formatter, "encoding failed"),
        }
    }
}

/// A recoverable rendering failure: the caller may retry, nothing partial is ever returned.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RenderError {
    pub kind: RenderErrorKind,
    pub context: String,
    pub source_error: Option<String>,
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "[{}] ", self.kind)?;
        write_with_source(formatter, &self.context, self.source_error.as_deref())
    }
}

impl std::error::Error for RenderError {}

impl RenderError {
    pub fn surface_unavailable<S: Into<String>>(context: S) -> RenderError {
        RenderError {
            kind: RenderErrorKind::SurfaceUnavailable,
            context: context.into(),
            source_error: None,
        }
    }

    pub fn encoding_failed<S: Into<String>>(context: S) -> RenderError {
        RenderError {
            kind: RenderErrorKind::EncodingFailed,
            context: context.into(),
            source_error: None,
        }
    }

    /// Attach the propagated source error to this error.
    pub fn caused_by(mut self, error: &dyn std::error::Error) -> RenderError {
        self.source_error = Some(error.to_string());
        self
    }
}

impl From<RenderError> for ContextError {
    fn from(error: RenderError) -> Self {
        ContextError::with_error("Failed to render the page", &error)
    }
}

/// The reason why an uploaded image was refused before any text was extracted from it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ValidationErrorKind {
    UnsupportedType,
    TooLarge,
    ContentMismatch,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

fn write_with_source(
    formatter: &mut std::fmt::Formatter<'_>,
    context: &str,
    source_error: Option<&str>,
) -> std::fmt::Result {
    match source_error {
        Some(source_error) => write!(
            formatter,
            "{}: {}",
            context,
            minimize_first_letter(source_error.to_string()),
        ),
        None => write!(formatter, "{}", context),
    }
}

/// Minimizes the first letter of a string, it is used for standardizing the error message.
fn minimize_first_letter(string: String) -> String {
    let mut characters = string.chars();
    match characters.next() {
        None => String::new(),
        Some(character) => character.to_lowercase().chain(characters).collect(),
    }
}
