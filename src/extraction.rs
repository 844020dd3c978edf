use crate::error::ContextError;

/// Extracts the text shown in an image, reporting its progress as a percentage.
pub trait TextExtractor {
    fn extract_text(
        &self,
        image_bytes: &[u8],
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<String, ContextError>;
}

/// The text handed out by `PlaceholderExtractor`.
pub const PLACEHOLDER_TEXT: &str = "This is a demo text extraction.

To enable real text recognition, an OCR engine needs to be plugged in as a text extractor.

For now, you can manually type or paste your text instead.

The handwriting conversion and page rendering features are fully functional!";

/// The progress steps reported by `PlaceholderExtractor`.
pub const PLACEHOLDER_PROGRESS_STEPS: [u8; 5] = [10, 30, 60, 90, 100];

/// Stands in for a real text recognition engine: the image is ignored and a fixed text is
/// returned after walking through the usual progress steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderExtractor;

impl TextExtractor for PlaceholderExtractor {
    fn extract_text(
        &self,
        image_bytes: &[u8],
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<String, ContextError> {
        log::debug!(
            "Ignoring the {} bytes of the image, returning the placeholder text",
            image_bytes.len()
        );
        for step in PLACEHOLDER_PROGRESS_STEPS {
            on_progress(step);
        }
        Ok(PLACEHOLDER_TEXT.to_string())
    }
}

/// Runs an extractor while guaranteeing that the reported progress never decreases, never
/// exceeds 100 and ends at 100 once the extraction succeeds.
pub fn extract_with_progress<E: TextExtractor + ?Sized>(
    extractor: &E,
    image_bytes: &[u8],
    on_progress: &mut dyn FnMut(u8),
) -> Result<String, ContextError> {
    let mut last_progress = 0;
    on_progress(last_progress);

    let text = {
        let mut monotonic_progress = |progress: u8| {
            let progress = progress.min(100);
            if progress > last_progress {
                last_progress = progress;
                on_progress(progress);
            }
        };
        extractor.extract_text(image_bytes, &mut monotonic_progress)?
    };

    if last_progress < 100 {
        on_progress(100);
    }
    Ok(text)
}
