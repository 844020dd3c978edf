use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ContextError, RenderError};
use crate::font::HandwritingFont;
use crate::layout::LayoutConstants;

/// Everything about the renderer that is fixed across renders, usually read from a JSON file
/// such as:
///
/// ```json
/// {
///     "fontFilePath": "fonts/Caveat-Regular.ttf",
///     "fontSize": 22.0,
///     "layout": { "lineHeight": 32.0, "marginInset": 60.0 }
/// }
/// ```
///
/// Missing fields take their default value.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RendererConfiguration {
    /// The TTF font to write with, the bundled font is used when absent.
    pub font_file_path: Option<PathBuf>,
    /// The font size in pixels.
    pub font_size: f32,
    pub layout: LayoutConstants,
}

impl Default for RendererConfiguration {
    fn default() -> Self {
        RendererConfiguration {
            font_file_path: None,
            font_size: 22.0,
            layout: LayoutConstants::default(),
        }
    }
}

impl RendererConfiguration {
    pub fn from_path(configuration_file_path: &Path) -> Result<Self, ContextError> {
        let configuration_file_contents = std::fs::read_to_string(configuration_file_path)
            .map_err(|error| {
                ContextError::with_error(
                    format!(
                        "Failed to read the configuration file {:?}",
                        configuration_file_path
                    ),
                    &error,
                )
            })?;
        let configuration: RendererConfiguration =
            serde_json::from_str(&configuration_file_contents).map_err(|error| {
                ContextError::with_error(
                    format!(
                        "Failed to parse the configuration file {:?}",
                        configuration_file_path
                    ),
                    &error,
                )
            })?;
        configuration.validate().map_err(|error| {
            ContextError::with_error(
                format!(
                    "Invalid configuration in the file {:?}",
                    configuration_file_path
                ),
                &error,
            )
        })?;

        Ok(configuration)
    }

    /// Checks the font size and the page layout, see `LayoutConstants::validate`.
    pub fn validate(&self) -> Result<(), ContextError> {
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(ContextError::with_context(format!(
                "The font size must be a positive number of pixels, not {}",
                self.font_size
            )));
        }
        self.layout.validate()
    }

    /// Loads the configured font, or the bundled one.
    pub fn load_font(&self) -> Result<HandwritingFont, RenderError> {
        match &self.font_file_path {
            Some(font_file_path) => HandwritingFont::from_path(font_file_path),
            None => HandwritingFont::bundled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_their_defaults() {
        let configuration: RendererConfiguration =
            serde_json::from_str(r#"{"layout": {"lineHeight": 40.0}}"#).unwrap();
        assert_eq!(configuration.font_size, 22.0);
        assert_eq!(configuration.font_file_path, None);
        assert_eq!(configuration.layout.line_height, 40.0);
        assert_eq!(configuration.layout.page_width, 794);
    }

    #[test]
    fn configuration_is_read_from_a_file() {
        let configuration_path =
            std::env::temp_dir().join(format!("handscript-configuration-{}.json", std::process::id()));
        std::fs::write(&configuration_path, r#"{"fontSize": 30.0}"#).unwrap();
        let configuration = RendererConfiguration::from_path(&configuration_path).unwrap();
        std::fs::remove_file(&configuration_path).unwrap();
        assert_eq!(configuration.font_size, 30.0);
    }

    #[test]
    fn a_zero_line_height_is_refused_when_reading_the_file() {
        let configuration_path = std::env::temp_dir().join(format!(
            "handscript-zero-line-height-{}.json",
            std::process::id()
        ));
        std::fs::write(&configuration_path, r#"{"layout": {"lineHeight": 0.0}}"#).unwrap();
        let result = RendererConfiguration::from_path(&configuration_path);
        std::fs::remove_file(&configuration_path).unwrap();
        let error = result.unwrap_err();
        assert!(error.context.starts_with("Invalid configuration"));
    }

    #[test]
    fn degenerate_layouts_are_refused() {
        let invalid_layouts = [
            LayoutConstants {
                line_height: 0.0,
                ..LayoutConstants::default()
            },
            LayoutConstants {
                line_height: -32.0,
                ..LayoutConstants::default()
            },
            LayoutConstants {
                graph_pitch: 1e-6,
                ..LayoutConstants::default()
            },
            LayoutConstants {
                margin: 300.0,
                margin_inset: 200.0,
                ..LayoutConstants::default()
            },
            LayoutConstants {
                first_baseline: f32::NAN,
                ..LayoutConstants::default()
            },
        ];
        for layout in invalid_layouts {
            let configuration = RendererConfiguration {
                layout,
                ..RendererConfiguration::default()
            };
            assert!(configuration.validate().is_err(), "{:?}", layout);
        }

        let configuration = RendererConfiguration {
            font_size: 0.0,
            ..RendererConfiguration::default()
        };
        assert!(configuration.validate().is_err());
        assert!(RendererConfiguration::default().validate().is_ok());
    }

    #[test]
    fn an_unreadable_font_is_a_surface_failure() {
        let configuration = RendererConfiguration {
            font_file_path: Some(PathBuf::from("/nonexistent/font.ttf")),
            ..RendererConfiguration::default()
        };
        let error = configuration.load_font().unwrap_err();
        assert_eq!(error.kind, crate::error::RenderErrorKind::SurfaceUnavailable);
    }
}
