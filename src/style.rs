use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::error::ContextError;

/// The two available inks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InkColor {
    #[default]
    Blue,
    Black,
}

impl InkColor {
    pub const BLUE: Rgb<u8> = Rgb([0x1e, 0x3a, 0x8a]);
    pub const BLACK: Rgb<u8> = Rgb([0x1f, 0x29, 0x37]);

    pub fn rgb(self) -> Rgb<u8> {
        match self {
            InkColor::Blue => InkColor::BLUE,
            InkColor::Black => InkColor::BLACK,
        }
    }
}

/// The motif printed on the paper underneath the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PaperBackground {
    #[default]
    Ruled,
    Graph,
    /// Ruled paper with a vertical margin rule, the text is indented past it.
    Margin,
}

impl PaperBackground {
    /// Whether the text is indented by the margin inset on this paper.
    pub fn indents_text(self) -> bool {
        matches!(self, PaperBackground::Margin)
    }
}

/// The complete set of visual choices for a render, compared by value only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleConfig {
    pub ink_color: InkColor,
    pub paper_background: PaperBackground,
}

impl StyleConfig {
    pub fn new(ink_color: InkColor, paper_background: PaperBackground) -> Self {
        StyleConfig {
            ink_color,
            paper_background,
        }
    }

    /// Parses a style from its JSON form, e.g. `{"inkColor": "blue", "paperBackground": "ruled"}`.
    ///
    /// Any value outside of the enumerated ones is refused here, so that the renderer
    /// only ever receives well-formed styles.
    pub fn from_json(json: &str) -> Result<Self, ContextError> {
        serde_json::from_str(json)
            .map_err(|error| ContextError::with_error("Failed to parse the style", &error))
    }
}

impl std::str::FromStr for InkColor {
    type Err = ContextError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "blue" => Ok(InkColor::Blue),
            "black" => Ok(InkColor::Black),
            other => Err(ContextError::with_context(format!(
                "Unknown ink color {:?}, expected \"blue\" or \"black\"",
                other
            ))),
        }
    }
}

impl std::str::FromStr for PaperBackground {
    type Err = ContextError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "ruled" => Ok(PaperBackground::Ruled),
            "graph" => Ok(PaperBackground::Graph),
            "margin" => Ok(PaperBackground::Margin),
            other => Err(ContextError::with_context(format!(
                "Unknown paper background {:?}, expected \"ruled\", \"graph\" or \"margin\"",
                other
            ))),
        }
    }
}
