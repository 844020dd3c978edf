use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization as _;

use crate::error::ContextError;
use crate::sampler::SPACING_RANGE;
use crate::style::PaperBackground;

/// The smallest accepted line height and grid pitch, in pixels.
pub const MINIMUM_PITCH: f32 = 1.0;

/// Every dimension of the page, shared by the paper painter and the text layout so that
/// the ruling and the wrapping can never disagree. All values are in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConstants {
    pub page_width: u32,
    pub page_height: u32,
    /// Left and right margin of the writable column.
    pub margin: f32,
    /// Distance from the top edge where the grid and the margin rule begin.
    pub motif_top: f32,
    /// Distance from the bottom edge where every paper motif ends.
    pub motif_bottom: f32,
    pub first_baseline: f32,
    /// Minimum distance between the last baseline and the bottom edge.
    pub text_bottom_limit: f32,
    pub line_height: f32,
    /// How far below each text baseline the ruled line is printed.
    pub rule_offset: f32,
    pub graph_pitch: f32,
    /// Extra indent of the text on `margin` paper.
    pub margin_inset: f32,
    /// Gap between the margin rule and the indented text.
    pub margin_rule_gutter: f32,
    /// Room kept after every glyph while wrapping, for the extra spacing it may receive
    /// when painted.
    pub spacing_reserve: f32,
}

impl Default for LayoutConstants {
    /// An A4 sheet at 96 DPI.
    fn default() -> Self {
        LayoutConstants {
            page_width: 794,
            page_height: 1123,
            margin: 60.0,
            motif_top: 60.0,
            motif_bottom: 60.0,
            first_baseline: 100.0,
            text_bottom_limit: 100.0,
            line_height: 32.0,
            rule_offset: 6.0,
            graph_pitch: 20.0,
            margin_inset: 60.0,
            margin_rule_gutter: 10.0,
            spacing_reserve: SPACING_RANGE.end,
        }
    }
}

impl LayoutConstants {
    /// The indent of the text from the left margin for the given paper.
    pub fn indent(&self, paper: PaperBackground) -> f32 {
        if paper.indents_text() {
            self.margin_inset
        } else {
            0.0
        }
    }

    /// The horizontal position where every line of text starts.
    pub fn text_start_x(&self, paper: PaperBackground) -> f32 {
        self.margin + self.indent(paper)
    }

    /// The width available to a line of text, the budget of the word wrap.
    pub fn content_width(&self, paper: PaperBackground) -> f32 {
        self.page_width as f32 - 2.0 * self.margin - self.indent(paper)
    }

    /// The horizontal position of the vertical rule on `margin` paper.
    pub fn margin_rule_x(&self) -> f32 {
        self.margin + self.margin_inset - self.margin_rule_gutter
    }

    /// The lowest baseline on which a line may still be painted.
    pub fn last_baseline(&self) -> f32 {
        self.page_height as f32 - self.text_bottom_limit
    }

    /// The lowest coordinate reached by the paper motifs.
    pub fn motif_end_y(&self) -> f32 {
        self.page_height as f32 - self.motif_bottom
    }

    /// Checks that the constants describe a page which can be painted, every paper motif
    /// advances by at least `MINIMUM_PITCH` and every paper keeps a writable column.
    pub fn validate(&self) -> Result<(), ContextError> {
        let lengths = [
            ("margin", self.margin),
            ("motifTop", self.motif_top),
            ("motifBottom", self.motif_bottom),
            ("firstBaseline", self.first_baseline),
            ("textBottomLimit", self.text_bottom_limit),
            ("lineHeight", self.line_height),
            ("ruleOffset", self.rule_offset),
            ("graphPitch", self.graph_pitch),
            ("marginInset", self.margin_inset),
            ("marginRuleGutter", self.margin_rule_gutter),
            ("spacingReserve", self.spacing_reserve),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(ContextError::with_context(format!(
                    "The layout value {} must be a finite, non-negative length, not {}",
                    name, value
                )));
            }
        }
        if self.line_height < MINIMUM_PITCH || self.graph_pitch < MINIMUM_PITCH {
            return Err(ContextError::with_context(format!(
                "The line height ({}) and the graph pitch ({}) must be at least {} pixels",
                self.line_height, self.graph_pitch, MINIMUM_PITCH
            )));
        }
        if self.page_width == 0 || self.page_height == 0 {
            return Err(ContextError::with_context(format!(
                "The page of {}x{} pixels is empty",
                self.page_width, self.page_height
            )));
        }
        if self.content_width(PaperBackground::Margin) <= 0.0 {
            return Err(ContextError::with_context(format!(
                "The margins ({} on each side plus an inset of {}) leave no room on a page {} pixels wide",
                self.margin, self.margin_inset, self.page_width
            )));
        }

        Ok(())
    }

    /// How many lines of text fit on a single page.
    pub fn line_capacity(&self) -> usize {
        if self.first_baseline > self.last_baseline() || self.line_height <= 0.0 {
            return 0;
        }
        ((self.last_baseline() - self.first_baseline) / self.line_height).floor() as usize + 1
    }
}

/// Measures the natural width of text as it will be painted.
pub trait TextMeasure {
    fn glyph_width(&self, glyph: char) -> f32;

    fn text_width(&self, text: &str) -> f32 {
        text.chars().map(|glyph| self.glyph_width(glyph)).sum()
    }
}

impl<M: TextMeasure + ?Sized> TextMeasure for &M {
    fn glyph_width(&self, glyph: char) -> f32 {
        (**self).glyph_width(glyph)
    }

    fn text_width(&self, text: &str) -> f32 {
        (**self).text_width(text)
    }
}

/// A single line of text placed on the page, its words are separated by single spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaidOutLine {
    pub text: String,
    pub baseline_y: f32,
}

impl LaidOutLine {
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.text.split(' ')
    }
}

/// The placement of the text on one page, before anything is painted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    pub start_x: f32,
    pub content_width: f32,
    pub lines: Vec<LaidOutLine>,
    /// Whether some of the text did not fit on the page and was left out.
    pub truncated: bool,
}

/// Widens every visible glyph by a fixed reserve, spaces keep their natural width since the
/// gap between words is painted without any sampled spacing.
struct ReservedSpacing<'a, M: TextMeasure + ?Sized> {
    measure: &'a M,
    reserve: f32,
}

impl<M: TextMeasure + ?Sized> TextMeasure for ReservedSpacing<'_, M> {
    fn glyph_width(&self, glyph: char) -> f32 {
        let width = self.measure.glyph_width(glyph);
        if glyph.is_whitespace() {
            width
        } else {
            width + self.reserve
        }
    }
}

/// Greedily breaks a paragraph into lines no wider than `content_width`.
///
/// Words are appended to the current line as long as the line, a space and the word
/// together still fit, otherwise the line is flushed and the word starts the next one.
/// A word which alone is wider than `content_width` is kept whole on a line of its own.
pub fn wrap_paragraph<M: TextMeasure + ?Sized>(
    paragraph: &str,
    content_width: f32,
    measure: &M,
) -> Vec<String> {
    let space_width = measure.glyph_width(' ');
    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0.0;

    for word in paragraph.split_whitespace() {
        let word_width = measure.text_width(word);
        if current_line.is_empty() {
            current_line.push_str(word);
            current_width = word_width;
            continue;
        }

        let candidate_width = current_width + space_width + word_width;
        if candidate_width <= content_width {
            current_line.push(' ');
            current_line.push_str(word);
            current_width = candidate_width;
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line.push_str(word);
            current_width = word_width;
        }
    }
    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Places the whole text on a single page.
///
/// Every `\n` is a hard break, each resulting paragraph is word-wrapped on its own and an
/// empty paragraph leaves an empty line. Lines stop once the next baseline would fall below
/// the writable area, in which case the layout is marked as truncated.
///
/// Glyphs are measured wider by `spacing_reserve` than their natural advance, so that a
/// line still fits the column once every glyph has received its sampled spacing.
pub fn layout_page<M: TextMeasure + ?Sized>(
    text: &str,
    paper: PaperBackground,
    constants: &LayoutConstants,
    measure: &M,
) -> PageLayout {
    let content_width = constants.content_width(paper);
    let normalized_text = text.nfc().collect::<String>();

    let mut lines = Vec::new();
    let mut truncated = false;
    let mut baseline_y = constants.first_baseline;

    let reserved_measure = ReservedSpacing {
        measure,
        reserve: constants.spacing_reserve,
    };

    'paragraphs: for paragraph in normalized_text.lines() {
        let wrapped_lines = wrap_paragraph(paragraph, content_width, &reserved_measure);
        if wrapped_lines.is_empty() {
            baseline_y += constants.line_height;
            continue;
        }

        for line in wrapped_lines {
            if baseline_y > constants.last_baseline() {
                truncated = true;
                break 'paragraphs;
            }
            lines.push(LaidOutLine {
                text: line,
                baseline_y,
            });
            baseline_y += constants.line_height;
        }
    }

    if truncated {
        log::warn!(
            "The text does not fit on a single page, only {} lines were laid out",
            lines.len()
        );
    }
    log::debug!(
        "Laid out {} lines within a content width of {}",
        lines.len(),
        content_width
    );

    PageLayout {
        start_x: constants.text_start_x(paper),
        content_width,
        lines,
        truncated,
    }
}
