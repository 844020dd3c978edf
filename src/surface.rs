use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::layout::TextMeasure;
use crate::sampler::GlyphTransform;

/// The drawing operations needed to produce a page, independent of any backend.
///
/// Coordinates are in pixels with the origin in the top-left corner of the page, glyphs
/// are positioned by the left end of their baseline.
pub trait Surface: TextMeasure {
    fn dimensions(&self) -> (u32, u32);

    /// Covers the whole surface with a uniform color.
    fn fill_background(&mut self, color: Rgb<u8>);

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb<u8>);

    /// Paints a glyph with its pen position at `(x, y)`, applying the rotation, baseline shift
    /// and stroke thickness of the transform. The spacing of the transform is left to the caller.
    fn paint_glyph(
        &mut self,
        glyph: char,
        x: f32,
        y: f32,
        transform: &GlyphTransform,
        color: Rgb<u8>,
    );

    /// Flattens everything painted so far into encoded bytes.
    fn encode(&self) -> Result<Vec<u8>, RenderError>;
}

/// A drawing operation as recorded by `RecordingSurface`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "kebab-case")]
pub enum SurfaceCall {
    FillBackground {
        color: [u8; 3],
    },
    StrokeLine {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: [u8; 3],
    },
    PaintGlyph {
        glyph: char,
        x: f32,
        y: f32,
        transform: GlyphTransform,
        color: [u8; 3],
    },
}

/// A surface which paints nothing and records every call instead, every glyph has
/// the same advance.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    glyph_advance: f32,
    calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32, glyph_advance: f32) -> Self {
        RecordingSurface {
            width,
            height,
            glyph_advance,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// The painted glyphs in painting order, as `(glyph, x, y)`.
    pub fn painted_glyphs(&self) -> Vec<(char, f32, f32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::PaintGlyph { glyph, x, y, .. } => Some((*glyph, *x, *y)),
                _ => None,
            })
            .collect()
    }

    /// The stroked lines, as `(from, to)`.
    pub fn stroked_lines(&self) -> Vec<((f32, f32), (f32, f32))> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::StrokeLine { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl TextMeasure for RecordingSurface {
    fn glyph_width(&self, _glyph: char) -> f32 {
        self.glyph_advance
    }
}

impl Surface for RecordingSurface {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill_background(&mut self, color: Rgb<u8>) {
        self.calls.push(SurfaceCall::FillBackground { color: color.0 });
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb<u8>) {
        self.calls.push(SurfaceCall::StrokeLine {
            from,
            to,
            width,
            color: color.0,
        });
    }

    fn paint_glyph(
        &mut self,
        glyph: char,
        x: f32,
        y: f32,
        transform: &GlyphTransform,
        color: Rgb<u8>,
    ) {
        self.calls.push(SurfaceCall::PaintGlyph {
            glyph,
            x,
            y,
            transform: *transform,
            color: color.0,
        });
    }

    /// The recorded calls as JSON.
    fn encode(&self) -> Result<Vec<u8>, RenderError> {
        serde_json::to_vec(&self.calls).map_err(|error| {
            RenderError::encoding_failed("Failed to serialize the recorded calls").caused_by(&error)
        })
    }
}
