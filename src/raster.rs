use image::Rgb;
use nalgebra_glm as glm;
use owned_ttf_parser::OutlineBuilder;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::error::RenderError;
use crate::font::HandwritingFont;
use crate::layout::TextMeasure;
use crate::sampler::GlyphTransform;
use crate::surface::Surface;

/// The largest width or height of a surface which will be allocated.
pub const MAXIMUM_DIMENSION: u32 = 16_384;

/// Records the outline of a glyph as a path, in font units.
struct GlyphPathBuilder {
    builder: PathBuilder,
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// The matrix mapping font units to pixels for a glyph drawn at the pen position `(x, y)`.
///
/// The glyph is rotated around the pen position, then shifted off the (rotated) baseline,
/// and finally scaled with the y axis flipped to point down.
fn glyph_matrix(x: f32, y: f32, scale: f32, transform: &GlyphTransform) -> glm::Mat3 {
    let matrix = glm::translate2d(&glm::Mat3::identity(), &glm::vec2(x, y));
    let matrix = glm::rotate2d(&matrix, transform.rotation);
    let matrix = glm::translate2d(&matrix, &glm::vec2(0.0, transform.baseline_shift));
    glm::scale2d(&matrix, &glm::vec2(scale, -scale))
}

fn to_skia_transform(matrix: &glm::Mat3) -> Transform {
    Transform::from_row(
        matrix[(0, 0)],
        matrix[(1, 0)],
        matrix[(0, 1)],
        matrix[(1, 1)],
        matrix[(0, 2)],
        matrix[(1, 2)],
    )
}

/// A paint of the given color, whose alpha is the opacity clamped to full ink.
fn ink_paint(color: Rgb<u8>, opacity: f32) -> Paint<'static> {
    let [red, green, blue] = color.0;
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    let mut paint = Paint::default();
    paint.set_color_rgba8(red, green, blue, alpha);
    paint.anti_alias = true;
    paint
}

/// A surface backed by an in-memory pixmap, encoded to PNG once painted.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixmap: Pixmap,
    font: HandwritingFont,
    font_size: f32,
}

impl RasterSurface {
    /// Acquires a canvas of the given size, which is refused when empty or unreasonably large.
    pub fn new(
        width: u32,
        height: u32,
        font: HandwritingFont,
        font_size: f32,
    ) -> Result<Self, RenderError> {
        if width > MAXIMUM_DIMENSION || height > MAXIMUM_DIMENSION {
            return Err(RenderError::surface_unavailable(format!(
                "Refusing to allocate a canvas of {}x{} pixels",
                width, height
            )));
        }
        if !(font_size.is_finite() && font_size > 0.0) {
            return Err(RenderError::surface_unavailable(format!(
                "Invalid font size {}",
                font_size
            )));
        }
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RenderError::surface_unavailable(format!(
                "Unable to allocate a canvas of {}x{} pixels",
                width, height
            ))
        })?;

        Ok(RasterSurface {
            pixmap,
            font,
            font_size,
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }
}

impl TextMeasure for RasterSurface {
    fn glyph_width(&self, glyph: char) -> f32 {
        self.font.advance_width(glyph, self.font_size)
    }
}

impl Surface for RasterSurface {
    fn dimensions(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn fill_background(&mut self, color: Rgb<u8>) {
        let [red, green, blue] = color.0;
        self.pixmap.fill(Color::from_rgba8(red, green, blue, 255));
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb<u8>) {
        if from == to || width <= 0.0 {
            return;
        }
        let mut path_builder = PathBuilder::new();
        path_builder.move_to(from.0, from.1);
        path_builder.line_to(to.0, to.1);
        let Some(path) = path_builder.finish() else {
            return;
        };

        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &ink_paint(color, 1.0),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    fn paint_glyph(
        &mut self,
        glyph: char,
        x: f32,
        y: f32,
        transform: &GlyphTransform,
        color: Rgb<u8>,
    ) {
        let mut outline = GlyphPathBuilder {
            builder: PathBuilder::new(),
        };
        if !self.font.outline(glyph, &mut outline) {
            return;
        }
        let Some(path) = outline.builder.finish() else {
            return;
        };

        let matrix = glyph_matrix(x, y, self.font.scale(self.font_size), transform);
        // Ink pressure
        let paint = ink_paint(color, transform.stroke_thickness);
        self.pixmap.fill_path(
            &path,
            &paint,
            FillRule::Winding,
            to_skia_transform(&matrix),
            None,
        );
    }

    fn encode(&self) -> Result<Vec<u8>, RenderError> {
        let png_bytes = self.pixmap.encode_png().map_err(|error| {
            RenderError::encoding_failed("Failed to encode the page as PNG").caused_by(&error)
        })?;
        if png_bytes.is_empty() {
            return Err(RenderError::encoding_failed(
                "The PNG encoder produced no data",
            ));
        }

        Ok(png_bytes)
    }
}
