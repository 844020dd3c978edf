use owned_ttf_parser::{AsFaceRef as _, Face, GlyphId, OutlineBuilder, OwnedFace};
use std::path::Path;
use std::sync::Arc;

use crate::error::RenderError;

/// The font used when no other font is configured.
static BUNDLED_FONT: &[u8] = include_bytes!("../fonts/DejaVu_Sans/DejaVuSans-Oblique.ttf");

/// A font face loaded from a TTF font, together with its measure of units per em.
///
/// The face is reference counted, so cloning the font is cheap and a single font can be
/// shared by renders running on different threads.
#[derive(Clone, Debug)]
pub struct HandwritingFont {
    /// The underlying font face which is represented through the `ttf_parser` crate.
    inner: Arc<OwnedFace>,
    /// The number of units per em of the font face.
    units_per_em: u16,
}

impl HandwritingFont {
    /// Constructs a font face from the underlying raw data extracted from the TTF font file.
    pub fn from_bytes(data: &[u8]) -> Result<Self, RenderError> {
        let face = OwnedFace::from_vec(data.to_vec(), 0).map_err(|error| {
            RenderError::surface_unavailable("Failed to parse the font").caused_by(&error)
        })?;
        let units_per_em = face.as_face_ref().units_per_em();
        if units_per_em == 0 {
            return Err(RenderError::surface_unavailable(
                "The font declares zero units per em",
            ));
        }

        Ok(Self {
            inner: Arc::new(face),
            units_per_em,
        })
    }

    pub fn from_path(font_path: &Path) -> Result<Self, RenderError> {
        let data = std::fs::read(font_path).map_err(|error| {
            RenderError::surface_unavailable(format!("Failed to read the font {:?}", font_path))
                .caused_by(&error)
        })?;
        Self::from_bytes(&data)
    }

    /// The font shipped with the crate.
    pub fn bundled() -> Result<Self, RenderError> {
        Self::from_bytes(BUNDLED_FONT)
    }

    /// Retrieve the underlying font face as a reference.
    fn face(&self) -> &Face<'_> {
        self.inner.as_face_ref()
    }

    /// The glyph of a character, or the `.notdef` glyph when the font lacks it.
    fn glyph_id(&self, character: char) -> GlyphId {
        self.face().glyph_index(character).unwrap_or(GlyphId(0))
    }

    /// The factor converting font units into pixels at the given font size.
    pub fn scale(&self, font_size: f32) -> f32 {
        font_size / f32::from(self.units_per_em)
    }

    /// The natural horizontal advance of a character, in pixels.
    pub fn advance_width(&self, character: char, font_size: f32) -> f32 {
        let advance = self
            .face()
            .glyph_hor_advance(self.glyph_id(character))
            .unwrap_or(0);
        f32::from(advance) * self.scale(font_size)
    }

    /// The distance from the baseline to the top of the tallest glyphs, in pixels.
    pub fn ascent(&self, font_size: f32) -> f32 {
        f32::from(self.face().ascender()) * self.scale(font_size)
    }

    /// Feeds the outline of a character, in font units, to the given builder.
    ///
    /// Returns `false` when the glyph has no outline, as is the case for spaces.
    pub fn outline(&self, character: char, builder: &mut dyn OutlineBuilder) -> bool {
        self.face()
            .outline_glyph(self.glyph_id(character), builder)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SegmentCounter(usize);

    impl OutlineBuilder for SegmentCounter {
        fn move_to(&mut self, _x: f32, _y: f32) {}

        fn line_to(&mut self, _x: f32, _y: f32) {
            self.0 += 1;
        }

        fn quad_to(&mut self, _x1: f32, _y1: f32, _x: f32, _y: f32) {
            self.0 += 1;
        }

        fn curve_to(&mut self, _x1: f32, _y1: f32, _x2: f32, _y2: f32, _x: f32, _y: f32) {
            self.0 += 1;
        }

        fn close(&mut self) {}
    }

    #[test]
    fn the_bundled_font_loads() {
        let font = HandwritingFont::bundled().unwrap();
        assert!(font.ascent(22.0) > 10.0);
        assert!(font.advance_width('m', 22.0) > font.advance_width('i', 22.0));
        assert!(font.advance_width(' ', 22.0) > 0.0);
    }

    #[test]
    fn advances_scale_with_the_font_size() {
        let font = HandwritingFont::bundled().unwrap();
        let small = font.advance_width('a', 11.0);
        let large = font.advance_width('a', 22.0);
        assert!((large - 2.0 * small).abs() < 1e-3);
    }

    #[test]
    fn spaces_have_no_outline_but_letters_do() {
        let font = HandwritingFont::bundled().unwrap();
        let mut counter = SegmentCounter(0);
        assert!(!font.outline(' ', &mut counter));
        assert!(font.outline('g', &mut counter));
        assert!(counter.0 > 0);
    }

    #[test]
    fn garbage_is_not_a_font() {
        let error = HandwritingFont::from_bytes(b"definitely not a font").unwrap_err();
        assert_eq!(error.kind, crate::error::RenderErrorKind::SurfaceUnavailable);
    }
}
