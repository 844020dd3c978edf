use image::Rgb;

use crate::config::RendererConfiguration;
use crate::error::RenderError;
use crate::font::HandwritingFont;
use crate::layout::{layout_page, LaidOutLine, LayoutConstants, PageLayout};
use crate::paper::paint_paper;
use crate::raster::RasterSurface;
use crate::sampler::{RandomSampler, VariationSampler};
use crate::style::StyleConfig;
use crate::surface::Surface;

/// A finished page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    /// The page encoded as PNG.
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub lines_painted: usize,
    /// Whether part of the text did not fit on the page and was left out.
    pub truncated: bool,
}

/// Turns text into a handwritten-looking page.
///
/// The renderer only holds read-only state, every render acquires its own canvas, so a
/// single renderer can serve concurrent renders.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    configuration: RendererConfiguration,
    font: HandwritingFont,
}

impl PageRenderer {
    /// Loads the configured font, refusing a configuration whose page cannot be painted.
    pub fn new(configuration: RendererConfiguration) -> Result<Self, RenderError> {
        configuration.validate().map_err(|error| {
            RenderError::surface_unavailable("Invalid renderer configuration").caused_by(&error)
        })?;
        let font = configuration.load_font()?;
        Ok(PageRenderer {
            configuration,
            font,
        })
    }

    pub fn with_default_font() -> Result<Self, RenderError> {
        PageRenderer::new(RendererConfiguration::default())
    }

    pub fn configuration(&self) -> &RendererConfiguration {
        &self.configuration
    }

    /// Renders the text with freshly drawn variations, rendering the same text twice gives
    /// two different pages.
    pub fn render(&self, text: &str, style: &StyleConfig) -> Result<RenderedPage, RenderError> {
        self.render_with_sampler(text, style, &mut RandomSampler::from_entropy())
    }

    /// Renders the text drawing the variations of every glyph from the given sampler.
    pub fn render_with_sampler<V: VariationSampler + ?Sized>(
        &self,
        text: &str,
        style: &StyleConfig,
        sampler: &mut V,
    ) -> Result<RenderedPage, RenderError> {
        let constants = &self.configuration.layout;
        let mut surface = RasterSurface::new(
            constants.page_width,
            constants.page_height,
            self.font.clone(),
            self.configuration.font_size,
        )?;
        let page_layout = paint_page(&mut surface, sampler, text, style, constants)?;
        let png = surface.encode()?;

        log::info!(
            "Rendered {} lines with {:?} ink on {:?} paper into {} bytes",
            page_layout.lines.len(),
            style.ink_color,
            style.paper_background,
            png.len()
        );

        Ok(RenderedPage {
            png,
            width: constants.page_width,
            height: constants.page_height,
            lines_painted: page_layout.lines.len(),
            truncated: page_layout.truncated,
        })
    }
}

/// Paints the paper and the text onto any surface, returning where the text was placed.
///
/// The surface must have the dimensions of the page described by `constants`.
pub fn paint_page<S: Surface + ?Sized, V: VariationSampler + ?Sized>(
    surface: &mut S,
    sampler: &mut V,
    text: &str,
    style: &StyleConfig,
    constants: &LayoutConstants,
) -> Result<PageLayout, RenderError> {
    let surface_dimensions = surface.dimensions();
    if surface_dimensions != (constants.page_width, constants.page_height) {
        return Err(RenderError::surface_unavailable(format!(
            "The surface is {}x{} pixels but the page is {}x{}",
            surface_dimensions.0, surface_dimensions.1, constants.page_width, constants.page_height
        )));
    }

    constants.validate().map_err(|error| {
        RenderError::surface_unavailable("Invalid page layout").caused_by(&error)
    })?;

    paint_paper(surface, style.paper_background, constants);

    let page_layout = layout_page(text, style.paper_background, constants, &*surface);
    let ink = style.ink_color.rgb();
    let space_width = surface.glyph_width(' ');
    for line in &page_layout.lines {
        paint_line(surface, sampler, line, page_layout.start_x, space_width, ink);
    }

    Ok(page_layout)
}

/// Paints the glyphs of a line one by one, each with its own variations. The gap between
/// two words is a plain space.
fn paint_line<S: Surface + ?Sized, V: VariationSampler + ?Sized>(
    surface: &mut S,
    sampler: &mut V,
    line: &LaidOutLine,
    start_x: f32,
    space_width: f32,
    ink: Rgb<u8>,
) {
    let mut pen_x = start_x;
    for (word_index, word) in line.words().enumerate() {
        if word_index > 0 {
            pen_x += space_width;
        }
        for glyph in word.chars() {
            let transform = sampler.sample();
            surface.paint_glyph(glyph, pen_x, line.baseline_y, &transform, ink);
            pen_x += surface.glyph_width(glyph) + transform.spacing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{GlyphTransform, SequenceSampler};
    use crate::style::{InkColor, PaperBackground};
    use crate::surface::{RecordingSurface, SurfaceCall};

    fn recorded(text: &str, style: StyleConfig, sampler: &mut SequenceSampler) -> RecordingSurface {
        let constants = LayoutConstants::default();
        let mut surface = RecordingSurface::new(constants.page_width, constants.page_height, 10.0);
        paint_page(&mut surface, sampler, text, &style, &constants).unwrap();
        surface
    }

    #[test]
    fn glyphs_advance_by_their_width_plus_the_sampled_spacing() {
        let mut sampler = SequenceSampler::new(vec![GlyphTransform {
            spacing: 1.5,
            ..GlyphTransform::neutral()
        }]);
        let surface = recorded("ab cd", StyleConfig::default(), &mut sampler);
        let glyphs = surface.painted_glyphs();
        assert_eq!(
            glyphs,
            vec![
                ('a', 60.0, 100.0),
                ('b', 71.5, 100.0),
                // the gap between words is a plain space
                ('c', 93.0, 100.0),
                ('d', 104.5, 100.0),
            ]
        );
        assert_eq!(sampler.samples_taken(), 4);
    }

    #[test]
    fn every_glyph_gets_its_own_transform_and_the_ink_color() {
        let transforms = vec![
            GlyphTransform {
                rotation: 0.01,
                ..GlyphTransform::neutral()
            },
            GlyphTransform {
                baseline_shift: -1.0,
                ..GlyphTransform::neutral()
            },
        ];
        let mut sampler = SequenceSampler::new(transforms.clone());
        let surface = recorded(
            "xy",
            StyleConfig::new(InkColor::Black, PaperBackground::Ruled),
            &mut sampler,
        );
        let painted = surface
            .calls()
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::PaintGlyph {
                    transform, color, ..
                } => Some((*transform, *color)),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            painted,
            vec![
                (transforms[0], InkColor::BLACK.0),
                (transforms[1], InkColor::BLACK.0)
            ]
        );
    }

    #[test]
    fn paper_is_painted_before_the_text() {
        let surface = recorded("a", StyleConfig::default(), &mut SequenceSampler::neutral());
        let last_line = surface
            .calls()
            .iter()
            .rposition(|call| matches!(call, SurfaceCall::StrokeLine { .. }))
            .unwrap();
        let first_glyph = surface
            .calls()
            .iter()
            .position(|call| matches!(call, SurfaceCall::PaintGlyph { .. }))
            .unwrap();
        assert!(last_line < first_glyph);
    }

    #[test]
    fn a_surface_of_the_wrong_size_is_refused() {
        let mut surface = RecordingSurface::new(100, 100, 10.0);
        let error = paint_page(
            &mut surface,
            &mut SequenceSampler::neutral(),
            "text",
            &StyleConfig::default(),
            &LayoutConstants::default(),
        )
        .unwrap_err();
        assert_eq!(error.kind, crate::error::RenderErrorKind::SurfaceUnavailable);
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn a_layout_with_a_zero_line_height_is_refused_instead_of_hanging() {
        let configuration: RendererConfiguration =
            serde_json::from_str(r#"{"layout": {"lineHeight": 0.0}}"#).unwrap();
        let error = PageRenderer::new(configuration.clone()).unwrap_err();
        assert_eq!(error.kind, crate::error::RenderErrorKind::SurfaceUnavailable);

        let constants = configuration.layout;
        let mut surface = RecordingSurface::new(constants.page_width, constants.page_height, 10.0);
        let result = paint_page(
            &mut surface,
            &mut SequenceSampler::neutral(),
            "hello",
            &StyleConfig::default(),
            &constants,
        );
        assert!(result.is_err());
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn lines_stay_within_the_column_even_with_the_widest_spacing() {
        let widest_spacing = crate::sampler::SPACING_RANGE.end;
        let mut sampler = SequenceSampler::new(vec![GlyphTransform {
            spacing: widest_spacing,
            ..GlyphTransform::neutral()
        }]);
        let text = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do ".repeat(20);
        for paper_background in [PaperBackground::Ruled, PaperBackground::Margin] {
            let constants = LayoutConstants::default();
            let surface = recorded(
                &text,
                StyleConfig::new(InkColor::Blue, paper_background),
                &mut sampler,
            );
            let right_edge =
                constants.text_start_x(paper_background) + constants.content_width(paper_background);
            for (_, x, _) in surface.painted_glyphs() {
                // Every glyph is ten pixels wide
                assert!(x + 10.0 <= right_edge + 1e-3, "{} overflows {}", x, right_edge);
            }
        }
    }
}
