//! Handscript turns a block of plain text into the image of a page that looks handwritten:
//! the text is word-wrapped onto an A4 sheet of ruled, graph or margin paper and every single
//! glyph is painted with its own small rotation, baseline shift, spacing and ink pressure.
//!
//! The entry point is the `PageRenderer` struct, whose `render` method takes the text together
//! with a `StyleConfig` and returns the page encoded as PNG. Since the variations of every glyph
//! are drawn afresh on each call, rendering the same text twice gives two different pages; a
//! seeded `RandomSampler` or a `SequenceSampler` can be passed to `render_with_sampler` whenever
//! a predictable result is needed.
//!
//! The layout itself never touches pixels: it only talks to the `Surface` trait, so that it can
//! be driven by the `RecordingSurface` in tests and by the `RasterSurface` in production.

/// The module where the `PageRenderer` is presented.
///
/// # Introduction
///
/// Rendering a page happens in three steps. First the paper is painted according to the
/// chosen `PaperBackground`, then the text is split into paragraphs at every line break and
/// each paragraph is greedily word-wrapped into the width of the writable column, finally the
/// glyphs of every line are painted one by one with the transform handed out by the sampler.
///
/// A page holds a fixed number of lines: text which does not fit is left out and the
/// `truncated` flag of the returned `RenderedPage` is raised, rendering never fails because of
/// the amount of text.
pub mod renderer;

/// The page geometry shared by the paper and the text, and the word wrap.
///
/// All the dimensions live in `LayoutConstants`, so that the ruling of the paper and the
/// wrapping of the text are always computed from the same margins and indents.
pub mod layout;

/// The ink and paper choices of a render.
pub mod style;

/// The per-glyph handwriting variations.
///
/// The `VariationSampler` trait is the seam through which randomness enters a render. The
/// `RandomSampler` draws every component uniformly from a small range around the neutral value,
/// the `SequenceSampler` replays a fixed list and is meant for tests.
pub mod sampler;

/// The drawing operations a render needs, and a surface recording them.
pub mod surface;

/// Printing of the ruled, graph and margin motifs.
pub mod paper;

/// The TTF font the pages are written with.
pub mod font;

/// The anti-aliased raster implementation of the `Surface` trait.
///
/// Glyph outlines are collected as paths in font units and filled with anti-aliasing through
/// the affine transform of the glyph, whose ink pressure becomes the opacity of the paint.
/// Paper rules are stroked as straight paths.
pub mod raster;

/// The configuration of the renderer, read from a JSON file.
pub mod config;

/// This module contains the error types used throughout this library.
///
/// `ContextError` carries a human readable context and possibly the message of the error
/// which caused it. `RenderError` additionally classifies why a render failed, so that the
/// caller can decide whether to retry, and `ValidationError` reports a refused upload.
pub mod error;

/// Validation of the images uploaded for text extraction.
pub mod validation;

/// Extraction of text from images.
///
/// Only a placeholder extractor is provided, any real recognition engine can be plugged in by
/// implementing the `TextExtractor` trait.
pub mod extraction;

/// Persistence of the rendered pages.
pub mod storage;

pub use config::RendererConfiguration;
pub use error::{ContextError, RenderError, RenderErrorKind};
pub use renderer::{PageRenderer, RenderedPage};
pub use sampler::{GlyphTransform, RandomSampler, SequenceSampler, VariationSampler};
pub use style::{InkColor, PaperBackground, StyleConfig};
