use rand::rngs::StdRng;
use rand::{Rng, SeedableRng as _};
use serde::{Deserialize, Serialize};

/// The micro-transform applied to a single glyph so that no two glyphs look identical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphTransform {
    /// Extra horizontal advance after the glyph, in pixels (negative values tighten the kerning).
    pub spacing: f32,
    /// Rotation around the pen position, in radians.
    pub rotation: f32,
    /// Vertical displacement of the glyph from the baseline, in pixels.
    pub baseline_shift: f32,
    /// Multiplier of the ink deposited by the glyph, around `1.0`.
    pub stroke_thickness: f32,
}

impl GlyphTransform {
    /// The transform which leaves a glyph exactly as the font draws it.
    pub fn neutral() -> Self {
        GlyphTransform {
            spacing: 0.0,
            rotation: 0.0,
            baseline_shift: 0.0,
            stroke_thickness: 1.0,
        }
    }
}

/// Source of per-glyph variations, a fresh transform is requested for every painted glyph.
pub trait VariationSampler {
    fn sample(&mut self) -> GlyphTransform;
}

/// Maximum rotation of a glyph, two degrees either way.
pub const MAXIMUM_ROTATION: f32 = 2.0 * std::f32::consts::PI / 180.0;
/// Maximum vertical displacement of a glyph from its baseline.
pub const MAXIMUM_BASELINE_SHIFT: f32 = 1.5;
pub const SPACING_RANGE: std::ops::Range<f32> = -0.5..1.5;
pub const STROKE_THICKNESS_RANGE: std::ops::Range<f32> = 0.9..1.1;

/// Draws every component of the transform uniformly and independently from the wrapped
/// random number generator.
#[derive(Debug, Clone)]
pub struct RandomSampler<R: Rng = StdRng> {
    rng: R,
}

impl RandomSampler<StdRng> {
    /// A sampler seeded from the operating system, two renders never share variations.
    pub fn from_entropy() -> Self {
        RandomSampler {
            rng: StdRng::from_entropy(),
        }
    }

    /// A reproducible sampler, the same seed always yields the same sequence of transforms.
    pub fn seeded(seed: u64) -> Self {
        RandomSampler {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomSampler<R> {
    pub fn with_rng(rng: R) -> Self {
        RandomSampler { rng }
    }
}

impl<R: Rng> VariationSampler for RandomSampler<R> {
    fn sample(&mut self) -> GlyphTransform {
        GlyphTransform {
            spacing: self.rng.gen_range(SPACING_RANGE),
            rotation: self.rng.gen_range(-MAXIMUM_ROTATION..MAXIMUM_ROTATION),
            baseline_shift: self
                .rng
                .gen_range(-MAXIMUM_BASELINE_SHIFT..MAXIMUM_BASELINE_SHIFT),
            stroke_thickness: self.rng.gen_range(STROKE_THICKNESS_RANGE),
        }
    }
}

/// Replays a fixed list of transforms in a loop, for renders that must be predictable.
#[derive(Debug, Clone)]
pub struct SequenceSampler {
    transforms: Vec<GlyphTransform>,
    next_index: usize,
}

impl SequenceSampler {
    /// Falls back to the neutral transform when the given list is empty.
    pub fn new(transforms: Vec<GlyphTransform>) -> Self {
        let transforms = if transforms.is_empty() {
            vec![GlyphTransform::neutral()]
        } else {
            transforms
        };
        SequenceSampler {
            transforms,
            next_index: 0,
        }
    }

    pub fn neutral() -> Self {
        SequenceSampler::new(vec![GlyphTransform::neutral()])
    }

    /// How many transforms have been handed out so far.
    pub fn samples_taken(&self) -> usize {
        self.next_index
    }
}

impl VariationSampler for SequenceSampler {
    fn sample(&mut self) -> GlyphTransform {
        let transform = self.transforms[self.next_index % self.transforms.len()];
        self.next_index += 1;
        transform
    }
}

impl<V: VariationSampler + ?Sized> VariationSampler for &mut V {
    fn sample(&mut self) -> GlyphTransform {
        (**self).sample()
    }
}
