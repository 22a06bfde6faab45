//! Post-processing passes applied after the gradient fill.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use skia_safe::{image_filters, Paint, Surface, TileMode};

/// Rows per parallel noise band (rounded up to a multiple of the stride).
const BAND_ROWS: usize = 16;

/// Noise sampling strategy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum NoiseQuality {
    /// One sample per pixel.
    #[default]
    Full,
    /// One sample per `stride x stride` block.
    Strided { stride: u32 },
}

impl NoiseQuality {
    pub fn stride(&self) -> usize {
        match self {
            NoiseQuality::Full => 1,
            NoiseQuality::Strided { stride } => (*stride).max(1) as usize,
        }
    }
}

/// Draws the current surface contents back over itself through a Gaussian blur.
///
/// The snapshot is taken from the freshly painted frame, so repeated frames never stack blur.
pub fn apply_blur(surface: &mut Surface, sigma: f32) {
    if sigma <= 0.0 || !sigma.is_finite() {
        return;
    }
    let snapshot = surface.image_snapshot();
    let mut paint = Paint::default();
    if let Some(filter) = image_filters::blur((sigma, sigma), TileMode::Clamp, None, None) {
        paint.set_image_filter(filter);
    }
    surface.canvas().draw_image(&snapshot, (0, 0), Some(&paint));
}

/// Adds uniform noise in `[-amount*255/2, amount*255/2]` to the RGB channels of tightly packed
/// RGBA pixels. Alpha is left untouched.
///
/// Bands of rows are processed in parallel, each with its own RNG derived from `seed`, so the
/// output depends only on the inputs.
pub fn apply_noise_rgba(
    pixels: &mut [u8],
    width: usize,
    amount: f32,
    quality: NoiseQuality,
    seed: u64,
) {
    if width == 0 || amount <= 0.0 || amount.is_nan() {
        return;
    }
    let spread = amount.min(1.0) * 255.0;
    let stride = quality.stride();
    let row_bytes = width * 4;
    let band_rows = BAND_ROWS.div_ceil(stride) * stride;
    let blocks_per_row = width.div_ceil(stride);

    pixels
        .par_chunks_mut(row_bytes * band_rows)
        .enumerate()
        .for_each(|(band, chunk)| {
            let mut rng = band_rng(seed, band);
            let mut samples = vec![0.0f32; blocks_per_row];

            for (row_in_band, row) in chunk.chunks_mut(row_bytes).enumerate() {
                if row_in_band % stride == 0 {
                    for s in samples.iter_mut() {
                        *s = (rng.gen::<f32>() - 0.5) * spread;
                    }
                }
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let n = samples[x / stride];
                    for c in &mut px[..3] {
                        *c = (*c as f32 + n).round().clamp(0.0, 255.0) as u8;
                    }
                }
            }
        });
}

fn band_rng(seed: u64, band: usize) -> StdRng {
    StdRng::seed_from_u64(seed ^ (band as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}
