//! Dominant color extraction from images (k-means over sampled pixels).

use crate::color::Color;
use anyhow::{Context, Result};
use image::RgbaImage;
use rand::Rng;
use tracing::{debug, instrument};

/// Every n-th pixel is sampled.
pub const SAMPLE_STEP: usize = 10;
pub const ITERATIONS: usize = 10;

/// Decodes any format the `image` crate understands into RGBA8.
#[instrument(level = "debug", skip(bytes), fields(len = bytes.len()))]
pub fn load_image(bytes: &[u8]) -> Result<RgbaImage> {
    let decoded = image::load_from_memory(bytes).context("Failed to decode image")?;
    Ok(decoded.to_rgba8())
}

fn distance_sq(a: [f32; 3], b: [f32; 3]) -> f32 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

/// Extracts `k` representative colors from tightly packed RGBA pixels.
///
/// Initial centroids are random sampled pixels. A cluster that ends an iteration empty takes
/// the first centroid's value. Returns an empty list when there are no pixels or `k == 0`.
pub fn extract_palette<R: Rng + ?Sized>(rgba: &[u8], k: usize, rng: &mut R) -> Vec<Color> {
    let samples: Vec<[f32; 3]> = rgba
        .chunks_exact(4)
        .step_by(SAMPLE_STEP)
        .map(|px| [px[0] as f32, px[1] as f32, px[2] as f32])
        .collect();
    if samples.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut centroids: Vec<[f32; 3]> = (0..k)
        .map(|_| samples[rng.gen_range(0..samples.len())])
        .collect();

    for _ in 0..ITERATIONS {
        let mut sums = vec![[0.0f32; 3]; k];
        let mut counts = vec![0usize; k];

        for px in &samples {
            let nearest = centroids
                .iter()
                .enumerate()
                .map(|(i, c)| (i, distance_sq(*px, *c)))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| i)
                .unwrap_or(0);
            for c in 0..3 {
                sums[nearest][c] += px[c];
            }
            counts[nearest] += 1;
        }

        let first = centroids[0];
        centroids = sums
            .iter()
            .zip(&counts)
            .map(|(sum, &count)| {
                if count == 0 {
                    first
                } else {
                    let n = count as f32;
                    [
                        (sum[0] / n).round(),
                        (sum[1] / n).round(),
                        (sum[2] / n).round(),
                    ]
                }
            })
            .collect();
    }

    debug!(k, samples = samples.len(), "palette extracted");
    centroids
        .into_iter()
        .map(|c| Color::from_channels(c[0], c[1], c[2]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn solid_image_yields_its_color() {
        let rgba: Vec<u8> = std::iter::repeat([12u8, 200, 99, 255])
            .take(500)
            .flatten()
            .collect();
        let mut rng = StdRng::seed_from_u64(1);
        let palette = extract_palette(&rgba, 3, &mut rng);
        assert_eq!(palette, vec![Color::new(12, 200, 99); 3]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(extract_palette(&[], 5, &mut rng).is_empty());
    }
}
