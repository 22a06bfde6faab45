//! # Harmony Module
//!
//! Color-wheel schemes that feed gradient stops.
//!
//! ## Responsibilities
//! - **HSL**: [`Hsl`] conversion to and from [`Color`].
//! - **Schemes**: [`scheme_from_base`] derives a palette from one base color.
//! - **Randomize**: [`randomize`] picks a scheme and hue from an RNG, keeping locked stops.
//! - **Analysis**: [`analyze`] classifies a stop list and suggests related palettes.
//!
//! Hues are in degrees `[0, 360)`, saturation and lightness in percent `[0, 100]`.

use crate::color::Color;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Saturation used by randomized schemes.
pub const RANDOM_SATURATION: f32 = 70.0;
/// Lightness used by randomized schemes (monochromatic steps around it).
pub const RANDOM_LIGHTNESS: f32 = 60.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self {
            h: h.rem_euclid(360.0),
            s: s.clamp(0.0, 100.0),
            l: l.clamp(0.0, 100.0),
        }
    }

    pub fn from_color(color: Color) -> Self {
        let r = color.r as f32 / 255.0;
        let g = color.g as f32 / 255.0;
        let b = color.b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        if max == min {
            return Self::new(0.0, 0.0, l * 100.0);
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        Self::new(h * 60.0, s * 100.0, l * 100.0)
    }

    pub fn to_color(self) -> Color {
        let s = self.s / 100.0;
        let l = self.l / 100.0;
        let a = s * l.min(1.0 - l);
        let channel = |n: f32| {
            let k = (n + self.h / 30.0).rem_euclid(12.0);
            let v = l - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0);
            v * 255.0
        };
        Color::from_channels(channel(0.0), channel(8.0), channel(4.0))
    }

    /// Same saturation and lightness, hue turned by `degrees`.
    pub fn rotated(self, degrees: f32) -> Self {
        Self::new(self.h + degrees, self.s, self.l)
    }

    pub fn with_lightness(self, l: f32) -> Self {
        Self::new(self.h, self.s, l)
    }
}

impl From<Color> for Hsl {
    fn from(color: Color) -> Self {
        Self::from_color(color)
    }
}

impl From<Hsl> for Color {
    fn from(hsl: Hsl) -> Self {
        hsl.to_color()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HarmonyScheme {
    Complementary,
    Triadic,
    Analogous,
    Tetradic,
    SplitComplementary,
    Monochromatic,
}

impl HarmonyScheme {
    pub const ALL: [HarmonyScheme; 6] = [
        HarmonyScheme::Complementary,
        HarmonyScheme::Triadic,
        HarmonyScheme::Analogous,
        HarmonyScheme::Tetradic,
        HarmonyScheme::SplitComplementary,
        HarmonyScheme::Monochromatic,
    ];

    /// Schemes the randomizer draws from.
    pub const RANDOM: [HarmonyScheme; 5] = [
        HarmonyScheme::Complementary,
        HarmonyScheme::Triadic,
        HarmonyScheme::Analogous,
        HarmonyScheme::Tetradic,
        HarmonyScheme::Monochromatic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complementary => "complementary",
            Self::Triadic => "triadic",
            Self::Analogous => "analogous",
            Self::Tetradic => "tetradic",
            Self::SplitComplementary => "split-complementary",
            Self::Monochromatic => "monochromatic",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl std::fmt::Display for HarmonyScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives a palette from `base`. The base color itself is always part of the result.
pub fn scheme_from_base(base: Color, scheme: HarmonyScheme) -> Vec<Color> {
    let hsl = Hsl::from_color(base);
    let turn = |deg: f32| hsl.rotated(deg).to_color();
    let darker = hsl.with_lightness((hsl.l - 20.0).max(10.0)).to_color();
    let lighter = hsl.with_lightness((hsl.l + 20.0).min(90.0)).to_color();

    match scheme {
        HarmonyScheme::Complementary => vec![base, turn(180.0), darker],
        HarmonyScheme::Triadic => vec![base, turn(120.0), turn(240.0)],
        HarmonyScheme::Analogous => vec![turn(-30.0), base, turn(30.0)],
        HarmonyScheme::Tetradic => vec![base, turn(90.0), turn(180.0), turn(270.0)],
        HarmonyScheme::SplitComplementary => vec![base, turn(150.0), turn(210.0)],
        HarmonyScheme::Monochromatic => vec![lighter, base, darker],
    }
}

/// A fixed-saturation palette around `hue`, as produced by the randomizer.
pub fn scheme_from_hue(hue: f32, scheme: HarmonyScheme) -> Vec<Color> {
    let at = |deg: f32, l: f32| Hsl::new(hue + deg, RANDOM_SATURATION, l).to_color();
    let l = RANDOM_LIGHTNESS;
    match scheme {
        HarmonyScheme::Complementary => vec![at(0.0, l), at(180.0, l)],
        HarmonyScheme::Triadic => vec![at(0.0, l), at(120.0, l), at(240.0, l)],
        HarmonyScheme::Analogous => vec![at(0.0, l), at(30.0, l), at(60.0, l)],
        HarmonyScheme::Tetradic => vec![at(0.0, l), at(90.0, l), at(180.0, l), at(270.0, l)],
        HarmonyScheme::SplitComplementary => vec![at(0.0, l), at(150.0, l), at(210.0, l)],
        HarmonyScheme::Monochromatic => vec![at(0.0, 40.0), at(0.0, 60.0), at(0.0, 80.0)],
    }
}

/// Result of one randomize step.
#[derive(Clone, Debug, PartialEq)]
pub struct Randomized {
    pub scheme: HarmonyScheme,
    pub hue: f32,
    pub colors: Vec<Color>,
}

/// Picks a scheme and base hue from `rng`.
///
/// Positions listed in `locked` keep the color from `current` when `current` has one there.
/// The result has the scheme's length, which may differ from `current`.
pub fn randomize<R: Rng + ?Sized>(
    current: &[Color],
    locked: &BTreeSet<usize>,
    rng: &mut R,
) -> Randomized {
    let scheme = HarmonyScheme::RANDOM[rng.gen_range(0..HarmonyScheme::RANDOM.len())];
    let hue = rng.gen_range(0..360) as f32;
    let colors = scheme_from_hue(hue, scheme)
        .into_iter()
        .enumerate()
        .map(|(i, generated)| match current.get(i) {
            Some(kept) if locked.contains(&i) => *kept,
            _ => generated,
        })
        .collect();
    Randomized {
        scheme,
        hue,
        colors,
    }
}

/// A related palette offered by [`analyze`].
#[derive(Clone, Debug, PartialEq)]
pub struct Suggestion {
    pub scheme: HarmonyScheme,
    pub colors: Vec<Color>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HarmonyAnalysis {
    /// Detected relationship, `None` for a custom combination.
    pub detected: Option<HarmonyScheme>,
    pub suggestions: Vec<Suggestion>,
}

/// Classifies `colors` by hue spread around their mean hue and suggests related palettes.
///
/// Returns `None` for fewer than two colors. The mean is arithmetic, not circular.
pub fn analyze(colors: &[Color]) -> Option<HarmonyAnalysis> {
    if colors.len() < 2 {
        return None;
    }
    let hsl: Vec<Hsl> = colors.iter().copied().map(Hsl::from_color).collect();
    let mean = hsl.iter().map(|c| c.h).sum::<f32>() / hsl.len() as f32;
    let diffs: Vec<f32> = hsl.iter().map(|c| (c.h - mean).abs()).collect();
    let max_diff = diffs.iter().copied().fold(0.0, f32::max);

    let detected = if max_diff < 30.0 {
        Some(HarmonyScheme::Analogous)
    } else if max_diff > 150.0 && max_diff < 210.0 {
        Some(HarmonyScheme::Complementary)
    } else if diffs.iter().filter(|d| **d > 100.0 && **d < 140.0).count() >= 2 {
        Some(HarmonyScheme::Triadic)
    } else if max_diff > 70.0 && max_diff < 110.0 {
        Some(HarmonyScheme::SplitComplementary)
    } else {
        None
    };

    let mut suggestions = vec![
        Suggestion {
            scheme: HarmonyScheme::Complementary,
            colors: hsl.iter().map(|c| c.rotated(180.0).to_color()).collect(),
        },
        Suggestion {
            scheme: HarmonyScheme::Analogous,
            colors: hsl
                .iter()
                .enumerate()
                .map(|(i, c)| c.rotated((i as f32 - 1.0) * 30.0).to_color())
                .collect(),
        },
    ];
    if hsl.len() >= 3 {
        suggestions.push(Suggestion {
            scheme: HarmonyScheme::Triadic,
            colors: hsl
                .iter()
                .take(3)
                .enumerate()
                .map(|(i, c)| c.rotated(i as f32 * 120.0).to_color())
                .collect(),
        });
    }

    Some(HarmonyAnalysis {
        detected,
        suggestions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn hsl_of_primaries() {
        let red = Hsl::from_color(Color::new(255, 0, 0));
        assert_eq!((red.h, red.s, red.l), (0.0, 100.0, 50.0));
        let blue = Hsl::from_color(Color::new(0, 0, 255));
        assert_eq!(blue.h, 240.0);
        let grey = Hsl::from_color(Color::new(128, 128, 128));
        assert_eq!(grey.s, 0.0);
    }

    #[test]
    fn hsl_round_trips_to_hex() {
        for hex in ["#8b5cf6", "#ec4899", "#3b82f6", "#10b981", "#000000", "#ffffff"] {
            let c = Color::parse(hex);
            assert_eq!(Hsl::from_color(c).to_color(), c, "{hex}");
        }
    }

    #[test]
    fn negative_hue_wraps() {
        assert_eq!(
            Hsl::new(-120.0, 100.0, 50.0).to_color(),
            Hsl::new(240.0, 100.0, 50.0).to_color()
        );
    }
}
