//! # Color Module
//!
//! Pure numeric color helpers shared by the renderer, the keyframe timeline and the morph tool.
//!
//! ## Responsibilities
//! - **Parsing**: `#rrggbb` → [`Color`], total (malformed input falls back to black).
//! - **Formatting**: channel triples → lowercase hex, clamped and rounded.
//! - **Interpolation**: per-channel linear blend (`a + t * (b - a)`), unclamped `t`.
//! - **Contrast**: WCAG relative luminance and text tone recommendation.

use keyframe::CanTween;
use serde::{Deserialize, Serialize};

/// An opaque sRGB color with 8-bit channels.
///
/// Serializes as a `#rrggbb` string. Deserializing never fails: malformed strings become black.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a 6-digit hex color, with or without a leading `#`, case-insensitive.
    ///
    /// Returns `None` for anything else (3-digit shorthand included).
    pub fn try_parse(hex: &str) -> Option<Color> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
        let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
        let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
        Some(Color { r, g, b })
    }

    /// Total parse: malformed input yields black.
    pub fn parse(hex: &str) -> Color {
        Self::try_parse(hex).unwrap_or(Color::BLACK)
    }

    /// Builds a color from float channels, clamping to `[0, 255]` and rounding.
    pub fn from_channels(r: f32, g: f32, b: f32) -> Color {
        Color {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear blend towards `other`. `t` outside `[0, 1]` extrapolates; channels are clamped.
    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        let mix = |a: u8, b: u8| a as f32 + t * (b as f32 - a as f32);
        Color::from_channels(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }

    /// Converts to Skia's opaque `Color`.
    pub fn to_skia(&self) -> skia_safe::Color {
        skia_safe::Color::from_rgb(self.r, self.g, self.b)
    }
}

fn clamp_channel(v: f32) -> u8 {
    v.clamp(0.0, 255.0).round() as u8
}

impl From<String> for Color {
    fn from(value: String) -> Self {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_hex()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl CanTween for Color {
    fn ease(from: Self, to: Self, time: impl keyframe::num_traits::Float) -> Self {
        let t = time.to_f32().unwrap_or(0.0);
        from.lerp(&to, t)
    }
}

/// Parses a hex color into its channels; malformed input yields black.
pub fn hex_to_rgb(hex: &str) -> Color {
    Color::parse(hex)
}

/// Formats float channels as `#rrggbb`, clamping each to `[0, 255]` and rounding.
pub fn rgb_to_hex(r: f32, g: f32, b: f32) -> String {
    Color::from_channels(r, g, b).to_hex()
}

/// Per-channel linear interpolation between two hex colors.
///
/// `t` is not clamped: values outside `[0, 1]` extrapolate and the result is clamped per channel.
pub fn interpolate_color(a: &str, b: &str, t: f32) -> String {
    hex_to_rgb(a).lerp(&hex_to_rgb(b), t).to_hex()
}

/// WCAG 2.x relative luminance.
pub fn relative_luminance(color: Color) -> f32 {
    let linear = |c: u8| {
        let c = c as f32 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(color.r) + 0.7152 * linear(color.g) + 0.0722 * linear(color.b)
}

/// WCAG contrast ratio, in `[1, 21]`.
pub fn contrast_ratio(a: Color, b: Color) -> f32 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (hi, lo) = if la > lb { (la, lb) } else { (lb, la) };
    (hi + 0.05) / (lo + 0.05)
}

/// Mean relative luminance of a set of colors (0.5 for an empty set).
pub fn average_luminance(colors: &[Color]) -> f32 {
    if colors.is_empty() {
        return 0.5;
    }
    colors.iter().map(|c| relative_luminance(*c)).sum::<f32>() / colors.len() as f32
}

/// Which text color reads better on top of a gradient.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextTone {
    Dark,
    Light,
}

pub fn recommended_text_tone(colors: &[Color]) -> TextTone {
    if average_luminance(colors) > 0.5 {
        TextTone::Dark
    } else {
        TextTone::Light
    }
}
