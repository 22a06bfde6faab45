//! # Types Module
//!
//! Declarative descriptors consumed by the renderer and owned by the [`Studio`](crate::studio::Studio).
//!
//! ## Responsibilities
//! - **GradientKind**: closed tagged variant (`Linear{angle}`, `Radial`, `Conic{angle}`).
//! - **ColorStops**: ordered color list that can never hold fewer than 2 entries.
//! - **AnimationSpec**: animation kind, speed, direction and easing.
//! - **Effects / CanvasSize**: post-processing parameters and output dimensions.
//!
//! All descriptors are plain values; edits build a new value instead of mutating a shared one.

use crate::animation::EasingType;
use crate::color::Color;
use crate::errors::EditError;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Wraps an angle into `[0, 360)`.
pub fn normalize_angle(degrees: f32) -> f32 {
    let a = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// The shape of a gradient. Radial gradients carry no angle.
///
/// Deserialized angles are wrapped into `[0, 360)` like the constructors do.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", from = "RawGradientKind")]
pub enum GradientKind {
    Linear { angle_degrees: f32 },
    Radial,
    Conic { angle_degrees: f32 },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum RawGradientKind {
    Linear { angle_degrees: f32 },
    Radial,
    Conic { angle_degrees: f32 },
}

impl From<RawGradientKind> for GradientKind {
    fn from(raw: RawGradientKind) -> Self {
        match raw {
            RawGradientKind::Linear { angle_degrees } => Self::linear(angle_degrees),
            RawGradientKind::Radial => Self::Radial,
            RawGradientKind::Conic { angle_degrees } => Self::conic(angle_degrees),
        }
    }
}

impl GradientKind {
    pub fn linear(angle_degrees: f32) -> Self {
        Self::Linear {
            angle_degrees: normalize_angle(angle_degrees),
        }
    }

    pub fn conic(angle_degrees: f32) -> Self {
        Self::Conic {
            angle_degrees: normalize_angle(angle_degrees),
        }
    }

    /// Builds a kind from its name (`linear`, `radial`, `conic`).
    pub fn from_name(name: &str, angle_degrees: f32) -> Option<Self> {
        match name {
            "linear" => Some(Self::linear(angle_degrees)),
            "radial" => Some(Self::Radial),
            "conic" => Some(Self::conic(angle_degrees)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear { .. } => "linear",
            Self::Radial => "radial",
            Self::Conic { .. } => "conic",
        }
    }

    pub fn angle_degrees(&self) -> Option<f32> {
        match self {
            Self::Linear { angle_degrees } | Self::Conic { angle_degrees } => Some(*angle_degrees),
            Self::Radial => None,
        }
    }

    /// Replaces the angle. Radial gradients ignore it.
    pub fn with_angle(self, angle_degrees: f32) -> Self {
        match self {
            Self::Linear { .. } => Self::linear(angle_degrees),
            Self::Conic { .. } => Self::conic(angle_degrees),
            Self::Radial => Self::Radial,
        }
    }
}

impl Default for GradientKind {
    fn default() -> Self {
        Self::linear(45.0)
    }
}

/// Ordered color stops. Always holds at least two colors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Color>", into = "Vec<Color>")]
pub struct ColorStops(Vec<Color>);

impl ColorStops {
    pub const MIN_STOPS: usize = 2;

    pub fn new(colors: Vec<Color>) -> Result<Self, EditError> {
        if colors.len() < Self::MIN_STOPS {
            return Err(EditError::TooFewColorStops);
        }
        Ok(Self(colors))
    }

    /// Parses hex strings (malformed entries become black).
    pub fn from_hex<S: AsRef<str>>(colors: &[S]) -> Result<Self, EditError> {
        Self::new(colors.iter().map(|c| Color::parse(c.as_ref())).collect())
    }

    pub fn as_slice(&self) -> &[Color] {
        &self.0
    }

    pub fn to_hex(&self) -> Vec<String> {
        self.0.iter().map(Color::to_hex).collect()
    }

    /// Returns a copy with `color` appended.
    pub fn with_pushed(&self, color: Color) -> Self {
        let mut colors = self.0.clone();
        colors.push(color);
        Self(colors)
    }

    /// Returns a copy without the stop at `index`, rejecting removals below the floor.
    pub fn with_removed(&self, index: usize) -> Result<Self, EditError> {
        if index >= self.0.len() {
            return Err(EditError::StopIndexOutOfRange {
                index,
                len: self.0.len(),
            });
        }
        if self.0.len() <= Self::MIN_STOPS {
            return Err(EditError::TooFewColorStops);
        }
        let mut colors = self.0.clone();
        colors.remove(index);
        Ok(Self(colors))
    }

    pub fn with_replaced(&self, index: usize, color: Color) -> Result<Self, EditError> {
        if index >= self.0.len() {
            return Err(EditError::StopIndexOutOfRange {
                index,
                len: self.0.len(),
            });
        }
        let mut colors = self.0.clone();
        colors[index] = color;
        Ok(Self(colors))
    }

    pub fn reversed(&self) -> Self {
        Self(self.0.iter().rev().copied().collect())
    }
}

impl Deref for ColorStops {
    type Target = [Color];

    fn deref(&self) -> &[Color] {
        &self.0
    }
}

impl TryFrom<Vec<Color>> for ColorStops {
    type Error = EditError;

    fn try_from(colors: Vec<Color>) -> Result<Self, Self::Error> {
        Self::new(colors)
    }
}

impl From<ColorStops> for Vec<Color> {
    fn from(stops: ColorStops) -> Self {
        stops.0
    }
}

impl Default for ColorStops {
    fn default() -> Self {
        Self(vec![
            Color::new(0xec, 0x48, 0x99),
            Color::new(0x8b, 0x5c, 0xf6),
            Color::new(0x3b, 0x82, 0xf6),
        ])
    }
}

/// Named perturbation applied to the gradient over time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationKind {
    #[default]
    Rotate,
    SlideHorizontal,
    SlideVertical,
    Pulse,
    Wave,
    Diagonal,
    Zoom,
    ColorShift,
}

impl AnimationKind {
    pub const ALL: [AnimationKind; 8] = [
        AnimationKind::Rotate,
        AnimationKind::SlideHorizontal,
        AnimationKind::SlideVertical,
        AnimationKind::Pulse,
        AnimationKind::Wave,
        AnimationKind::Diagonal,
        AnimationKind::Zoom,
        AnimationKind::ColorShift,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rotate => "rotate",
            Self::SlideHorizontal => "slide-horizontal",
            Self::SlideVertical => "slide-vertical",
            Self::Pulse => "pulse",
            Self::Wave => "wave",
            Self::Diagonal => "diagonal",
            Self::Zoom => "zoom",
            Self::ColorShift => "color-shift",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
    Alternate,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
            Self::Alternate => "alternate",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "forward" => Some(Self::Forward),
            "reverse" => Some(Self::Reverse),
            "alternate" => Some(Self::Alternate),
            _ => None,
        }
    }
}

/// How the gradient moves over time.
///
/// `speed` is only reachable through [`AnimationSpec::new`], [`AnimationSpec::with_speed`] and
/// deserialization, all of which clamp it to a positive finite value.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAnimationSpec")]
pub struct AnimationSpec {
    pub kind: AnimationKind,
    speed: f32,
    pub direction: Direction,
    pub easing: EasingType,
}

#[derive(Deserialize)]
struct RawAnimationSpec {
    kind: AnimationKind,
    speed: f32,
    direction: Direction,
    easing: EasingType,
}

impl From<RawAnimationSpec> for AnimationSpec {
    fn from(raw: RawAnimationSpec) -> Self {
        Self::new(raw.kind, raw.speed, raw.direction, raw.easing)
    }
}

impl AnimationSpec {
    pub const MIN_SPEED: f32 = 0.01;

    pub fn new(kind: AnimationKind, speed: f32, direction: Direction, easing: EasingType) -> Self {
        Self {
            kind,
            speed: sanitize_speed(speed),
            direction,
            easing,
        }
    }

    /// Time scale. Always `> 0`.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn with_speed(self, speed: f32) -> Self {
        Self {
            speed: sanitize_speed(speed),
            ..self
        }
    }

    pub fn with_kind(self, kind: AnimationKind) -> Self {
        Self { kind, ..self }
    }
}

fn sanitize_speed(speed: f32) -> f32 {
    if speed.is_finite() {
        speed.max(AnimationSpec::MIN_SPEED)
    } else {
        1.0
    }
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            kind: AnimationKind::Rotate,
            speed: 1.0,
            direction: Direction::Forward,
            easing: EasingType::Linear,
        }
    }
}

/// The complete declarative description of one animated gradient.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GradientDescriptor {
    pub kind: GradientKind,
    pub color_stops: ColorStops,
    pub animation: AnimationSpec,
}

impl GradientDescriptor {
    pub fn new(kind: GradientKind, color_stops: ColorStops, animation: AnimationSpec) -> Self {
        Self {
            kind,
            color_stops,
            animation,
        }
    }

    /// The configured angle, or 0 for radial gradients.
    pub fn angle_degrees(&self) -> f32 {
        self.kind.angle_degrees().unwrap_or(0.0)
    }

    pub fn with_kind(&self, kind: GradientKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }

    pub fn with_angle(&self, angle_degrees: f32) -> Self {
        self.with_kind(self.kind.with_angle(angle_degrees))
    }

    pub fn with_stops(&self, color_stops: ColorStops) -> Self {
        Self {
            color_stops,
            ..self.clone()
        }
    }

    pub fn with_animation(&self, animation: AnimationSpec) -> Self {
        Self {
            animation,
            ..self.clone()
        }
    }
}

/// Post-processing applied after the gradient fill.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Effects {
    /// Blur radius in pixels, `>= 0`.
    pub blur_px: f32,
    /// Noise amount in `[0, 1]`.
    pub noise: f32,
}

impl Effects {
    pub fn new(blur_px: f32, noise: f32) -> Self {
        let finite_or_zero = |v: f32| if v.is_finite() { v } else { 0.0 };
        Self {
            blur_px: finite_or_zero(blur_px).max(0.0),
            noise: finite_or_zero(noise).clamp(0.0, 1.0),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.blur_px <= 0.0 && self.noise <= 0.0
    }
}

/// Output dimensions in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const HD: CanvasSize = CanvasSize::new(1280, 720);
    pub const FULL_HD: CanvasSize = CanvasSize::new(1920, 1080);
    pub const QHD: CanvasSize = CanvasSize::new(2560, 1440);
    pub const UHD_4K: CanvasSize = CanvasSize::new(3840, 2160);
    pub const SQUARE: CanvasSize = CanvasSize::new(1080, 1080);
    pub const STORY: CanvasSize = CanvasSize::new(1080, 1920);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero-area canvas cannot be drawn to.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Looks up a named preset (`720p`, `1080p`, `1440p`, `4k`, `square`, `story`).
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "720p" => Some(Self::HD),
            "1080p" => Some(Self::FULL_HD),
            "1440p" => Some(Self::QHD),
            "4k" => Some(Self::UHD_4K),
            "square" => Some(Self::SQUARE),
            "story" => Some(Self::STORY),
            _ => None,
        }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::FULL_HD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angles_wrap_into_range() {
        assert_eq!(normalize_angle(360.0), 0.0);
        assert_eq!(normalize_angle(-90.0), 270.0);
        assert_eq!(normalize_angle(725.0), 5.0);
    }

    #[test]
    fn color_stops_reject_short_lists() {
        assert_eq!(
            ColorStops::new(vec![Color::BLACK]),
            Err(EditError::TooFewColorStops)
        );
        let parsed: Result<ColorStops, _> = serde_json::from_str("[\"#ffffff\"]");
        assert!(parsed.is_err());
    }

    #[test]
    fn descriptor_json_shape() {
        let desc = GradientDescriptor::default();
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["kind"]["type"], "linear");
        assert_eq!(json["kind"]["angle_degrees"], 45.0);
        assert_eq!(json["color_stops"][0], "#ec4899");
        assert_eq!(json["animation"]["kind"], "rotate");
        assert_eq!(json["animation"]["easing"], "linear");

        let back: GradientDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, desc);
    }

    #[test]
    fn deserialized_speed_and_angle_are_checked() {
        let spec: AnimationSpec = serde_json::from_str(
            r#"{"kind":"rotate","speed":-2.0,"direction":"forward","easing":"linear"}"#,
        )
        .unwrap();
        assert_eq!(spec.speed(), AnimationSpec::MIN_SPEED);

        let spec: AnimationSpec = serde_json::from_str(
            r#"{"kind":"wave","speed":0.0,"direction":"reverse","easing":"bounce"}"#,
        )
        .unwrap();
        assert!(spec.speed() > 0.0);
        assert_eq!(spec.direction, Direction::Reverse);

        let kind: GradientKind =
            serde_json::from_str(r#"{"type":"conic","angle_degrees":-90.0}"#).unwrap();
        assert_eq!(kind, GradientKind::conic(270.0));
        let kind: GradientKind =
            serde_json::from_str(r#"{"type":"linear","angle_degrees":725.0}"#).unwrap();
        assert_eq!(kind.angle_degrees(), Some(5.0));

        let spec = AnimationSpec::default().with_speed(2.5);
        let back: AnimationSpec =
            serde_json::from_str(&serde_json::to_string(&spec).unwrap()).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn effects_are_clamped() {
        let fx = Effects::new(-3.0, 4.0);
        assert_eq!(fx.blur_px, 0.0);
        assert_eq!(fx.noise, 1.0);
        assert!(Effects::default().is_noop());
    }
}
