//! Eased transitions between two gradients.

use crate::animation::EasingType;
use crate::color::Color;
use crate::types::{ColorStops, GradientDescriptor, GradientKind};
use keyframe::CanTween;

pub const DEFAULT_MORPH_DURATION_MS: f64 = 2000.0;

/// Progress curve used by morphs.
///
/// The ease family is quadratic here (`t²`, `t(2 - t)` and their piecewise join); bounce,
/// elastic and linear share the animation curves.
pub fn morph_curve(easing: EasingType, t: f32) -> f32 {
    match easing {
        EasingType::EaseIn => t * t,
        EasingType::EaseOut => t * (2.0 - t),
        EasingType::EaseInOut if t < 0.5 => 2.0 * t * t,
        EasingType::EaseInOut => -1.0 + (4.0 - 2.0 * t) * t,
        other => other.eval(t),
    }
}

/// Blends `start` towards `end` at progress `t` (clamped to `0..=1`) shaped by
/// [`morph_curve`].
///
/// Colors pair up by index, the shorter list repeating its last color. Everything other than
/// colors and angle is taken from `start`.
pub fn morph(
    start: &GradientDescriptor,
    end: &GradientDescriptor,
    t: f32,
    easing: EasingType,
) -> GradientDescriptor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let eased = morph_curve(easing, t);

    let a = &start.color_stops;
    let b = &end.color_stops;
    let len = a.len().max(b.len());
    let colors: Vec<Color> = (0..len)
        .map(|i| {
            let from = a[i.min(a.len() - 1)];
            let to = b[i.min(b.len() - 1)];
            Color::ease(from, to, eased)
        })
        .collect();

    let from_angle = start.angle_degrees();
    let angle = from_angle + eased * (end.angle_degrees() - from_angle);

    start
        .with_stops(ColorStops::new(colors).unwrap_or_else(|_| a.clone()))
        .with_angle(angle)
}

/// Morph progress `elapsed_ms` into a run of `duration_ms`.
///
/// Looping runs wrap; one-shot runs return `None` once finished.
pub fn progress_at(elapsed_ms: f64, duration_ms: f64, looping: bool) -> Option<f32> {
    if duration_ms <= 0.0 || elapsed_ms.is_nan() {
        return None;
    }
    let elapsed = elapsed_ms.max(0.0);
    if looping {
        Some(((elapsed % duration_ms) / duration_ms) as f32)
    } else if elapsed >= duration_ms {
        None
    } else {
        Some((elapsed / duration_ms) as f32)
    }
}

/// Built-in morph targets.
pub fn presets() -> Vec<GradientDescriptor> {
    const PRESETS: [([&str; 3], f32); 6] = [
        (["#ec4899", "#8b5cf6", "#3b82f6"], 45.0),
        (["#f97316", "#eab308", "#84cc16"], 90.0),
        (["#06b6d4", "#3b82f6", "#8b5cf6"], 135.0),
        (["#ef4444", "#f97316", "#fbbf24"], 0.0),
        (["#10b981", "#14b8a6", "#06b6d4"], 180.0),
        (["#8b5cf6", "#d946ef", "#ec4899"], 270.0),
    ];
    PRESETS
        .iter()
        .map(|(colors, angle)| {
            GradientDescriptor::default()
                .with_kind(GradientKind::linear(*angle))
                .with_stops(ColorStops::from_hex(colors).unwrap_or_default())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_inputs() {
        let p = presets();
        let (a, b) = (&p[0], &p[1]);
        assert_eq!(morph(a, b, 0.0, EasingType::EaseInOut).color_stops, a.color_stops);
        let end = morph(a, b, 1.0, EasingType::Linear);
        assert_eq!(end.color_stops, b.color_stops);
        assert_eq!(end.angle_degrees(), 90.0);
    }

    #[test]
    fn ease_curves_are_quadratic() {
        assert_eq!(morph_curve(EasingType::EaseIn, 0.5), 0.25);
        assert_eq!(morph_curve(EasingType::EaseOut, 0.5), 0.75);
        assert_eq!(morph_curve(EasingType::EaseInOut, 0.25), 0.125);
        assert_eq!(morph_curve(EasingType::EaseInOut, 0.75), 0.875);
        assert_eq!(morph_curve(EasingType::Linear, 0.3), 0.3);
    }

    #[test]
    fn ease_in_midpoint_color() {
        let black = GradientDescriptor::default()
            .with_stops(ColorStops::from_hex(&["#000000", "#000000"]).unwrap());
        let white = black.with_stops(ColorStops::from_hex(&["#ffffff", "#ffffff"]).unwrap());
        let mid = morph(&black, &white, 0.5, EasingType::EaseIn);
        // 255 * 0.25 = 63.75
        assert_eq!(mid.color_stops[0].to_hex(), "#404040");
    }

    #[test]
    fn one_shot_progress_finishes() {
        assert_eq!(progress_at(500.0, 2000.0, false), Some(0.25));
        assert_eq!(progress_at(2000.0, 2000.0, false), None);
        assert_eq!(progress_at(2500.0, 2000.0, true), Some(0.25));
    }
}
