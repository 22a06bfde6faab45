//! # Animation Module
//!
//! Maps wall-clock time to per-frame gradient perturbations.
//!
//! ## Responsibilities
//! - **Easing**: [`EasingType`] curves evaluated through `keyframe`'s `EasingFunction`.
//! - **Clock**: [`AnimationClock`] turns elapsed seconds into animation time, applying speed,
//!   reduced motion, direction (reverse / alternate) and per-cycle easing.
//! - **Parameter Mapping**: [`map_parameters`] turns animation time into angle / radius /
//!   stop-offset perturbations for a given gradient kind.
//!
//! Everything here is a pure function of its inputs.

use crate::types::{AnimationKind, AnimationSpec, Direction, GradientKind};
use keyframe::EasingFunction;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Supported easing functions for animations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EasingType {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Bounce,
    Elastic,
}

impl EasingFunction for EasingType {
    fn y(&self, x: f64) -> f64 {
        match self {
            EasingType::Linear => keyframe::functions::Linear.y(x),
            EasingType::EaseIn => keyframe::functions::EaseIn.y(x),
            EasingType::EaseOut => keyframe::functions::EaseOut.y(x),
            EasingType::EaseInOut => keyframe::functions::EaseInOut.y(x),
            // Not provided by keyframe 1.1
            EasingType::Bounce => bounce_out(x),
            EasingType::Elastic => elastic(x),
        }
    }
}

impl EasingType {
    /// Evaluates the easing curve at a specific point `x` (0.0 to 1.0).
    pub fn eval(&self, x: f32) -> f32 {
        self.y(x as f64) as f32
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EasingType::Linear => "linear",
            EasingType::EaseIn => "ease-in",
            EasingType::EaseOut => "ease-out",
            EasingType::EaseInOut => "ease-in-out",
            EasingType::Bounce => "bounce",
            EasingType::Elastic => "elastic",
        }
    }
}

/// Parses an easing name. Unknown names fall back to linear.
pub fn parse_easing(e: &str) -> EasingType {
    match e {
        "linear" => EasingType::Linear,
        "ease-in" | "ease_in" => EasingType::EaseIn,
        "ease-out" | "ease_out" => EasingType::EaseOut,
        "ease-in-out" | "ease_in_out" => EasingType::EaseInOut,
        "bounce" => EasingType::Bounce,
        "elastic" => EasingType::Elastic,
        _ => EasingType::Linear,
    }
}

fn bounce_out(x: f64) -> f64 {
    let n1 = 7.5625;
    let d1 = 2.75;
    if x < 1.0 / d1 {
        n1 * x * x
    } else if x < 2.0 / d1 {
        let x = x - 1.5 / d1;
        n1 * x * x + 0.75
    } else if x < 2.5 / d1 {
        let x = x - 2.25 / d1;
        n1 * x * x + 0.9375
    } else {
        let x = x - 2.625 / d1;
        n1 * x * x + 0.984375
    }
}

fn elastic(x: f64) -> f64 {
    if x <= 0.0 || x >= 1.0 {
        return x.clamp(0.0, 1.0);
    }
    -(2f64.powf(10.0 * (x - 1.0))) * ((x - 1.1) * 5.0 * PI).sin()
}

/// Reduced motion slows animation time by this factor.
pub const REDUCED_MOTION_FACTOR: f32 = 0.1;

/// Length of one animation cycle, in animation-time units.
///
/// Used to fold time for `alternate` playback and to scope easing to a single cycle.
pub fn cycle_period(kind: AnimationKind) -> f64 {
    match kind {
        // One full turn of a linear gradient at 0.5 rad per unit
        AnimationKind::Rotate => 2.0 * TAU,
        AnimationKind::Diagonal => TAU / 0.3,
        AnimationKind::ColorShift => 10.0,
        _ => TAU,
    }
}

/// Converts elapsed wall-clock seconds into animation time for one [`AnimationSpec`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnimationClock {
    pub spec: AnimationSpec,
    pub reduced_motion: bool,
}

impl AnimationClock {
    pub fn new(spec: AnimationSpec, reduced_motion: bool) -> Self {
        Self {
            spec,
            reduced_motion,
        }
    }

    /// Effective speed after the reduced motion scale.
    pub fn effective_speed(&self) -> f64 {
        let speed = self.spec.speed() as f64;
        if self.reduced_motion {
            speed * REDUCED_MOTION_FACTOR as f64
        } else {
            speed
        }
    }

    /// `elapsed * speed` before direction and easing are applied.
    pub fn raw_time(&self, elapsed_secs: f64) -> f64 {
        elapsed_secs * self.effective_speed()
    }

    /// Animation time for this frame.
    pub fn time(&self, elapsed_secs: f64) -> f64 {
        let raw = self.raw_time(elapsed_secs);
        let period = cycle_period(self.spec.kind);
        let easing = self.spec.easing;

        match self.spec.direction {
            Direction::Forward => ease_within_cycle(raw, period, easing),
            Direction::Reverse => -ease_within_cycle(raw, period, easing),
            Direction::Alternate => {
                // Triangle wave: 0 -> period -> 0 over two cycles
                let phase = (raw / period).rem_euclid(2.0);
                let folded = if phase <= 1.0 { phase } else { 2.0 - phase };
                easing.y(folded) * period
            }
        }
    }
}

fn ease_within_cycle(time: f64, period: f64, easing: EasingType) -> f64 {
    if easing == EasingType::Linear {
        return time;
    }
    let cycles = (time / period).floor();
    let phase = time / period - cycles;
    (cycles + easing.y(phase)) * period
}

/// Per-frame perturbation of the static gradient parameters.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AnimatedParams {
    /// Replaces the static angle (radians) of linear / conic gradients.
    pub angle_radians: Option<f32>,
    /// Multiplies the base radius of radial gradients.
    pub radius_scale: Option<f32>,
    /// Wrapping offset added to every color stop position, in `[0, 1)`.
    pub stop_shift: Option<f32>,
}

/// Maps animation time to perturbations for the given gradient kind.
///
/// Combinations without a defined effect leave geometry static.
pub fn map_parameters(kind: &GradientKind, animation: AnimationKind, time: f32) -> AnimatedParams {
    let mut params = AnimatedParams::default();

    match (kind, animation) {
        (GradientKind::Linear { angle_degrees }, _) => {
            let base = angle_degrees.to_radians();
            params.angle_radians = match animation {
                AnimationKind::Rotate => Some(base + time * 0.5),
                AnimationKind::SlideHorizontal => Some(0.0),
                AnimationKind::SlideVertical => Some(std::f32::consts::FRAC_PI_2),
                AnimationKind::Diagonal => Some(std::f32::consts::FRAC_PI_4 + time * 0.3),
                AnimationKind::Wave => Some(base + time.sin() * 0.5),
                _ => None,
            };
        }
        (GradientKind::Conic { .. }, AnimationKind::Rotate) => {
            params.angle_radians = Some(time);
        }
        (GradientKind::Radial, AnimationKind::Pulse | AnimationKind::Zoom) => {
            params.radius_scale = Some(1.0 + time.sin() / 3.0);
        }
        _ => {}
    }

    if animation == AnimationKind::ColorShift {
        params.stop_shift = Some((time * 0.1).rem_euclid(1.0));
    }

    params
}

/// Stop positions for `count` evenly spaced stops, optionally shifted with wrap-around.
///
/// The result is in stop order, not sorted by offset.
pub fn stop_offsets(count: usize, shift: Option<f32>) -> Vec<f32> {
    (0..count)
        .map(|i| {
            let base = if count > 1 {
                i as f32 / (count - 1) as f32
            } else {
                0.0
            };
            match shift {
                Some(s) => (base + s).rem_euclid(1.0),
                None => base,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnimationSpec;

    fn clock(kind: AnimationKind, direction: Direction, easing: EasingType) -> AnimationClock {
        AnimationClock::new(AnimationSpec::new(kind, 2.0, direction, easing), false)
    }

    #[test]
    fn forward_linear_is_elapsed_times_speed() {
        let c = clock(AnimationKind::Rotate, Direction::Forward, EasingType::Linear);
        assert!((c.time(1.5) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn reduced_motion_scales_speed() {
        let mut c = clock(AnimationKind::Wave, Direction::Forward, EasingType::Linear);
        c.reduced_motion = true;
        assert!((c.time(10.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn reverse_negates_time() {
        let c = clock(AnimationKind::Wave, Direction::Reverse, EasingType::Linear);
        assert!((c.time(1.0) + 2.0).abs() < 1e-9);
    }

    #[test]
    fn alternate_folds_back_after_one_cycle() {
        let c = clock(AnimationKind::Wave, Direction::Alternate, EasingType::Linear);
        let period = cycle_period(AnimationKind::Wave);
        // elapsed * 2.0 = 1.5 periods -> folded to 0.5 periods
        let t = c.time(period * 0.75);
        assert!((t - period * 0.5).abs() < 1e-9);
        assert!(c.time(period).abs() < 1e-9);
    }

    #[test]
    fn easing_keeps_cycle_boundaries() {
        let c = clock(AnimationKind::Wave, Direction::Forward, EasingType::EaseInOut);
        let period = cycle_period(AnimationKind::Wave);
        assert!((c.time(period / 2.0) - period).abs() < 1e-6);
    }

    #[test]
    fn bounce_and_elastic_endpoints() {
        assert!((EasingType::Bounce.eval(1.0) - 1.0).abs() < 1e-6);
        assert_eq!(EasingType::Elastic.eval(0.0), 0.0);
        assert_eq!(EasingType::Elastic.eval(1.0), 1.0);
    }

    #[test]
    fn slide_overrides_angle() {
        let kind = GradientKind::linear(135.0);
        let p = map_parameters(&kind, AnimationKind::SlideVertical, 12.0);
        assert_eq!(p.angle_radians, Some(std::f32::consts::FRAC_PI_2));
        assert_eq!(p.stop_shift, None);
    }

    #[test]
    fn linear_angle_mappings() {
        use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
        let base = 30f32.to_radians();
        let t = 2.0f32;
        let cases = [
            (AnimationKind::Rotate, Some(base + 0.5 * t)),
            (AnimationKind::SlideHorizontal, Some(0.0)),
            (AnimationKind::SlideVertical, Some(FRAC_PI_2)),
            (AnimationKind::Diagonal, Some(FRAC_PI_4 + 0.3 * t)),
            (AnimationKind::Wave, Some(base + t.sin() * 0.5)),
            (AnimationKind::Pulse, None),
            (AnimationKind::Zoom, None),
            (AnimationKind::ColorShift, None),
        ];
        for (animation, expected) in cases {
            let p = map_parameters(&GradientKind::linear(30.0), animation, t);
            match (p.angle_radians, expected) {
                (Some(a), Some(e)) => assert!((a - e).abs() < 1e-5, "{animation:?}: {a} != {e}"),
                (a, e) => assert_eq!(a, e, "{animation:?}"),
            }
            assert_eq!(p.radius_scale, None, "{animation:?}");
        }
    }

    #[test]
    fn radial_and_conic_mappings() {
        let t = 1.25f32;
        for animation in [AnimationKind::Pulse, AnimationKind::Zoom] {
            let p = map_parameters(&GradientKind::Radial, animation, t);
            let scale = p.radius_scale.unwrap();
            assert!((scale - (1.0 + t.sin() / 3.0)).abs() < 1e-6);
            assert_eq!(p.angle_radians, None);
        }

        let p = map_parameters(&GradientKind::conic(200.0), AnimationKind::Rotate, t);
        assert_eq!(p.angle_radians, Some(t));

        let p = map_parameters(&GradientKind::Radial, AnimationKind::ColorShift, 14.0);
        assert!((p.stop_shift.unwrap() - 0.4).abs() < 1e-5);
    }

    #[test]
    fn unsupported_combinations_are_static() {
        let p = map_parameters(&GradientKind::Radial, AnimationKind::Rotate, 3.0);
        assert_eq!(p, AnimatedParams::default());
        let p = map_parameters(&GradientKind::conic(10.0), AnimationKind::Wave, 3.0);
        assert_eq!(p, AnimatedParams::default());
    }

    #[test]
    fn single_stop_offsets_do_not_divide_by_zero() {
        assert_eq!(stop_offsets(1, None), vec![0.0]);
    }
}
