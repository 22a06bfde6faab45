//! # Geometry Module
//!
//! Resolves a gradient kind + surface size (+ animation perturbation) into concrete
//! draw coordinates. Pure and deterministic.

use crate::animation::{map_parameters, AnimatedParams};
use crate::types::{AnimationKind, GradientKind};

/// Concrete paint coordinates for one frame, in surface pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Geometry {
    /// Gradient line from `start` (offset 0) to `end` (offset 1).
    Linear { start: (f32, f32), end: (f32, f32) },
    /// Circle centered at `center`; offset 1 at `radius`.
    Radial { center: (f32, f32), radius: f32 },
    /// Sweep around `center`, beginning at `start_angle` radians (0 = +x, clockwise).
    Conic { center: (f32, f32), start_angle: f32 },
}

/// Default radial radius: half the longest side.
pub fn base_radius(width: f32, height: f32) -> f32 {
    width.max(height) / 2.0
}

/// Resolves geometry from static parameters plus an already-mapped perturbation.
pub fn resolve_geometry(
    kind: &GradientKind,
    width: f32,
    height: f32,
    params: &AnimatedParams,
) -> Geometry {
    let center = (width / 2.0, height / 2.0);

    match kind {
        GradientKind::Linear { angle_degrees } => {
            let theta = params
                .angle_radians
                .unwrap_or_else(|| angle_degrees.to_radians());
            let half = width.max(height) / 2.0;
            let (dx, dy) = (theta.cos() * half, theta.sin() * half);
            Geometry::Linear {
                start: (center.0 - dx, center.1 - dy),
                end: (center.0 + dx, center.1 + dy),
            }
        }
        GradientKind::Radial => {
            let base = base_radius(width, height);
            let radius = base * params.radius_scale.unwrap_or(1.0);
            Geometry::Radial {
                center,
                radius: radius.max(0.0),
            }
        }
        GradientKind::Conic { angle_degrees } => Geometry::Conic {
            center,
            start_angle: params
                .angle_radians
                .unwrap_or_else(|| angle_degrees.to_radians()),
        },
    }
}

/// Resolves geometry for animation time `time`.
pub fn resolve_at(
    kind: &GradientKind,
    animation: AnimationKind,
    width: f32,
    height: f32,
    time: f32,
) -> Geometry {
    let params = map_parameters(kind, animation, time);
    resolve_geometry(kind, width, height, &params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_linear_spans_longest_side() {
        let g = resolve_at(
            &GradientKind::linear(0.0),
            AnimationKind::Pulse,
            200.0,
            100.0,
            5.0,
        );
        assert_eq!(
            g,
            Geometry::Linear {
                start: (0.0, 50.0),
                end: (200.0, 50.0)
            }
        );
    }

    #[test]
    fn conic_uses_static_angle_without_rotation() {
        let g = resolve_at(
            &GradientKind::conic(90.0),
            AnimationKind::Wave,
            100.0,
            100.0,
            1.0,
        );
        match g {
            Geometry::Conic {
                center,
                start_angle,
            } => {
                assert_eq!(center, (50.0, 50.0));
                assert!((start_angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
            }
            other => panic!("expected conic, got {other:?}"),
        }
    }

    #[test]
    fn equal_inputs_give_equal_geometry() {
        for kind in [GradientKind::linear(10.0), GradientKind::Radial, GradientKind::conic(300.0)] {
            for animation in AnimationKind::ALL {
                for t in [0.0, 0.7, 42.0] {
                    assert_eq!(
                        resolve_at(&kind, animation, 640.0, 360.0, t),
                        resolve_at(&kind, animation, 640.0, 360.0, t),
                        "{kind:?} {animation:?} at {t}"
                    );
                }
            }
        }
    }

    #[test]
    fn zoom_scales_radial_radius() {
        let t = std::f32::consts::FRAC_PI_2 * 3.0;
        match resolve_at(&GradientKind::Radial, AnimationKind::Zoom, 120.0, 60.0, t) {
            Geometry::Radial { radius, .. } => assert!((radius - 40.0).abs() < 1e-4),
            other => panic!("expected radial, got {other:?}"),
        }
    }
}
