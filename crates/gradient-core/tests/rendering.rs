//! Rendering Tests
//!
//! Frame planning (geometry and stop offsets) and raster output of the frame renderer.

use gradient_core::animation::{stop_offsets, AnimationClock};
use gradient_core::geometry::{base_radius, Geometry};
use gradient_core::systems::effects::NoiseQuality;
use gradient_core::systems::renderer::{plan_frame, FrameRenderer, RenderInputs, RendererConfig};
use gradient_core::{
    AnimationKind, AnimationSpec, CanvasSize, ColorStops, Effects, GradientDescriptor,
    GradientKind,
};

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

fn seeded() -> RendererConfig {
    RendererConfig {
        seed: Some(7),
        ..RendererConfig::default()
    }
}

fn gradient(kind: GradientKind, animation: AnimationKind, colors: &[&str]) -> GradientDescriptor {
    GradientDescriptor::new(
        kind,
        ColorStops::from_hex(colors).unwrap(),
        AnimationSpec::default().with_kind(animation),
    )
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

/// A 45° rotating linear gradient at t=0 runs through the canvas center at 45°,
/// with evenly spaced stops.
#[test]
fn linear_rotate_at_time_zero() {
    let g = GradientDescriptor::default();
    let size = CanvasSize::new(200, 200);
    let time = AnimationClock::new(g.animation, false).time(0.0) as f32;
    let plan = plan_frame(&g, size, time);

    let Geometry::Linear { start, end } = plan.geometry else {
        panic!("expected linear geometry, got {:?}", plan.geometry);
    };
    let mid = ((start.0 + end.0) / 2.0, (start.1 + end.1) / 2.0);
    assert!(approx(mid.0, 100.0) && approx(mid.1, 100.0));
    let angle = (end.1 - start.1).atan2(end.0 - start.0).to_degrees();
    assert!(approx(angle, 45.0), "angle was {angle}");

    let offsets: Vec<f32> = plan.stops.iter().map(|s| s.offset).collect();
    assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
    assert_eq!(plan.stops[0].color.to_hex(), "#ec4899");
}

/// Color shift moves every stop by `time * 0.1 mod 1`, wrapping past 1 back through 0.
#[test]
fn color_shift_wraps_offsets() {
    let shifted = stop_offsets(3, Some(0.3));
    assert!(approx(shifted[0], 0.3));
    assert!(approx(shifted[1], 0.8));
    assert!(approx(shifted[2], 0.3));

    let g = gradient(
        GradientKind::linear(0.0),
        AnimationKind::ColorShift,
        &["#ff0000", "#00ff00", "#0000ff"],
    );
    let plan = plan_frame(&g, CanvasSize::new(100, 100), 3.0);
    let offsets: Vec<f32> = plan.stops.iter().map(|s| s.offset).collect();
    assert!(offsets.windows(2).all(|w| w[0] <= w[1]), "stops must be sorted: {offsets:?}");
    assert!(approx(*offsets.last().unwrap(), 0.8));
    assert_eq!(plan.stops.last().unwrap().color.to_hex(), "#00ff00");
}

/// Radial pulse at time π/2 grows the radius by a third.
#[test]
fn radial_pulse_peak_radius() {
    let g = gradient(GradientKind::Radial, AnimationKind::Pulse, &["#000000", "#ffffff"]);
    let size = CanvasSize::new(300, 150);
    let plan = plan_frame(&g, size, std::f32::consts::FRAC_PI_2);
    let base = base_radius(300.0, 150.0);
    match plan.geometry {
        Geometry::Radial { center, radius } => {
            assert_eq!(center, (150.0, 75.0));
            assert!(approx(radius, base + base / 3.0), "radius was {radius}");
        }
        other => panic!("expected radial geometry, got {other:?}"),
    }
}

/// A horizontal red-to-blue gradient is red on the left edge and blue on the right.
#[test]
fn renders_expected_edge_colors() {
    setup();
    let g = gradient(GradientKind::linear(0.0), AnimationKind::Pulse, &["#ff0000", "#0000ff"]);
    let inputs = RenderInputs::new(g, Effects::default(), CanvasSize::new(100, 10));
    let mut renderer = FrameRenderer::new(seeded());
    assert!(renderer.draw(&inputs, 1.0).unwrap().is_some());

    let px = renderer.read_rgba().unwrap();
    let left = &px[5 * 400..5 * 400 + 4];
    let right = &px[5 * 400 + 99 * 4..5 * 400 + 100 * 4];
    assert!(left[0] > 240 && left[2] < 15, "left pixel {left:?}");
    assert!(right[2] > 240 && right[0] < 15, "right pixel {right:?}");
    assert_eq!(left[3], 255);
    assert_eq!(renderer.stats().frames, 1);
}

/// Blur is reapplied to a freshly painted frame, so redrawing the same instant gives the same
/// pixels instead of an ever blurrier image.
#[test]
fn blur_does_not_compound() {
    setup();
    let inputs = RenderInputs::new(
        GradientDescriptor::default(),
        Effects::new(6.0, 0.0),
        CanvasSize::new(64, 64),
    );
    let mut renderer = FrameRenderer::new(seeded());
    renderer.draw(&inputs, 0.5).unwrap();
    let first = renderer.read_rgba().unwrap();
    for _ in 0..3 {
        renderer.draw(&inputs, 0.5).unwrap();
    }
    assert_eq!(renderer.read_rgba().unwrap(), first);
}

/// A fixed seed makes noisy frames reproducible across renderers.
#[test]
fn seeded_noise_is_reproducible() {
    setup();
    let inputs = RenderInputs::new(
        GradientDescriptor::default(),
        Effects::new(0.0, 0.4),
        CanvasSize::new(48, 32),
    );
    let config = RendererConfig {
        noise_quality: NoiseQuality::Strided { stride: 2 },
        ..seeded()
    };

    let mut a = FrameRenderer::new(config);
    let mut b = FrameRenderer::new(config);
    a.draw(&inputs, 0.25).unwrap();
    b.draw(&inputs, 0.25).unwrap();
    assert_eq!(a.read_rgba().unwrap(), b.read_rgba().unwrap());

    let mut clean = FrameRenderer::new(seeded());
    let quiet = RenderInputs {
        effects: Effects::default(),
        ..inputs.clone()
    };
    clean.draw(&quiet, 0.25).unwrap();
    assert_ne!(a.read_rgba().unwrap(), clean.read_rgba().unwrap());
}

/// A zero-sized canvas draws nothing and does not error.
#[test]
fn empty_canvas_draws_nothing() {
    let inputs = RenderInputs::new(
        GradientDescriptor::default(),
        Effects::default(),
        CanvasSize::new(0, 100),
    );
    let mut renderer = FrameRenderer::new(RendererConfig::default());
    assert_eq!(renderer.draw(&inputs, 0.0).unwrap(), None);
    assert!(renderer.surface().is_none());
    assert!(renderer.read_rgba().is_err());
}

/// Resizing reallocates the surface.
#[test]
fn surface_follows_canvas_size() {
    let mut renderer = FrameRenderer::new(seeded());
    let mut inputs = RenderInputs::new(
        GradientDescriptor::default(),
        Effects::default(),
        CanvasSize::new(20, 10),
    );
    renderer.draw(&inputs, 0.0).unwrap();
    assert_eq!(renderer.size(), Some(CanvasSize::new(20, 10)));

    inputs.canvas_size = CanvasSize::new(8, 8);
    renderer.draw(&inputs, 0.0).unwrap();
    assert_eq!(renderer.size(), Some(CanvasSize::new(8, 8)));
    assert_eq!(renderer.read_rgba().unwrap().len(), 8 * 8 * 4);
}

fn red_at(px: &[u8], width: usize, x: usize, y: usize) -> i32 {
    px[(y * width + x) * 4] as i32
}

/// The conic start angle turns the sweep clockwise: at 90° the red start sits below the
/// center, so the left edge is a quarter of the way round instead of half.
#[test]
fn conic_start_angle_rotates_sweep() {
    setup();
    let size = CanvasSize::new(101, 101);
    let draw = |kind: GradientKind| {
        let g = gradient(kind, AnimationKind::Wave, &["#ff0000", "#0000ff"]);
        let mut renderer = FrameRenderer::new(seeded());
        renderer
            .draw(&RenderInputs::new(g, Effects::default(), size), 0.0)
            .unwrap();
        renderer.read_rgba().unwrap()
    };

    let unrotated = draw(GradientKind::conic(0.0));
    let rotated = draw(GradientKind::conic(90.0));

    // left of center: 180° into the sweep, then 90°
    assert!((red_at(&unrotated, 101, 10, 50) - 128).abs() < 20);
    assert!((red_at(&rotated, 101, 10, 50) - 191).abs() < 20);
    // above center: 270°, then 180°
    assert!((red_at(&unrotated, 101, 50, 10) - 64).abs() < 20);
    assert!((red_at(&rotated, 101, 50, 10) - 128).abs() < 20);
}

/// A rotating conic gradient uses animation time as its start angle.
#[test]
fn conic_rotate_follows_time() {
    setup();
    let size = CanvasSize::new(64, 64);
    let colors = ["#ff0000", "#00ff00", "#0000ff"];

    let spinning = RenderInputs::new(
        gradient(GradientKind::conic(0.0), AnimationKind::Rotate, &colors),
        Effects::default(),
        size,
    );
    let mut a = FrameRenderer::new(seeded());
    let plan = a
        .draw(&spinning, std::f64::consts::FRAC_PI_2)
        .unwrap()
        .unwrap();
    match plan.geometry {
        Geometry::Conic { start_angle, .. } => {
            assert!(approx(start_angle, std::f32::consts::FRAC_PI_2))
        }
        other => panic!("expected conic geometry, got {other:?}"),
    }

    let fixed = RenderInputs::new(
        gradient(GradientKind::conic(90.0), AnimationKind::Wave, &colors),
        Effects::default(),
        size,
    );
    let mut b = FrameRenderer::new(seeded());
    b.draw(&fixed, 0.0).unwrap();
    let (pa, pb) = (a.read_rgba().unwrap(), b.read_rgba().unwrap());
    let max_diff = pa
        .iter()
        .zip(&pb)
        .map(|(x, y)| (*x as i32 - *y as i32).abs())
        .max()
        .unwrap_or(0);
    assert!(max_diff <= 2, "frames differ by {max_diff}");
}

/// Noisy frames keep working across resizes.
#[test]
fn noise_survives_resize() {
    setup();
    let mut renderer = FrameRenderer::new(seeded());
    let mut inputs = RenderInputs::new(
        GradientDescriptor::default(),
        Effects::new(0.0, 0.3),
        CanvasSize::new(40, 30),
    );
    for size in [CanvasSize::new(40, 30), CanvasSize::new(12, 70), CanvasSize::new(40, 30)] {
        inputs.canvas_size = size;
        assert!(renderer.draw(&inputs, 0.1).unwrap().is_some());
        assert_eq!(renderer.read_rgba().unwrap().len(), size.pixel_count() * 4);
    }
    assert_eq!(renderer.stats().frames, 3);
}
