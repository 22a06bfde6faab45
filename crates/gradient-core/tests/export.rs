//! Export Tests
//!
//! Code snippets, still images and frame-by-frame video export into an in-memory sink.

use gradient_core::export::code::{generate, CodeFormat};
use gradient_core::export::image::{data_uri, render_image, ImageFormat};
use gradient_core::export::video::{render_video, ExportSlot, VideoQuality, VideoSettings};
use gradient_core::systems::renderer::{RenderInputs, RendererConfig};
use gradient_core::video_wrapper::CountingEncoder;
use gradient_core::{
    CanvasSize, ColorStops, Effects, GradientDescriptor, GradientKind, RenderError,
};

fn sunset(kind: GradientKind) -> GradientDescriptor {
    GradientDescriptor::default()
        .with_kind(kind)
        .with_stops(ColorStops::from_hex(&["#ec4899", "#3b82f6"]).unwrap())
}

fn small(gradient: GradientDescriptor) -> RenderInputs {
    RenderInputs::new(gradient, Effects::new(1.0, 0.05), CanvasSize::new(32, 18))
}

/// CSS and Tailwind output for each gradient kind.
#[test]
fn css_and_tailwind_snippets() {
    assert_eq!(
        generate(CodeFormat::Css, &sunset(GradientKind::linear(45.0))),
        "background: linear-gradient(45deg, #ec4899, #3b82f6);"
    );
    assert_eq!(
        generate(CodeFormat::Css, &sunset(GradientKind::Radial)),
        "background: radial-gradient(circle, #ec4899, #3b82f6);"
    );
    assert_eq!(
        generate(CodeFormat::Css, &sunset(GradientKind::conic(90.0))),
        "background: conic-gradient(from 90deg, #ec4899, #3b82f6);"
    );
    assert_eq!(
        generate(CodeFormat::Tailwind, &sunset(GradientKind::linear(45.0))),
        "bg-[linear-gradient(45deg,#ec4899,#3b82f6)]"
    );
}

/// Linear and radial SVG documents parse; conic has no SVG form.
#[test]
fn svg_documents_parse() {
    for kind in [GradientKind::linear(30.0), GradientKind::Radial] {
        let svg = generate(CodeFormat::Svg, &sunset(kind));
        let tree = usvg::Tree::from_str(&svg, &usvg::Options::default());
        assert!(tree.is_ok(), "failed to parse:\n{svg}");
        assert!(svg.contains("stop-color=\"#3b82f6\""));
    }
    let conic = generate(CodeFormat::Svg, &sunset(GradientKind::conic(0.0)));
    assert!(conic.starts_with("<!--"));
}

/// Canvas and React snippets use the matching constructors.
#[test]
fn canvas_and_react_snippets() {
    let js = generate(CodeFormat::Canvas, &sunset(GradientKind::conic(90.0)));
    assert!(js.contains("createConicGradient"));
    assert!(js.contains("grad.addColorStop(1, \"#3b82f6\");"));

    let jsx = generate(CodeFormat::React, &sunset(GradientKind::Radial));
    assert!(jsx.contains("export const GradientBackground"));
    assert!(jsx.contains("background: 'radial-gradient(circle, #ec4899, #3b82f6)'"));
}

/// PNG and JPEG stills decode back to the canvas size.
#[test]
fn still_images_encode() {
    let inputs = small(GradientDescriptor::default());
    let config = RendererConfig {
        seed: Some(3),
        ..RendererConfig::default()
    };

    let png = render_image(&inputs, 0.0, config, ImageFormat::Png).unwrap();
    assert_eq!(&png[..4], b"\x89PNG");
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (32, 18));

    let jpeg = render_image(&inputs, 0.0, config, ImageFormat::Jpeg { quality: 80 }).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    assert!(data_uri(&jpeg, ImageFormat::Jpeg { quality: 80 }).starts_with("data:image/jpeg;base64,"));
}

/// Frame `i` is rendered at `i / fps` and progress ends at 100%.
#[test]
fn video_frames_are_timed_by_fps() {
    let inputs = small(sunset(GradientKind::linear(0.0)));
    let settings = VideoSettings {
        fps: 30,
        duration_secs: 0.1,
        quality: VideoQuality::Hd720,
    };
    assert_eq!(settings.frame_count(), 3);

    let mut sink = CountingEncoder::new();
    let mut progress = Vec::new();
    let frames = render_video(
        &inputs,
        &settings,
        RendererConfig::default(),
        &mut sink,
        |p| progress.push(p),
    )
    .unwrap();

    assert_eq!(frames, 3);
    assert_eq!(sink.frames, 3);
    assert_eq!(sink.timestamps, vec![0.0, 1.0 / 30.0, 2.0 / 30.0]);
    assert_eq!(sink.last_shape, Some((18, 32, 4)));
    assert!(sink.finished);
    assert_eq!(progress.last().copied(), Some(100.0));
}

/// Quality presets map to sizes and bitrates; five seconds at 30 fps is 150 frames.
#[test]
fn quality_presets() {
    assert_eq!(VideoSettings::default().frame_count(), 150);
    assert_eq!(VideoQuality::parse("4k"), Some(VideoQuality::Uhd4k));
    assert_eq!(VideoQuality::Uhd4k.canvas_size(), CanvasSize::UHD_4K);
    assert_eq!(VideoQuality::Hd720.bitrate(), 5_000_000);
}

/// Only one export may run at a time.
#[test]
fn export_slot_is_single_flight() {
    let slot = ExportSlot::new();
    let guard = slot.try_begin().unwrap();
    assert!(slot.is_busy());
    assert!(matches!(slot.try_begin(), Err(RenderError::ExportInFlight)));
    drop(guard);
    assert!(!slot.is_busy());
    assert!(slot.try_begin().is_ok());
}
