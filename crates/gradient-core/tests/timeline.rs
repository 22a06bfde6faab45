//! Keyframe Timeline Tests
//!
//! Interpolation between keyframes, editing guards and playback.

use gradient_core::timeline::{Keyframe, Timeline};
use gradient_core::{ColorStops, EditError, GradientDescriptor};

fn keyframe(id: u64, position: f32, colors: &[&str], angle: f32) -> Keyframe {
    Keyframe {
        id,
        position,
        color_stops: ColorStops::from_hex(colors).unwrap(),
        angle_degrees: angle,
    }
}

/// Halfway between two keyframes every channel and the angle sit exactly in the middle.
#[test]
fn midpoint_is_halfway_per_channel() {
    let tl = Timeline::new(vec![
        keyframe(1, 0.0, &["#000000", "#ff0000"], 0.0),
        keyframe(2, 100.0, &["#ffffff", "#0000ff"], 90.0),
    ])
    .unwrap();

    let mid = tl.interpolate(50.0);
    assert_eq!(mid.color_stops.to_hex(), vec!["#808080", "#800080"]);
    assert_eq!(mid.angle_degrees, 45.0);
}

/// Anchors return the keyframe values untouched, even when stop counts differ.
#[test]
fn anchors_return_keyframes_verbatim() {
    let tl = Timeline::new(vec![
        keyframe(1, 0.0, &["#000000", "#ffffff"], 10.0),
        keyframe(2, 100.0, &["#ff0000", "#00ff00", "#0000ff"], 20.0),
    ])
    .unwrap();

    assert_eq!(tl.interpolate(0.0).color_stops.len(), 2);
    assert_eq!(tl.interpolate(100.0).color_stops.len(), 3);
    // in between, the shorter list repeats its last color
    let mid = tl.interpolate(50.0);
    assert_eq!(mid.color_stops.len(), 3);
    assert_eq!(mid.color_stops[2].to_hex(), "#8080ff");
    assert_eq!(tl.interpolate(-20.0).angle_degrees, 10.0);
}

/// Keyframes are interpolated in position order, regardless of insertion order.
#[test]
fn keyframes_are_sorted_by_position() {
    let tl = Timeline::new(vec![
        keyframe(1, 100.0, &["#ffffff", "#ffffff"], 0.0),
        keyframe(2, 0.0, &["#000000", "#000000"], 0.0),
        keyframe(3, 50.0, &["#ff0000", "#ff0000"], 0.0),
    ])
    .unwrap();
    assert_eq!(tl.interpolate(25.0).color_stops[0].to_hex(), "#800000");
    assert_eq!(tl.interpolate(75.0).color_stops[0].to_hex(), "#ff8080");
}

/// The default timeline runs from the gradient to its reverse, rotated 180°.
#[test]
fn from_gradient_mirrors_the_gradient() {
    let g = GradientDescriptor::default();
    let tl = Timeline::from_gradient(&g);
    assert_eq!(tl.keyframes().len(), 2);
    assert_eq!(tl.interpolate(0.0).color_stops, g.color_stops);
    let end = tl.interpolate(100.0);
    assert_eq!(end.color_stops, g.color_stops.reversed());
    assert_eq!(end.angle_degrees, 225.0);
}

/// A timeline never drops below two keyframes.
#[test]
fn removal_keeps_two_keyframes() {
    assert_eq!(
        Timeline::new(vec![keyframe(1, 0.0, &["#000000", "#ffffff"], 0.0)]).unwrap_err(),
        EditError::TooFewKeyframes
    );

    let g = GradientDescriptor::default();
    let mut tl = Timeline::from_gradient(&g);
    assert_eq!(tl.remove_keyframe(1), Err(EditError::TooFewKeyframes));

    tl.scrub(40.0);
    let id = tl.add_keyframe(&g.with_angle(10.0));
    assert_eq!(tl.keyframe(id).unwrap().position, 40.0);
    assert_eq!(tl.interpolate(40.0).angle_degrees, 10.0);

    tl.move_keyframe(id, 140.0).unwrap();
    assert_eq!(tl.keyframe(id).unwrap().position, 100.0);
    tl.remove_keyframe(id).unwrap();
    assert_eq!(tl.remove_keyframe(99), Err(EditError::UnknownKeyframe(99)));
}

/// Playback resumes from the scrubbed position and scrubbing pauses.
#[test]
fn playback_resumes_from_position() {
    let mut tl = Timeline::from_gradient(&GradientDescriptor::default());
    tl.scrub(50.0);
    tl.play(10_000.0);
    assert!(tl.is_playing());
    assert!((tl.advance(10_750.0) - 75.0).abs() < 1e-3);

    tl.scrub(10.0);
    assert!(!tl.is_playing());
    assert_eq!(tl.advance(99_999.0), 10.0);

    tl.jump_to_keyframe(2).unwrap();
    assert_eq!(tl.position(), 100.0);
    assert_eq!(tl.format_time(tl.position()), "3:00");
}

/// The current keyframe values are written onto the gradient.
#[test]
fn apply_to_overrides_colors_and_angle() {
    let g = GradientDescriptor::default();
    let mut tl = Timeline::from_gradient(&g);
    tl.scrub(100.0);
    let applied = tl.apply_to(&g);
    assert_eq!(applied.color_stops, g.color_stops.reversed());
    assert_eq!(applied.angle_degrees(), 225.0);
    assert_eq!(applied.animation, g.animation);
}
