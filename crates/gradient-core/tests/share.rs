//! Share Link Tests

use gradient_core::animation::EasingType;
use gradient_core::share::{parse_share_url, share_url};
use gradient_core::{
    AnimationKind, AnimationSpec, ColorStops, Direction, GradientDescriptor, GradientKind,
};

/// Every descriptor field survives a share link.
#[test]
fn link_carries_the_whole_descriptor() {
    let g = GradientDescriptor::new(
        GradientKind::conic(33.5),
        ColorStops::from_hex(&["#010203", "#a0b0c0", "#ffffff"]).unwrap(),
        AnimationSpec::new(
            AnimationKind::ColorShift,
            2.5,
            Direction::Alternate,
            EasingType::Bounce,
        ),
    );
    let link = share_url("https://example.org/studio?old=1", &g).unwrap();
    assert!(!link.contains("old=1"));
    assert_eq!(parse_share_url(&link), Some(g));
}

/// Radial gradients share without an angle of their own.
#[test]
fn radial_link() {
    let g = GradientDescriptor::default().with_kind(GradientKind::Radial);
    let link = share_url("https://example.org/", &g).unwrap();
    assert!(link.contains("type=radial"));
    assert_eq!(parse_share_url(&link).unwrap().kind, GradientKind::Radial);
}

/// Links need at least two colors; other bad values fall back to defaults.
#[test]
fn malformed_links() {
    assert_eq!(parse_share_url("https://example.org/?angle=90"), None);
    assert_eq!(parse_share_url("https://example.org/?colors=%23ffffff"), None);
    assert_eq!(parse_share_url("not a url"), None);

    let g = parse_share_url(
        "https://example.org/?colors=%23000000,%23ffffff&angle=abc&type=spiral&speed=-4&easing=wobble",
    )
    .unwrap();
    let defaults = GradientDescriptor::default();
    assert_eq!(g.kind, GradientKind::linear(defaults.angle_degrees()));
    assert_eq!(g.animation, defaults.animation);
    assert_eq!(g.color_stops.to_hex(), vec!["#000000", "#ffffff"]);
}

/// Non-finite speeds fall back to the default speed.
#[test]
fn infinite_speed_uses_default() {
    let defaults = GradientDescriptor::default();
    for speed in ["inf", "infinity", "NaN"] {
        let g = parse_share_url(&format!(
            "https://example.org/?colors=%23000000,%23ffffff&speed={speed}"
        ))
        .unwrap();
        assert_eq!(g.animation.speed(), defaults.animation.speed(), "{speed}");
    }
}
