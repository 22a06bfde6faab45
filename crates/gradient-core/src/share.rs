//! Share links: a gradient encoded in URL query parameters.
//!
//! `?colors=#a,#b&angle=45&type=linear&animation=rotate&speed=1&direction=forward&easing=linear`

use crate::animation::parse_easing;
use crate::color::Color;
use crate::types::{
    AnimationKind, AnimationSpec, ColorStops, Direction, GradientDescriptor, GradientKind,
};
use std::collections::HashMap;
use url::Url;

/// Builds a share link for `gradient` on top of `base`. Any existing query is replaced.
pub fn share_url(base: &str, gradient: &GradientDescriptor) -> Result<String, url::ParseError> {
    let mut url = Url::parse(base)?;
    let colors = gradient.color_stops.to_hex().join(",");
    let animation = &gradient.animation;
    url.query_pairs_mut()
        .clear()
        .append_pair("colors", &colors)
        .append_pair("angle", &gradient.angle_degrees().to_string())
        .append_pair("type", gradient.kind.name())
        .append_pair("animation", animation.kind.as_str())
        .append_pair("speed", &animation.speed().to_string())
        .append_pair("direction", animation.direction.as_str())
        .append_pair("easing", animation.easing.as_str());
    Ok(url.into())
}

/// Reads a gradient from a share link.
///
/// Returns `None` without a `colors` parameter or with fewer than two colors. Other missing or
/// malformed parameters fall back to their defaults.
pub fn parse_share_url(link: &str) -> Option<GradientDescriptor> {
    let url = Url::parse(link).ok()?;
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

    let colors: Vec<Color> = params
        .get("colors")?
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(Color::parse)
        .collect();
    let stops = ColorStops::new(colors).ok()?;

    let defaults = GradientDescriptor::default();
    let angle = params
        .get("angle")
        .and_then(|a| a.parse::<f32>().ok())
        .filter(|a| a.is_finite())
        .unwrap_or_else(|| defaults.angle_degrees());
    let kind = params
        .get("type")
        .and_then(|t| GradientKind::from_name(t, angle))
        .unwrap_or_else(|| GradientKind::linear(angle));

    let fallback = defaults.animation;
    let animation = AnimationSpec::new(
        params
            .get("animation")
            .and_then(|a| AnimationKind::parse(a))
            .unwrap_or(fallback.kind),
        params
            .get("speed")
            .and_then(|s| s.parse::<f32>().ok())
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(fallback.speed()),
        params
            .get("direction")
            .and_then(|d| Direction::parse(d))
            .unwrap_or(fallback.direction),
        params
            .get("easing")
            .map(|e| parse_easing(e))
            .unwrap_or(fallback.easing),
    );

    Some(GradientDescriptor::new(kind, stops, animation))
}
