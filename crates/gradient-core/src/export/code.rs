//! Code snippet generation for CSS, SVG, canvas JS, Tailwind and React.

use crate::animation::stop_offsets;
use crate::color::Color;
use crate::types::{GradientDescriptor, GradientKind};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodeFormat {
    Css,
    Svg,
    Canvas,
    Tailwind,
    React,
}

impl CodeFormat {
    pub const ALL: [CodeFormat; 5] = [
        CodeFormat::Css,
        CodeFormat::Svg,
        CodeFormat::Canvas,
        CodeFormat::Tailwind,
        CodeFormat::React,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeFormat::Css => "css",
            CodeFormat::Svg => "svg",
            CodeFormat::Canvas => "canvas",
            CodeFormat::Tailwind => "tailwind",
            CodeFormat::React => "react",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

/// Generates the snippet for `format`.
pub fn generate(format: CodeFormat, gradient: &GradientDescriptor) -> String {
    match format {
        CodeFormat::Css => to_css(gradient),
        CodeFormat::Svg => to_svg(gradient),
        CodeFormat::Canvas => to_canvas_js(gradient),
        CodeFormat::Tailwind => to_tailwind(gradient),
        CodeFormat::React => to_react(gradient),
    }
}

fn join_hex(colors: &[Color], sep: &str) -> String {
    colors
        .iter()
        .map(Color::to_hex)
        .collect::<Vec<_>>()
        .join(sep)
}

/// The CSS gradient function, e.g. `linear-gradient(45deg, #ec4899, #3b82f6)`.
pub fn css_gradient(kind: &GradientKind, colors: &[Color]) -> String {
    let stops = join_hex(colors, ", ");
    match kind {
        GradientKind::Linear { angle_degrees } => {
            format!("linear-gradient({angle_degrees}deg, {stops})")
        }
        GradientKind::Radial => format!("radial-gradient(circle, {stops})"),
        GradientKind::Conic { angle_degrees } => {
            format!("conic-gradient(from {angle_degrees}deg, {stops})")
        }
    }
}

pub fn to_css(gradient: &GradientDescriptor) -> String {
    format!(
        "background: {};",
        css_gradient(&gradient.kind, &gradient.color_stops)
    )
}

fn svg_stops(colors: &[Color]) -> String {
    colors
        .iter()
        .zip(stop_offsets(colors.len(), None))
        .map(|(c, offset)| {
            format!(
                "      <stop offset=\"{}%\" stop-color=\"{}\" />",
                offset * 100.0,
                c.to_hex()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Standalone SVG document. SVG has no conic gradient, so conic yields a comment.
pub fn to_svg(gradient: &GradientDescriptor) -> String {
    let stops = svg_stops(&gradient.color_stops);
    let definition = match gradient.kind {
        GradientKind::Linear { angle_degrees } => {
            let theta = angle_degrees.to_radians();
            let (dx, dy) = (theta.cos() * 50.0, theta.sin() * 50.0);
            format!(
                "    <linearGradient id=\"gradient\" x1=\"{:.2}%\" y1=\"{:.2}%\" x2=\"{:.2}%\" y2=\"{:.2}%\">\n{stops}\n    </linearGradient>",
                50.0 - dx,
                50.0 - dy,
                50.0 + dx,
                50.0 + dy
            )
        }
        GradientKind::Radial => {
            format!("    <radialGradient id=\"gradient\">\n{stops}\n    </radialGradient>")
        }
        GradientKind::Conic { .. } => {
            return "<!-- Conic gradients are not supported in SVG -->".to_string();
        }
    };

    format!(
        "<svg width=\"100%\" height=\"100%\" viewBox=\"0 0 100 100\" preserveAspectRatio=\"none\" xmlns=\"http://www.w3.org/2000/svg\">\n  <defs>\n{definition}\n  </defs>\n  <rect width=\"100%\" height=\"100%\" fill=\"url(#gradient)\" />\n</svg>"
    )
}

/// A `<canvas>` 2D-context snippet drawing the same geometry as the renderer.
pub fn to_canvas_js(gradient: &GradientDescriptor) -> String {
    let stops = gradient
        .color_stops
        .iter()
        .zip(stop_offsets(gradient.color_stops.len(), None))
        .map(|(c, p)| format!("grad.addColorStop({p}, \"{}\");", c.to_hex()))
        .collect::<Vec<_>>()
        .join("\n");

    let setup = "const canvas = document.getElementById('myCanvas');\nconst ctx = canvas.getContext('2d');\nconst centerX = canvas.width / 2;\nconst centerY = canvas.height / 2;\n";
    let create = match gradient.kind {
        GradientKind::Linear { angle_degrees } => format!(
            "const angle = {angle_degrees} * Math.PI / 180;\nconst half = Math.max(canvas.width, canvas.height) / 2;\nconst grad = ctx.createLinearGradient(\n  centerX - Math.cos(angle) * half, centerY - Math.sin(angle) * half,\n  centerX + Math.cos(angle) * half, centerY + Math.sin(angle) * half\n);\n"
        ),
        GradientKind::Radial => "const radius = Math.max(canvas.width, canvas.height) / 2;\nconst grad = ctx.createRadialGradient(centerX, centerY, 0, centerX, centerY, radius);\n".to_string(),
        GradientKind::Conic { angle_degrees } => format!(
            "const startAngle = {angle_degrees} * Math.PI / 180;\nconst grad = ctx.createConicGradient(startAngle, centerX, centerY);\n"
        ),
    };

    format!("{setup}{create}{stops}\nctx.fillStyle = grad;\nctx.fillRect(0, 0, canvas.width, canvas.height);")
}

/// Tailwind arbitrary-value class. Spaces are not allowed inside the brackets.
pub fn to_tailwind(gradient: &GradientDescriptor) -> String {
    let css = css_gradient(&gradient.kind, &gradient.color_stops)
        .replace(", ", ",")
        .replace(' ', "_");
    format!("bg-[{css}]")
}

/// A React component rendering a full-size div with the gradient as its background.
pub fn to_react(gradient: &GradientDescriptor) -> String {
    let css = css_gradient(&gradient.kind, &gradient.color_stops);
    format!(
        "export const GradientBackground = ({{ children }}) => (\n  <div\n    style={{{{\n      width: '100%',\n      height: '100%',\n      background: '{css}',\n    }}}}\n  >\n    {{children}}\n  </div>\n);"
    )
}
