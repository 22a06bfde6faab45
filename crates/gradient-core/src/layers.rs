//! # Layer Compositor
//!
//! A stack of independently configured gradients blended on top of each other.
//!
//! Index 0 is the bottom of the stack and the last layer is topmost. Each layer's blend mode
//! applies against everything beneath it; the bottom visible layer always draws with normal
//! source-over. Hidden layers stay in the stack but are skipped by every output.

use crate::color::Color;
use crate::errors::EditError;
use crate::export::code::css_gradient;
use crate::systems::renderer::{paint_gradient, plan_static, FramePlan};
use crate::types::{CanvasSize, ColorStops, GradientDescriptor, GradientKind};
use serde::{Deserialize, Serialize};
use skia_safe::canvas::SaveLayerRec;
use skia_safe::{Canvas, Paint, Rect};
use tracing::warn;

/// Separable and non-separable blend modes shared by CSS and Skia.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
}

impl BlendMode {
    pub const ALL: [BlendMode; 12] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::ColorDodge,
        BlendMode::ColorBurn,
        BlendMode::HardLight,
        BlendMode::SoftLight,
        BlendMode::Difference,
        BlendMode::Exclusion,
    ];

    /// CSS `background-blend-mode` keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }

    pub fn to_skia(&self) -> skia_safe::BlendMode {
        match self {
            BlendMode::Normal => skia_safe::BlendMode::SrcOver,
            BlendMode::Multiply => skia_safe::BlendMode::Multiply,
            BlendMode::Screen => skia_safe::BlendMode::Screen,
            BlendMode::Overlay => skia_safe::BlendMode::Overlay,
            BlendMode::Darken => skia_safe::BlendMode::Darken,
            BlendMode::Lighten => skia_safe::BlendMode::Lighten,
            BlendMode::ColorDodge => skia_safe::BlendMode::ColorDodge,
            BlendMode::ColorBurn => skia_safe::BlendMode::ColorBurn,
            BlendMode::HardLight => skia_safe::BlendMode::HardLight,
            BlendMode::SoftLight => skia_safe::BlendMode::SoftLight,
            BlendMode::Difference => skia_safe::BlendMode::Difference,
            BlendMode::Exclusion => skia_safe::BlendMode::Exclusion,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub kind: GradientKind,
    pub color_stops: ColorStops,
    pub blend_mode: BlendMode,
    /// Percent, `0..=100`.
    pub opacity: u8,
    pub visible: bool,
}

impl Layer {
    pub fn opacity_f32(&self) -> f32 {
        self.opacity.min(100) as f32 / 100.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    /// Toward index 0 (further down the stack).
    Up,
    /// Toward the end of the stack.
    Down,
}

/// One draw pass of the composite, bottom first.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositePass {
    pub layer_id: String,
    pub kind: GradientKind,
    pub color_stops: ColorStops,
    pub blend_mode: BlendMode,
    pub opacity: f32,
}

/// Ordered layers with a floor of one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerStack {
    layers: Vec<Layer>,
    next_id: u64,
}

impl LayerStack {
    /// Starts a stack whose only layer mirrors `gradient`.
    pub fn from_gradient(gradient: &GradientDescriptor) -> Self {
        Self {
            layers: vec![Layer {
                id: "layer-1".to_string(),
                kind: gradient.kind,
                color_stops: gradient.color_stops.clone(),
                blend_mode: BlendMode::Normal,
                opacity: 100,
                visible: true,
            }],
            next_id: 2,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn index_of(&self, id: &str) -> Result<usize, EditError> {
        self.layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| EditError::UnknownLayer(id.to_string()))
    }

    fn layer_mut(&mut self, id: &str) -> Result<&mut Layer, EditError> {
        let index = self.index_of(id)?;
        Ok(&mut self.layers[index])
    }

    /// Appends a new top layer (linear 135°, overlay at 50%) and returns its id.
    pub fn add_layer(&mut self) -> String {
        let id = format!("layer-{}", self.next_id);
        self.next_id += 1;
        self.layers.push(Layer {
            id: id.clone(),
            kind: GradientKind::linear(135.0),
            color_stops: ColorStops::from_hex(&["#3b82f6", "#8b5cf6"]).unwrap_or_default(),
            blend_mode: BlendMode::Overlay,
            opacity: 50,
            visible: true,
        });
        id
    }

    pub fn remove_layer(&mut self, id: &str) -> Result<Layer, EditError> {
        let index = self.index_of(id)?;
        if self.layers.len() <= 1 {
            warn!(layer = id, "refusing to remove the last layer");
            return Err(EditError::LastLayer);
        }
        Ok(self.layers.remove(index))
    }

    pub fn set_kind(&mut self, id: &str, kind: GradientKind) -> Result<(), EditError> {
        self.layer_mut(id)?.kind = kind;
        Ok(())
    }

    pub fn set_blend_mode(&mut self, id: &str, mode: BlendMode) -> Result<(), EditError> {
        self.layer_mut(id)?.blend_mode = mode;
        Ok(())
    }

    /// Sets opacity in percent; values above 100 are clamped.
    pub fn set_opacity(&mut self, id: &str, percent: u8) -> Result<(), EditError> {
        self.layer_mut(id)?.opacity = percent.min(100);
        Ok(())
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), EditError> {
        self.layer_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn toggle_visible(&mut self, id: &str) -> Result<bool, EditError> {
        let layer = self.layer_mut(id)?;
        layer.visible = !layer.visible;
        Ok(layer.visible)
    }

    /// Swaps a layer with its neighbour. Moving past either end is a no-op.
    pub fn move_layer(&mut self, id: &str, direction: MoveDirection) -> Result<(), EditError> {
        let index = self.index_of(id)?;
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.layers.len() => index + 1,
            _ => return Ok(()),
        };
        self.layers.swap(index, target);
        Ok(())
    }

    /// Appends a white stop to a layer.
    pub fn add_stop(&mut self, id: &str) -> Result<(), EditError> {
        let layer = self.layer_mut(id)?;
        layer.color_stops = layer.color_stops.with_pushed(Color::WHITE);
        Ok(())
    }

    pub fn remove_stop(&mut self, id: &str, index: usize) -> Result<(), EditError> {
        let layer = self.layer_mut(id)?;
        match layer.color_stops.with_removed(index) {
            Ok(stops) => {
                layer.color_stops = stops;
                Ok(())
            }
            Err(e) => {
                warn!(layer = id, index, error = %e, "layer stop removal rejected");
                Err(e)
            }
        }
    }

    pub fn set_stop(&mut self, id: &str, index: usize, color: Color) -> Result<(), EditError> {
        let layer = self.layer_mut(id)?;
        layer.color_stops = layer.color_stops.with_replaced(index, color)?;
        Ok(())
    }

    /// Draw passes for visible layers, bottom first. The first pass is always normal.
    pub fn composite(&self) -> Vec<CompositePass> {
        self.layers
            .iter()
            .filter(|l| l.visible)
            .enumerate()
            .map(|(i, l)| CompositePass {
                layer_id: l.id.clone(),
                kind: l.kind,
                color_stops: l.color_stops.clone(),
                blend_mode: if i == 0 { BlendMode::Normal } else { l.blend_mode },
                opacity: l.opacity_f32(),
            })
            .collect()
    }

    /// CSS declarations for the visible layers. CSS lists the topmost image first.
    pub fn to_css(&self) -> String {
        let passes = self.composite();
        let images: Vec<String> = passes
            .iter()
            .rev()
            .map(|p| css_gradient(&p.kind, &p.color_stops))
            .collect();
        let modes: Vec<&str> = passes.iter().rev().map(|p| p.blend_mode.as_str()).collect();
        format!(
            "background-image: {};\nbackground-blend-mode: {};",
            images.join(", "),
            modes.join(", ")
        )
    }

    /// Paints the composite into `canvas`, one isolated layer per blended pass.
    pub fn render(&self, canvas: &Canvas, size: CanvasSize) {
        let rect = Rect::from_wh(size.width as f32, size.height as f32);
        for pass in self.composite() {
            let plan: FramePlan = plan_static(&pass.kind, &pass.color_stops, size);
            let need_layer = pass.blend_mode != BlendMode::Normal || pass.opacity < 1.0;
            if need_layer {
                let mut paint = Paint::default();
                paint.set_blend_mode(pass.blend_mode.to_skia());
                paint.set_alpha_f(pass.opacity);
                canvas.save_layer(&SaveLayerRec::default().paint(&paint));
                paint_gradient(canvas, rect, &plan, skia_safe::BlendMode::SrcOver, 1.0);
                canvas.restore();
            } else {
                paint_gradient(canvas, rect, &plan, skia_safe::BlendMode::SrcOver, 1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_names_round_trip() {
        for mode in BlendMode::ALL {
            assert_eq!(BlendMode::parse(mode.as_str()), Some(mode));
        }
        let json = serde_json::to_string(&BlendMode::ColorDodge).unwrap();
        assert_eq!(json, "\"color-dodge\"");
    }

    #[test]
    fn new_layer_ids_do_not_reflow() {
        let mut stack = LayerStack::from_gradient(&GradientDescriptor::default());
        let a = stack.add_layer();
        stack.remove_layer(&a).unwrap();
        let b = stack.add_layer();
        assert_ne!(a, b);
    }
}
