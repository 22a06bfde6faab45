//! # Renderer System
//!
//! Paints animated gradients onto Skia raster surfaces.
//!
//! ## Responsibilities
//! - **Frame Planning**: `plan_frame` resolves geometry and stop offsets for one instant.
//! - **Painting**: `paint_gradient` builds the Skia shader and fills a rect.
//! - **Surface Management**: `FrameRenderer` owns the surface, reallocating on resize and
//!   falling back to a quiet placeholder state when allocation fails.
//! - **Post Effects**: blur and noise passes from `systems::effects`.
//!
//! ## See Also
//! - `systems::view` for the scheduled redraw loop.
//! - `export::video` for the offline export loop.

use crate::animation::{map_parameters, stop_offsets, AnimatedParams, AnimationClock};
use crate::color::Color;
use crate::errors::RenderError;
use crate::geometry::{resolve_geometry, Geometry};
use crate::systems::effects::{apply_blur, apply_noise_rgba, NoiseQuality};
use crate::types::{CanvasSize, Effects, GradientDescriptor, GradientKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use skia_safe::{
    gradient_shader, AlphaType, BlendMode, Canvas, ColorType, ImageInfo, Matrix, Paint, Point,
    Rect, Shader, Surface, TileMode,
};
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument};

/// Everything the renderer reads for one frame. Owned by the application state, read-only here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderInputs {
    pub gradient: GradientDescriptor,
    pub effects: Effects,
    pub canvas_size: CanvasSize,
    pub reduced_motion: bool,
}

impl RenderInputs {
    pub fn new(gradient: GradientDescriptor, effects: Effects, canvas_size: CanvasSize) -> Self {
        Self {
            gradient,
            effects,
            canvas_size,
            reduced_motion: false,
        }
    }

    /// Whether switching from `self` to `next` restarts the animation clock.
    ///
    /// Effects-only edits keep the clock running.
    pub fn resets_clock(&self, next: &RenderInputs) -> bool {
        self.gradient != next.gradient
            || self.canvas_size != next.canvas_size
            || self.reduced_motion != next.reduced_motion
    }

    pub fn clock(&self) -> AnimationClock {
        AnimationClock::new(self.gradient.animation, self.reduced_motion)
    }
}

/// A color anchored at a normalized position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GradientStop {
    pub color: Color,
    pub offset: f32,
}

/// Concrete paint parameters for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    /// Animation time after speed, direction and easing.
    pub time: f32,
    pub geometry: Geometry,
    /// Stops sorted by offset (stable, so equal offsets keep stop order).
    pub stops: Vec<GradientStop>,
}

/// Resolves geometry and stops for `gradient` at animation time `time`.
pub fn plan_frame(gradient: &GradientDescriptor, size: CanvasSize, time: f32) -> FramePlan {
    let params = map_parameters(&gradient.kind, gradient.animation.kind, time);
    let geometry = resolve_geometry(
        &gradient.kind,
        size.width as f32,
        size.height as f32,
        &params,
    );
    let offsets = stop_offsets(gradient.color_stops.len(), params.stop_shift);
    let mut stops: Vec<GradientStop> = gradient
        .color_stops
        .iter()
        .zip(offsets)
        .map(|(color, offset)| GradientStop {
            color: *color,
            offset,
        })
        .collect();
    // Skia requires monotonic positions
    stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));

    FramePlan {
        time,
        geometry,
        stops,
    }
}

/// Resolves geometry and stops without any animation perturbation.
pub fn plan_static(kind: &GradientKind, color_stops: &[Color], size: CanvasSize) -> FramePlan {
    let geometry = resolve_geometry(
        kind,
        size.width as f32,
        size.height as f32,
        &AnimatedParams::default(),
    );
    let stops = color_stops
        .iter()
        .zip(stop_offsets(color_stops.len(), None))
        .map(|(color, offset)| GradientStop {
            color: *color,
            offset,
        })
        .collect();
    FramePlan {
        time: 0.0,
        geometry,
        stops,
    }
}

/// Builds the Skia shader for a resolved geometry.
pub fn build_shader(geometry: &Geometry, stops: &[GradientStop]) -> Option<Shader> {
    let colors: Vec<skia_safe::Color> = stops.iter().map(|s| s.color.to_skia()).collect();
    let pos: Vec<f32> = stops.iter().map(|s| sanitize(s.offset)).collect();

    match geometry {
        Geometry::Linear { start, end } => gradient_shader::linear(
            (
                Point::new(sanitize(start.0), sanitize(start.1)),
                Point::new(sanitize(end.0), sanitize(end.1)),
            ),
            colors.as_slice(),
            Some(pos.as_slice()),
            TileMode::Clamp,
            None,
            None,
        ),
        Geometry::Radial { center, radius } => gradient_shader::radial(
            Point::new(sanitize(center.0), sanitize(center.1)),
            sanitize(*radius),
            colors.as_slice(),
            Some(pos.as_slice()),
            TileMode::Clamp,
            None,
            None,
        ),
        Geometry::Conic {
            center,
            start_angle,
        } => {
            let pivot = Point::new(sanitize(center.0), sanitize(center.1));
            let rotation = Matrix::rotate_deg_pivot(sanitize(*start_angle).to_degrees(), pivot);
            gradient_shader::sweep(
                pivot,
                colors.as_slice(),
                Some(pos.as_slice()),
                TileMode::Clamp,
                None,
                None,
                Some(&rotation),
            )
        }
    }
}

/// Fills `rect` with the gradient described by `plan`.
///
/// Degenerate shaders (e.g. zero radius) fall back to the last stop's solid color.
pub fn paint_gradient(
    canvas: &Canvas,
    rect: Rect,
    plan: &FramePlan,
    blend_mode: BlendMode,
    opacity: f32,
) {
    let mut paint = Paint::default();
    paint.set_anti_alias(true);
    paint.set_blend_mode(blend_mode);

    match build_shader(&plan.geometry, &plan.stops) {
        Some(shader) => {
            paint.set_shader(shader);
        }
        None => {
            let fallback = plan.stops.last().map(|s| s.color).unwrap_or_default();
            paint.set_color(fallback.to_skia());
        }
    }
    paint.set_alpha_f(opacity.clamp(0.0, 1.0));
    canvas.draw_rect(rect, &paint);
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Renderer tuning.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RendererConfig {
    pub noise_quality: NoiseQuality,
    /// Fixed noise seed for reproducible output. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Target time per frame; frames slower than this are counted in [`RenderStats`].
    pub frame_budget: Duration,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            noise_quality: NoiseQuality::Full,
            seed: None,
            frame_budget: Duration::from_micros(16_667),
        }
    }
}

/// Running frame timing counters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderStats {
    pub frames: u64,
    pub over_budget: u64,
    pub last_frame: Duration,
    pub total: Duration,
}

impl RenderStats {
    pub fn average(&self) -> Duration {
        if self.frames == 0 {
            Duration::ZERO
        } else {
            self.total / self.frames as u32
        }
    }
}

enum SurfaceSlot {
    Unallocated,
    Ready { size: CanvasSize, surface: Surface },
    /// Allocation failed for this size; stays quiet until the size changes.
    Failed { size: CanvasSize },
}

/// Owns one raster surface and paints frames into it.
pub struct FrameRenderer {
    config: RendererConfig,
    slot: SurfaceSlot,
    rng: StdRng,
    stats: RenderStats,
    /// RGBA readback buffer reused by the noise pass.
    scratch: Vec<u8>,
}

impl std::fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("config", &self.config)
            .field("size", &self.size())
            .field("stats", &self.stats)
            .finish()
    }
}

impl FrameRenderer {
    pub fn new(config: RendererConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            slot: SurfaceSlot::Unallocated,
            rng,
            stats: RenderStats::default(),
            scratch: Vec::new(),
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Size of the live surface, if any.
    pub fn size(&self) -> Option<CanvasSize> {
        match &self.slot {
            SurfaceSlot::Ready { size, .. } => Some(*size),
            _ => None,
        }
    }

    pub fn surface(&self) -> Option<&Surface> {
        match &self.slot {
            SurfaceSlot::Ready { surface, .. } => Some(surface),
            _ => None,
        }
    }

    pub fn surface_mut(&mut self) -> Option<&mut Surface> {
        match &mut self.slot {
            SurfaceSlot::Ready { surface, .. } => Some(surface),
            _ => None,
        }
    }

    /// Makes sure a surface of `size` exists.
    ///
    /// Returns `Ok(false)` when there is nothing to draw to (zero size, or a previous
    /// allocation failure for the same size). The first failure for a size is returned as an
    /// error; later frames stay silent.
    pub fn ensure_surface(&mut self, size: CanvasSize) -> Result<bool, RenderError> {
        if size.is_empty() {
            return Ok(false);
        }
        match &self.slot {
            SurfaceSlot::Ready { size: current, .. } if *current == size => return Ok(true),
            SurfaceSlot::Failed { size: current } if *current == size => return Ok(false),
            _ => {}
        }

        match skia_safe::surfaces::raster_n32_premul((size.width as i32, size.height as i32)) {
            Some(surface) => {
                debug!(width = size.width, height = size.height, "allocated surface");
                self.slot = SurfaceSlot::Ready { size, surface };
                Ok(true)
            }
            None => {
                error!(
                    width = size.width,
                    height = size.height,
                    "surface allocation failed; rendering placeholder"
                );
                self.slot = SurfaceSlot::Failed { size };
                Err(RenderError::SurfaceFailure {
                    width: size.width,
                    height: size.height,
                })
            }
        }
    }

    /// Draws one frame `elapsed_secs` after the animation started.
    ///
    /// Returns `Ok(None)` when there is no surface to draw to.
    pub fn draw(
        &mut self,
        inputs: &RenderInputs,
        elapsed_secs: f64,
    ) -> Result<Option<FramePlan>, RenderError> {
        if !self.ensure_surface(inputs.canvas_size)? {
            return Ok(None);
        }
        let started = Instant::now();

        let time = inputs.clock().time(elapsed_secs) as f32;
        let plan = plan_frame(&inputs.gradient, inputs.canvas_size, time);
        let noise_seed: u64 = self.rng.gen();
        let quality = self.config.noise_quality;

        let SurfaceSlot::Ready { size, surface } = &mut self.slot else {
            return Ok(None);
        };
        let rect = Rect::from_wh(size.width as f32, size.height as f32);

        {
            let canvas = surface.canvas();
            canvas.clear(skia_safe::Color::BLACK);
            paint_gradient(canvas, rect, &plan, BlendMode::SrcOver, 1.0);
        }

        if inputs.effects.blur_px > 0.0 {
            apply_blur(surface, inputs.effects.blur_px);
        }

        if inputs.effects.noise > 0.0 {
            let info = rgba_info(*size);
            let row_bytes = size.width as usize * 4;
            let pixels = &mut self.scratch;
            pixels.resize(row_bytes * size.height as usize, 0);
            if !surface.read_pixels(&info, pixels, row_bytes, (0, 0)) {
                return Err(RenderError::PixelReadback);
            }
            apply_noise_rgba(
                pixels,
                size.width as usize,
                inputs.effects.noise,
                quality,
                noise_seed,
            );
            if !surface
                .canvas()
                .write_pixels(&info, &pixels[..], row_bytes, (0, 0))
            {
                return Err(RenderError::PixelReadback);
            }
        }

        self.record_frame(started.elapsed());
        Ok(Some(plan))
    }

    fn record_frame(&mut self, took: Duration) {
        self.stats.frames += 1;
        self.stats.last_frame = took;
        self.stats.total += took;
        if took > self.config.frame_budget {
            self.stats.over_budget += 1;
            debug!(
                took_ms = took.as_secs_f64() * 1000.0,
                budget_ms = self.config.frame_budget.as_secs_f64() * 1000.0,
                "frame over budget"
            );
        }
    }

    /// Reads the current surface back as tightly packed RGBA.
    pub fn read_rgba(&mut self) -> Result<Vec<u8>, RenderError> {
        let SurfaceSlot::Ready { size, surface } = &mut self.slot else {
            return Err(RenderError::PixelReadback);
        };
        let info = rgba_info(*size);
        let row_bytes = size.width as usize * 4;
        let mut pixels = vec![0u8; row_bytes * size.height as usize];
        if surface.read_pixels(&info, &mut pixels, row_bytes, (0, 0)) {
            Ok(pixels)
        } else {
            Err(RenderError::PixelReadback)
        }
    }
}

pub(crate) fn rgba_info(size: CanvasSize) -> ImageInfo {
    ImageInfo::new(
        (size.width as i32, size.height as i32),
        ColorType::RGBA8888,
        AlphaType::Premul,
        None,
    )
}

/// Renders a single frame and returns an image snapshot.
///
/// Used for previews and still image export.
#[instrument(level = "debug", skip(inputs), fields(width = inputs.canvas_size.width, height = inputs.canvas_size.height))]
pub fn render_still(
    inputs: &RenderInputs,
    elapsed_secs: f64,
    config: RendererConfig,
) -> Result<skia_safe::Image, RenderError> {
    let mut renderer = FrameRenderer::new(config);
    renderer.draw(inputs, elapsed_secs)?;
    let size = inputs.canvas_size;
    renderer
        .surface_mut()
        .map(|surface| surface.image_snapshot())
        .ok_or(RenderError::SurfaceFailure {
            width: size.width,
            height: size.height,
        })
}
