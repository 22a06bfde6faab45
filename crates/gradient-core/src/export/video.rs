//! # Video Export
//!
//! Renders the animated gradient frame by frame into a [`FrameSink`].
//!
//! ## Responsibilities
//! - **Frame Loop**: `frame_count = ceil(duration * fps)`, frame `i` is drawn at `i / fps`.
//! - **Quality Presets**: 720p / 1080p / 4K with their bitrates.
//! - **Single Flight**: [`ExportSlot`] rejects a second export while one is running.
//!
//! ## Key Functions
//! - `render_video`: renders into any sink and reports progress.
//! - `export_mp4`: H.264 file output (requires the `video-rs` feature).

use crate::errors::RenderError;
use crate::systems::renderer::{FrameRenderer, RenderInputs, RendererConfig};
use crate::types::CanvasSize;
use crate::video_wrapper::FrameSink;
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, instrument};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoQuality {
    #[serde(rename = "720p")]
    Hd720,
    #[default]
    #[serde(rename = "1080p")]
    FullHd1080,
    #[serde(rename = "4k")]
    Uhd4k,
}

impl VideoQuality {
    pub fn bitrate(&self) -> usize {
        match self {
            VideoQuality::Hd720 => 5_000_000,
            VideoQuality::FullHd1080 => 10_000_000,
            VideoQuality::Uhd4k => 20_000_000,
        }
    }

    pub fn canvas_size(&self) -> CanvasSize {
        match self {
            VideoQuality::Hd720 => CanvasSize::HD,
            VideoQuality::FullHd1080 => CanvasSize::FULL_HD,
            VideoQuality::Uhd4k => CanvasSize::UHD_4K,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "720p" => Some(VideoQuality::Hd720),
            "1080p" => Some(VideoQuality::FullHd1080),
            "4k" => Some(VideoQuality::Uhd4k),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoSettings {
    pub fps: u32,
    pub duration_secs: f64,
    pub quality: VideoQuality,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            fps: 30,
            duration_secs: 5.0,
            quality: VideoQuality::FullHd1080,
        }
    }
}

impl VideoSettings {
    pub fn frame_count(&self) -> usize {
        if self.fps == 0 || self.duration_secs.is_nan() || self.duration_secs <= 0.0 {
            return 0;
        }
        // tolerate float error like 0.1 * 30 = 3.0000000000000004
        (self.duration_secs * self.fps as f64 - 1e-9).ceil() as usize
    }
}

/// Allows one export at a time.
#[derive(Debug, Default)]
pub struct ExportSlot {
    busy: AtomicBool,
}

impl ExportSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claims the slot until the returned guard is dropped.
    pub fn try_begin(&self) -> Result<ExportGuard<'_>, RenderError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RenderError::ExportInFlight)?;
        Ok(ExportGuard { slot: self })
    }
}

/// Releases the [`ExportSlot`] on drop.
#[derive(Debug)]
pub struct ExportGuard<'a> {
    slot: &'a ExportSlot,
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.slot.busy.store(false, Ordering::Release);
    }
}

/// Renders `settings.frame_count()` frames into `sink`.
///
/// `progress` receives a percentage in `(0, 100]` after each frame. The canvas size comes from
/// `inputs`; use [`VideoQuality::canvas_size`] to match a preset.
#[instrument(level = "info", skip(inputs, sink, progress), fields(width = inputs.canvas_size.width, height = inputs.canvas_size.height, fps = settings.fps))]
pub fn render_video(
    inputs: &RenderInputs,
    settings: &VideoSettings,
    config: RendererConfig,
    sink: &mut dyn FrameSink,
    mut progress: impl FnMut(f32),
) -> Result<usize, RenderError> {
    let total = settings.frame_count();
    let size = inputs.canvas_size;
    let mut renderer = FrameRenderer::new(config);
    let frame_shape = (size.height as usize, size.width as usize, 4);

    for i in 0..total {
        let time = i as f64 / settings.fps as f64;
        if renderer.draw(inputs, time)?.is_none() {
            return Err(RenderError::SurfaceFailure {
                width: size.width,
                height: size.height,
            });
        }
        let pixels = renderer.read_rgba()?;
        let frame = Array3::from_shape_vec(frame_shape, pixels).map_err(anyhow::Error::from)?;
        sink.encode(&frame, time)?;

        progress((i + 1) as f32 / total as f32 * 100.0);
        debug!(frame = i, total, "frame encoded");
    }

    sink.finish()?;
    info!(frames = total, "video export finished");
    Ok(total)
}

/// Renders an H.264 MP4 at `path`.
///
/// The container is MP4, not WebM: the encoder only writes H.264 streams. Frame timing,
/// sizes and bitrates are the same as for any other sink.
#[cfg(feature = "video-rs")]
pub fn export_mp4(
    inputs: &RenderInputs,
    settings: &VideoSettings,
    config: RendererConfig,
    path: &std::path::Path,
    progress: impl FnMut(f32),
) -> Result<usize, RenderError> {
    use crate::video_wrapper::{Encoder, EncoderSettings};

    let mut encoder = Encoder::new(
        path,
        EncoderSettings {
            width: inputs.canvas_size.width as usize,
            height: inputs.canvas_size.height as usize,
            fps: settings.fps,
            bitrate: settings.quality.bitrate(),
        },
    )?;
    render_video(inputs, settings, config, &mut encoder, progress)
}
