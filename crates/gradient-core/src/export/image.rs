//! Still image export (PNG / JPEG bytes and data URIs).

use crate::errors::RenderError;
use crate::systems::renderer::{FrameRenderer, RenderInputs, RendererConfig};
use crate::types::CanvasSize;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// JPEG quality used when none is given (0.92 in canvas terms).
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "kebab-case")]
pub enum ImageFormat {
    Png,
    /// Quality in `0..=100`.
    Jpeg { quality: u8 },
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg { .. } => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg { .. } => "jpg",
        }
    }

    /// Guesses the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg {
                quality: DEFAULT_JPEG_QUALITY,
            }),
            _ => None,
        }
    }
}

/// Encodes tightly packed opaque RGBA pixels.
pub fn encode_rgba(
    pixels: &[u8],
    size: CanvasSize,
    format: ImageFormat,
) -> Result<Vec<u8>, RenderError> {
    let mut out = Vec::new();
    match format {
        ImageFormat::Png => {
            PngEncoder::new(&mut out)
                .write_image(pixels, size.width, size.height, ExtendedColorType::Rgba8)
                .map_err(|_| RenderError::Encode("png"))?;
        }
        ImageFormat::Jpeg { quality } => {
            // JPEG has no alpha channel
            let rgb: Vec<u8> = pixels
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
                .write_image(&rgb, size.width, size.height, ExtendedColorType::Rgb8)
                .map_err(|_| RenderError::Encode("jpeg"))?;
        }
    }
    Ok(out)
}

/// Renders one frame at `elapsed_secs` and encodes it.
#[instrument(level = "info", skip(inputs, config), fields(width = inputs.canvas_size.width, height = inputs.canvas_size.height))]
pub fn render_image(
    inputs: &RenderInputs,
    elapsed_secs: f64,
    config: RendererConfig,
    format: ImageFormat,
) -> Result<Vec<u8>, RenderError> {
    let mut renderer = FrameRenderer::new(config);
    if renderer.draw(inputs, elapsed_secs)?.is_none() {
        return Err(RenderError::SurfaceFailure {
            width: inputs.canvas_size.width,
            height: inputs.canvas_size.height,
        });
    }
    let pixels = renderer.read_rgba()?;
    let bytes = encode_rgba(&pixels, inputs.canvas_size, format)?;
    info!(bytes = bytes.len(), format = format.extension(), "image rendered");
    Ok(bytes)
}

/// `data:<mime>;base64,<payload>`
pub fn data_uri(bytes: &[u8], format: ImageFormat) -> String {
    format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(bytes))
}
