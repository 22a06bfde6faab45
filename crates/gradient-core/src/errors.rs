use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create surface ({width}x{height})")]
    SurfaceFailure { width: u32, height: u32 },
    #[error("Failed to read back surface pixels")]
    PixelReadback,
    #[error("Failed to encode image as {0}")]
    Encode(&'static str),
    #[error("An export is already in progress")]
    ExportInFlight,
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Rejected edits. The target value is left untouched whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("A gradient needs at least 2 color stops")]
    TooFewColorStops,
    #[error("Need at least 2 keyframes")]
    TooFewKeyframes,
    #[error("Must have at least one layer")]
    LastLayer,
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),
    #[error("Unknown keyframe: {0}")]
    UnknownKeyframe(u64),
    #[error("Color stop index {index} out of range (len {len})")]
    StopIndexOutOfRange { index: usize, len: usize },
    #[error("Please enter a name")]
    EmptyName,
    #[error("Unknown library entry: {0}")]
    UnknownLibraryEntry(String),
    #[error("Invalid library file: {0}")]
    InvalidImport(String),
    #[error("Logo must be under 500KB (got {bytes} bytes)")]
    LogoTooLarge { bytes: usize },
    #[error("Unknown brand kit: {0}")]
    UnknownBrandKit(String),
}
