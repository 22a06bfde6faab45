//! # Gradient Core
//!
//! `gradient-core` renders animated multi-stop gradients (linear, radial and conic) into raster
//! frames with [Skia](https://skia.org/), and carries the editing state around them.
//!
//! ## Core Features
//!
//! *   **Animated Rendering**: eight animation kinds with speed, direction and easing, mapped to
//!     gradient geometry per frame.
//! *   **Post Effects**: Gaussian blur and deterministic per-pixel noise.
//! *   **Frame Loop**: a scheduler-driven view that restarts its clock only when it should.
//! *   **Layers**: a stack of gradients composited with CSS-style blend modes.
//! *   **Keyframes & Morphing**: timeline playback and eased transitions between gradients.
//! *   **Export**: PNG/JPEG stills, MP4 video (feature `video-rs`), CSS/SVG/Canvas/Tailwind/React code.
//! *   **Studio State**: undo history, library, brand kits and favorites behind a [`KeyValueStore`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gradient_core::{MemoryStore, Studio};
//! use gradient_core::systems::renderer::{render_still, RendererConfig};
//! use std::sync::Arc;
//!
//! let mut studio = Studio::new(Arc::new(MemoryStore::default()));
//! studio.set_angle(90.0);
//! let image = render_still(&studio.render_inputs(), 0.0, RendererConfig::default())?;
//! # Ok::<(), gradient_core::RenderError>(())
//! ```

/// Hex colors, interpolation and contrast helpers.
pub mod color;

/// Declarative gradient descriptors shared across the crate.
pub mod types;

/// Easing curves and the animation parameter mapping.
pub mod animation;

/// Resolves animated parameters into concrete shader geometry.
pub mod geometry;

/// Frame rendering, post effects, scheduling and the animation loop.
pub mod systems;

/// Multi-layer blending.
pub mod layers;

/// Keyframe timeline playback.
pub mod timeline;

/// Eased transitions between two gradients.
pub mod morph;

/// Bounded undo log.
pub mod history;

/// Application state with undo history and persistence.
pub mod studio;

/// Persisted keys, records and fail-soft JSON loading.
pub mod persistence;

/// Share links.
pub mod share;

/// Palette extraction from images.
pub mod palette;

/// HSL color schemes, randomizing and harmony analysis.
pub mod harmony;

/// Image, video and code export.
pub mod export;

/// Video sinks and the MP4 encoder wrapper.
pub mod video_wrapper;

/// Render and edit error types.
pub mod errors;

pub use color::Color;
pub use errors::{EditError, RenderError};
pub use studio::Studio;
pub use types::{
    AnimationKind, AnimationSpec, CanvasSize, ColorStops, Direction, Effects, GradientDescriptor,
    GradientKind,
};

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::instrument;

/// A string key/value store used for persisted studio state.
///
/// Values are JSON documents. This lets the studio run against the filesystem, an in-memory
/// map in tests, or any host-provided storage.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Volatile store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Stores each key as `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Creates the directory if it does not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create store directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for DirectoryStore {
    #[instrument(level = "debug", skip(self), fields(key = key))]
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    #[instrument(level = "debug", skip(self, value), fields(key = key, len = value.len()))]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        std::fs::write(&path, value).with_context(|| format!("Failed to write {}", path.display()))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}
