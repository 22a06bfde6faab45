//! # Studio
//!
//! Top-level application state: the current gradient with its edit history, effects, canvas
//! size, reduced-motion preference, and the persisted library, brand kits and favorites.
//!
//! ## Responsibilities
//! - **Guarded Edits**: every edit builds a new descriptor; rejected edits leave state as-is,
//!   log a warning and return an [`EditError`].
//! - **History**: accepted gradient edits are appended; undo/redo move a cursor.
//! - **Persistence**: state is loaded from the [`KeyValueStore`] at construction and written
//!   back on every mutation of persisted data.

use crate::color::Color;
use crate::errors::{EditError, RenderError};
use crate::export::video::{ExportGuard, ExportSlot};
use crate::harmony::{self, HarmonyAnalysis, HarmonyScheme, Randomized};
use crate::history::History;
use crate::persistence::{
    self, export_library, load_or_default, now_millis, parse_library, BrandKit, LibraryEntry,
    BRAND_KITS_KEY, FAVORITES_KEY, LIBRARY_KEY, REDUCE_MOTION_KEY,
};
use crate::share::parse_share_url;
use crate::systems::renderer::RenderInputs;
use crate::types::{
    AnimationSpec, CanvasSize, ColorStops, Effects, GradientDescriptor, GradientKind,
};
use crate::KeyValueStore;
use rand::Rng;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct Studio {
    store: Arc<dyn KeyValueStore>,
    history: History<GradientDescriptor>,
    effects: Effects,
    canvas_size: CanvasSize,
    reduced_motion: bool,
    library: Vec<LibraryEntry>,
    brand_kits: Vec<BrandKit>,
    favorites: Vec<String>,
    last_id: u64,
    exports: ExportSlot,
    locked_stops: BTreeSet<usize>,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("gradient", self.gradient())
            .field("effects", &self.effects)
            .field("canvas_size", &self.canvas_size)
            .field("reduced_motion", &self.reduced_motion)
            .field("library", &self.library.len())
            .field("brand_kits", &self.brand_kits.len())
            .field("exporting", &self.exports.is_busy())
            .finish()
    }
}

impl Studio {
    /// Loads persisted state from `store`. Missing or corrupt keys fall back to defaults.
    #[instrument(level = "info", skip(store))]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let library: Vec<LibraryEntry> = load_or_default(store.as_ref(), LIBRARY_KEY);
        let brand_kits: Vec<BrandKit> = load_or_default(store.as_ref(), BRAND_KITS_KEY);
        let favorites: Vec<String> = load_or_default(store.as_ref(), FAVORITES_KEY);
        let reduced_motion: bool = load_or_default(store.as_ref(), REDUCE_MOTION_KEY);
        info!(
            library = library.len(),
            brand_kits = brand_kits.len(),
            reduced_motion,
            "studio state loaded"
        );

        Self {
            store,
            history: History::new(GradientDescriptor::default()),
            effects: Effects::default(),
            canvas_size: CanvasSize::default(),
            reduced_motion,
            library,
            brand_kits,
            favorites,
            last_id: 0,
            exports: ExportSlot::new(),
            locked_stops: BTreeSet::new(),
        }
    }

    pub fn gradient(&self) -> &GradientDescriptor {
        self.history.current()
    }

    pub fn effects(&self) -> Effects {
        self.effects
    }

    pub fn canvas_size(&self) -> CanvasSize {
        self.canvas_size
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Snapshot handed to the renderer.
    pub fn render_inputs(&self) -> RenderInputs {
        RenderInputs {
            gradient: self.gradient().clone(),
            effects: self.effects,
            canvas_size: self.canvas_size,
            reduced_motion: self.reduced_motion,
        }
    }

    /// Claims the export slot. A second export is refused until the returned guard drops.
    pub fn begin_export(&self) -> Result<ExportGuard<'_>, RenderError> {
        let guard = self.exports.try_begin();
        if guard.is_err() {
            warn!("export already in progress");
        }
        guard
    }

    pub fn is_exporting(&self) -> bool {
        self.exports.is_busy()
    }

    // --- gradient edits ---

    /// Replaces the gradient and records it in history.
    pub fn set_gradient(&mut self, gradient: GradientDescriptor) {
        if self.history.push(gradient) {
            debug!(cursor = self.history.cursor(), "gradient updated");
        }
    }

    pub fn set_kind(&mut self, kind: GradientKind) {
        let next = self.gradient().with_kind(kind);
        self.set_gradient(next);
    }

    /// Sets the angle. Radial gradients have none and are left unchanged.
    pub fn set_angle(&mut self, angle_degrees: f32) {
        let next = self.gradient().with_angle(angle_degrees);
        self.set_gradient(next);
    }

    pub fn set_animation(&mut self, animation: AnimationSpec) {
        let next = self.gradient().with_animation(animation);
        self.set_gradient(next);
    }

    pub fn set_color_stops(&mut self, stops: ColorStops) {
        let next = self.gradient().with_stops(stops);
        self.set_gradient(next);
    }

    pub fn add_color_stop(&mut self, color: Color) {
        let stops = self.gradient().color_stops.with_pushed(color);
        self.set_color_stops(stops);
    }

    pub fn remove_color_stop(&mut self, index: usize) -> Result<(), EditError> {
        let stops = self
            .gradient()
            .color_stops
            .with_removed(index)
            .map_err(|e| reject("remove color stop", e))?;
        self.set_color_stops(stops);
        Ok(())
    }

    pub fn set_color_stop(&mut self, index: usize, color: Color) -> Result<(), EditError> {
        let stops = self
            .gradient()
            .color_stops
            .with_replaced(index, color)
            .map_err(|e| reject("set color stop", e))?;
        self.set_color_stops(stops);
        Ok(())
    }

    pub fn reverse_color_stops(&mut self) {
        let stops = self.gradient().color_stops.reversed();
        self.set_color_stops(stops);
    }

    // --- harmony ---

    /// Replaces the stops with `scheme` derived from the first stop.
    pub fn apply_harmony(&mut self, scheme: HarmonyScheme) {
        let base = self.gradient().color_stops[0];
        let colors = harmony::scheme_from_base(base, scheme);
        if let Ok(stops) = ColorStops::new(colors) {
            self.set_color_stops(stops);
        }
    }

    /// Locks or unlocks the stop at `index` for [`Studio::randomize_colors`].
    pub fn toggle_stop_lock(&mut self, index: usize) -> Result<bool, EditError> {
        let len = self.gradient().color_stops.len();
        if index >= len {
            return Err(reject(
                "lock color stop",
                EditError::StopIndexOutOfRange { index, len },
            ));
        }
        if self.locked_stops.remove(&index) {
            Ok(false)
        } else {
            self.locked_stops.insert(index);
            Ok(true)
        }
    }

    pub fn locked_stops(&self) -> &BTreeSet<usize> {
        &self.locked_stops
    }

    /// Replaces the stops with a random scheme, keeping locked stops in place.
    pub fn randomize_colors<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Randomized {
        let result = harmony::randomize(&self.gradient().color_stops, &self.locked_stops, rng);
        if let Ok(stops) = ColorStops::new(result.colors.clone()) {
            debug!(scheme = %result.scheme, hue = result.hue, "randomized colors");
            self.set_color_stops(stops);
        }
        result
    }

    pub fn harmony_analysis(&self) -> Option<HarmonyAnalysis> {
        harmony::analyze(&self.gradient().color_stops)
    }

    // --- view settings ---

    pub fn set_effects(&mut self, effects: Effects) {
        self.effects = Effects::new(effects.blur_px, effects.noise);
    }

    /// Zero-sized canvases are rejected silently (kept as the previous size).
    pub fn set_canvas_size(&mut self, size: CanvasSize) {
        if size.is_empty() {
            warn!(width = size.width, height = size.height, "ignoring empty canvas size");
            return;
        }
        self.canvas_size = size;
    }

    pub fn set_reduced_motion(&mut self, enabled: bool) {
        self.reduced_motion = enabled;
        persistence::save(self.store.as_ref(), REDUCE_MOTION_KEY, &enabled);
    }

    // --- history ---

    pub fn history(&self) -> &History<GradientDescriptor> {
        &self.history
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo().is_some()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo().is_some()
    }

    pub fn select_history(&mut self, index: usize) -> bool {
        self.history.select(index).is_some()
    }

    /// Up to `n` history entries, newest first.
    pub fn recent_history(&self, n: usize) -> Vec<(usize, &GradientDescriptor)> {
        self.history.recent(n)
    }

    // --- library ---

    fn next_id(&mut self) -> String {
        let id = now_millis().max(self.last_id + 1);
        self.last_id = id;
        id.to_string()
    }

    pub fn library(&self) -> &[LibraryEntry] {
        &self.library
    }

    /// Saves the current gradient under `name`, newest first.
    pub fn save_to_library(&mut self, name: &str) -> Result<&LibraryEntry, EditError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(reject("save to library", EditError::EmptyName));
        }
        let id = self.next_id();
        let entry = LibraryEntry::from_descriptor(id, name.to_string(), self.gradient(), now_millis());
        self.library.insert(0, entry);
        persistence::save(self.store.as_ref(), LIBRARY_KEY, &self.library);
        info!(name, "gradient saved to library");
        Ok(&self.library[0])
    }

    pub fn delete_from_library(&mut self, id: &str) -> Result<LibraryEntry, EditError> {
        let index = self
            .library
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| reject("delete library entry", EditError::UnknownLibraryEntry(id.to_string())))?;
        let removed = self.library.remove(index);
        persistence::save(self.store.as_ref(), LIBRARY_KEY, &self.library);
        Ok(removed)
    }

    /// Makes a saved gradient current.
    pub fn load_from_library(&mut self, id: &str) -> Result<(), EditError> {
        let gradient = self
            .library
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| EditError::UnknownLibraryEntry(id.to_string()))
            .and_then(LibraryEntry::to_descriptor)
            .map_err(|e| reject("load library entry", e))?;
        self.set_gradient(gradient);
        Ok(())
    }

    pub fn export_library(&self) -> Result<String, EditError> {
        export_library(&self.library)
    }

    /// Replaces the library with an exported file. Invalid files change nothing.
    #[instrument(level = "info", skip(self, json), fields(len = json.len()))]
    pub fn import_library(&mut self, json: &str) -> Result<usize, EditError> {
        let entries = parse_library(json).map_err(|e| reject("import library", e))?;
        let count = entries.len();
        self.library = entries;
        persistence::save(self.store.as_ref(), LIBRARY_KEY, &self.library);
        Ok(count)
    }

    // --- favorites ---

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        self.favorites.iter().any(|f| f == name)
    }

    /// Adds or removes a preset name. Returns whether it is now a favorite.
    pub fn toggle_favorite(&mut self, name: &str) -> bool {
        let now_favorite = if let Some(i) = self.favorites.iter().position(|f| f == name) {
            self.favorites.remove(i);
            false
        } else {
            self.favorites.push(name.to_string());
            true
        };
        persistence::save(self.store.as_ref(), FAVORITES_KEY, &self.favorites);
        now_favorite
    }

    // --- brand kits ---

    pub fn brand_kits(&self) -> &[BrandKit] {
        &self.brand_kits
    }

    /// A new kit with stock values; not stored until [`Studio::save_brand_kit`].
    pub fn new_brand_kit(&mut self) -> BrandKit {
        let id = self.next_id();
        BrandKit::new(id, now_millis())
    }

    /// Inserts `kit` or replaces the kit with the same id.
    pub fn save_brand_kit(&mut self, kit: BrandKit) -> Result<(), EditError> {
        if kit.name.trim().is_empty() {
            return Err(reject("save brand kit", EditError::EmptyName));
        }
        match self.brand_kits.iter_mut().find(|k| k.id == kit.id) {
            Some(existing) => *existing = kit,
            None => self.brand_kits.push(kit),
        }
        persistence::save(self.store.as_ref(), BRAND_KITS_KEY, &self.brand_kits);
        Ok(())
    }

    pub fn delete_brand_kit(&mut self, id: &str) -> Result<BrandKit, EditError> {
        let index = self
            .brand_kits
            .iter()
            .position(|k| k.id == id)
            .ok_or_else(|| reject("delete brand kit", EditError::UnknownBrandKit(id.to_string())))?;
        let removed = self.brand_kits.remove(index);
        persistence::save(self.store.as_ref(), BRAND_KITS_KEY, &self.brand_kits);
        Ok(removed)
    }

    /// Uses a kit's primary, secondary and accent colors as the gradient stops.
    pub fn apply_brand_kit(&mut self, id: &str) -> Result<(), EditError> {
        let stops = self
            .brand_kits
            .iter()
            .find(|k| k.id == id)
            .map(BrandKit::gradient_stops)
            .ok_or_else(|| reject("apply brand kit", EditError::UnknownBrandKit(id.to_string())))?;
        self.set_color_stops(stops);
        Ok(())
    }

    // --- share links ---

    /// Applies a gradient from a share link. Returns `false` (state unchanged) when the link
    /// carries no usable gradient.
    pub fn apply_share_url(&mut self, link: &str) -> bool {
        match parse_share_url(link) {
            Some(gradient) => {
                self.set_gradient(gradient);
                true
            }
            None => {
                debug!("share link carried no gradient");
                false
            }
        }
    }
}

fn reject(action: &'static str, error: EditError) -> EditError {
    warn!(action, error = %error, "edit rejected");
    error
}
