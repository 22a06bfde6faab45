//! # Persistence
//!
//! Saved gradients, brand kits, favorites and the reduced-motion flag, stored as JSON strings
//! in a [`KeyValueStore`](crate::KeyValueStore).
//!
//! Loading never fails: missing keys yield the default and corrupt values are logged and
//! replaced by the default.

use crate::color::Color;
use crate::errors::EditError;
use crate::types::{
    AnimationKind, AnimationSpec, ColorStops, Direction, GradientDescriptor, GradientKind,
};
use crate::KeyValueStore;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{instrument, warn};

pub const LIBRARY_KEY: &str = "gradient-library";
pub const BRAND_KITS_KEY: &str = "brandKits";
pub const FAVORITES_KEY: &str = "favorite-presets";
pub const REDUCE_MOTION_KEY: &str = "reduce-motion";

pub const MAX_LOGO_BYTES: usize = 500 * 1024;

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Reads and decodes `key`, falling back to `T::default()`.
#[instrument(level = "debug", skip(store))]
pub fn load_or_default<T: DeserializeOwned + Default>(
    store: &dyn KeyValueStore,
    key: &str,
) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!(key, error = %e, "failed to read persisted value; using default");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "corrupt persisted value; using default");
            T::default()
        }
    }
}

/// Encodes and writes `value`. Failures are logged, not returned.
pub fn save<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            warn!(key, error = %e, "failed to encode value");
            return;
        }
    };
    if let Err(e) = store.set(key, &json) {
        warn!(key, error = %e, "failed to persist value");
    }
}

/// Gradient type name as stored in library files.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradientType {
    #[default]
    Linear,
    Radial,
    Conic,
}

/// One saved gradient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    pub id: String,
    pub name: String,
    pub colors: Vec<Color>,
    pub angle: f32,
    #[serde(rename = "type", default)]
    pub gradient_type: GradientType,
    #[serde(default)]
    pub animation_type: AnimationKind,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub timestamp: u64,
}

fn default_speed() -> f32 {
    1.0
}

impl LibraryEntry {
    pub fn from_descriptor(
        id: String,
        name: String,
        gradient: &GradientDescriptor,
        timestamp: u64,
    ) -> Self {
        let gradient_type = match gradient.kind {
            GradientKind::Linear { .. } => GradientType::Linear,
            GradientKind::Radial => GradientType::Radial,
            GradientKind::Conic { .. } => GradientType::Conic,
        };
        Self {
            id,
            name,
            colors: gradient.color_stops.to_vec(),
            angle: gradient.angle_degrees(),
            gradient_type,
            animation_type: gradient.animation.kind,
            speed: gradient.animation.speed(),
            direction: gradient.animation.direction,
            timestamp,
        }
    }

    /// Rebuilds a descriptor. Entries with fewer than two colors are rejected.
    pub fn to_descriptor(&self) -> Result<GradientDescriptor, EditError> {
        let stops = ColorStops::new(self.colors.clone())?;
        let kind = match self.gradient_type {
            GradientType::Linear => GradientKind::linear(self.angle),
            GradientType::Radial => GradientKind::Radial,
            GradientType::Conic => GradientKind::conic(self.angle),
        };
        let animation = AnimationSpec::new(
            self.animation_type,
            self.speed,
            self.direction,
            Default::default(),
        );
        Ok(GradientDescriptor::new(kind, stops, animation))
    }
}

/// Pretty JSON for library export.
pub fn export_library(entries: &[LibraryEntry]) -> Result<String, EditError> {
    serde_json::to_string_pretty(entries).map_err(|e| EditError::InvalidImport(e.to_string()))
}

/// Parses and validates an exported library. Nothing is returned unless every entry is usable.
pub fn parse_library(json: &str) -> Result<Vec<LibraryEntry>, EditError> {
    let entries: Vec<LibraryEntry> =
        serde_json::from_str(json).map_err(|e| EditError::InvalidImport(e.to_string()))?;
    for entry in &entries {
        entry
            .to_descriptor()
            .map_err(|e| EditError::InvalidImport(format!("{}: {e}", entry.name)))?;
    }
    Ok(entries)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrandColors {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub background: Color,
    pub text: Color,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrandFonts {
    pub heading: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandKit {
    pub id: String,
    pub name: String,
    pub colors: BrandColors,
    pub fonts: BrandFonts,
    /// Logo as a data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub created_at: u64,
}

impl BrandKit {
    /// A fresh kit with the stock palette and fonts.
    pub fn new(id: String, created_at: u64) -> Self {
        Self {
            id,
            name: "My Brand".to_string(),
            colors: BrandColors {
                primary: Color::new(0x3b, 0x82, 0xf6),
                secondary: Color::new(0x8b, 0x5c, 0xf6),
                accent: Color::new(0xec, 0x48, 0x99),
                background: Color::new(0x0f, 0x17, 0x2a),
                text: Color::new(0xf8, 0xfa, 0xfc),
            },
            fonts: BrandFonts {
                heading: "Montserrat".to_string(),
                body: "Inter".to_string(),
            },
            logo: None,
            created_at,
        }
    }

    /// Gradient stops built from the kit: primary, secondary, accent.
    pub fn gradient_stops(&self) -> ColorStops {
        ColorStops::new(vec![
            self.colors.primary,
            self.colors.secondary,
            self.colors.accent,
        ])
        .unwrap_or_default()
    }

    /// Embeds a logo as a data URI. Files over 500KB are rejected.
    pub fn set_logo(&mut self, bytes: &[u8], mime_type: &str) -> Result<(), EditError> {
        if bytes.len() > MAX_LOGO_BYTES {
            return Err(EditError::LogoTooLarge { bytes: bytes.len() });
        }
        self.logo = Some(format!("data:{mime_type};base64,{}", STANDARD.encode(bytes)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_entry_uses_camel_case() {
        let entry = LibraryEntry::from_descriptor(
            "1".into(),
            "Sunset".into(),
            &GradientDescriptor::default(),
            42,
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["animationType"], "rotate");
        assert_eq!(json["type"], "linear");
        assert_eq!(json["colors"][2], "#3b82f6");
        assert_eq!(json["timestamp"], 42);
    }

    #[test]
    fn oversized_logo_is_rejected() {
        let mut kit = BrandKit::new("k".into(), 0);
        let big = vec![0u8; MAX_LOGO_BYTES + 1];
        assert_eq!(
            kit.set_logo(&big, "image/png"),
            Err(EditError::LogoTooLarge { bytes: MAX_LOGO_BYTES + 1 })
        );
        assert!(kit.logo.is_none());
        kit.set_logo(b"png", "image/png").unwrap();
        assert_eq!(kit.logo.as_deref(), Some("data:image/png;base64,cG5n"));
    }
}
