//! Viewer configuration.
//!
//! Loaded from JSON; every field has a default so a config file only needs
//! the values it overrides.

use crate::commands::ZoomRange;
use crate::geometry::normalize_density;
use crate::scheduler::Zoom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No document locator configured")]
    MissingLocator,

    #[error("Unknown locale: {0}")]
    UnknownLocale(String),

    #[error("Invalid zoom settings: {0}")]
    InvalidZoom(String),
}

/// The two localized strings a viewer shows: "Page 3 of 12".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub page: String,
    pub of: String,
}

impl Labels {
    fn new(page: &str, of: &str) -> Self {
        Self {
            page: page.to_string(),
            of: of.to_string(),
        }
    }
}

/// Built-in locale table.
pub fn builtin_labels() -> BTreeMap<String, Labels> {
    let mut table = BTreeMap::new();
    table.insert("en".to_string(), Labels::new("Page", "of"));
    table.insert("fr".to_string(), Labels::new("Page", "sur"));
    table
}

/// Zoom limits as scale factors (1.0 = 100%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub initial: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.4,
            max: 3.0,
            step: 0.1,
            initial: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Path or `file://` URL of the document
    pub locator: String,
    /// Locale tag selecting the page labels
    pub locale: String,
    pub zoom: ZoomConfig,
    /// Device pixel ratio of the output
    pub pixel_density: f32,
    /// Extra locale entries, merged over the built-in table
    pub labels: BTreeMap<String, Labels>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            locator: String::new(),
            locale: "en".to_string(),
            zoom: ZoomConfig::default(),
            pixel_density: 1.0,
            labels: BTreeMap::new(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every setting a session depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.locator.trim().is_empty() {
            return Err(ConfigError::MissingLocator);
        }
        self.page_labels()?;
        self.zoom_range()?;
        self.initial_zoom()?;
        Ok(())
    }

    /// Labels for the configured locale. Unknown tags are an error.
    pub fn page_labels(&self) -> Result<Labels, ConfigError> {
        if let Some(labels) = self.labels.get(&self.locale) {
            return Ok(labels.clone());
        }
        builtin_labels()
            .remove(&self.locale)
            .ok_or_else(|| ConfigError::UnknownLocale(self.locale.clone()))
    }

    pub fn zoom_range(&self) -> Result<ZoomRange, ConfigError> {
        let ZoomConfig { min, max, step, .. } = self.zoom;
        if !(min.is_finite() && max.is_finite() && step.is_finite()) {
            return Err(ConfigError::InvalidZoom("values must be finite".to_string()));
        }
        let range = ZoomRange {
            min: Zoom::from_scale(min),
            max: Zoom::from_scale(max),
            step: Zoom::from_scale(step).percent(),
        };
        if range.min.percent() == 0 {
            return Err(ConfigError::InvalidZoom(format!("min {} must be positive", min)));
        }
        if range.min > range.max {
            return Err(ConfigError::InvalidZoom(format!("min {} exceeds max {}", min, max)));
        }
        if range.step == 0 {
            return Err(ConfigError::InvalidZoom(format!("step {} is below 1%", step)));
        }
        Ok(range)
    }

    pub fn initial_zoom(&self) -> Result<Zoom, ConfigError> {
        let range = self.zoom_range()?;
        let initial = self.zoom.initial;
        let zoom = Zoom::from_scale(initial);
        if !initial.is_finite() || zoom < range.min || zoom > range.max {
            return Err(ConfigError::InvalidZoom(format!(
                "initial {} outside {}..={}",
                initial, self.zoom.min, self.zoom.max
            )));
        }
        Ok(zoom)
    }

    pub fn density(&self) -> f32 {
        normalize_density(Some(self.pixel_density))
    }
}
