//! Editor configuration
//!
//! Tunable picking and display settings, loadable from a RON file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings for picking, previews and highlighting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Largest pick distance that still counts as a hit
    pub pick_margin: f32,
    /// Length of the picking ray segment used by the distance metrics
    pub ray_length: f32,
    /// Parallel-ray rejection threshold for triangle intersection
    pub surface_epsilon: f32,
    /// Cross-section size of the segment preview proxy
    pub segment_proxy_thickness: f32,
    /// Number of highlight slots per element type
    pub highlight_capacity: usize,
    /// Ignore repeated element ids when multi-selecting
    pub dedup_multi_select: bool,
    /// Label of the history entry recorded at startup
    pub initial_label: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            pick_margin: 20.0,
            ray_length: 500.0,
            surface_epsilon: 1e-7,
            segment_proxy_thickness: 0.3,
            highlight_capacity: 1000,
            dedup_multi_select: false,
            initial_label: "Initial import".to_string(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron(&content)
    }

    /// Parse configuration from RON text
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pick_margin.is_finite() && self.pick_margin > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "pick_margin must be positive, got {}",
                self.pick_margin
            )));
        }
        if !(self.ray_length.is_finite() && self.ray_length > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "ray_length must be positive, got {}",
                self.ray_length
            )));
        }
        if self.surface_epsilon.is_nan() || self.surface_epsilon < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "surface_epsilon must not be negative, got {}",
                self.surface_epsilon
            )));
        }
        if self.segment_proxy_thickness.is_nan() || self.segment_proxy_thickness <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "segment_proxy_thickness must be positive, got {}",
                self.segment_proxy_thickness
            )));
        }
        if self.highlight_capacity == 0 {
            return Err(ConfigError::Invalid(
                "highlight_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.pick_margin, 20.0);
        assert_eq!(config.ray_length, 500.0);
        assert_eq!(config.highlight_capacity, 1000);
        assert_eq!(config.initial_label, "Initial import");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = EditorConfig::from_ron("(pick_margin: 5.0)").unwrap();
        assert_eq!(config.pick_margin, 5.0);
        assert_eq!(config.ray_length, 500.0);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            EditorConfig::from_ron("(pick_margin: -1.0)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EditorConfig::from_ron("(highlight_capacity: 0)"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.ron");
        let config = EditorConfig {
            pick_margin: 2.5,
            dedup_multi_select: true,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            EditorConfig::load("/nonexistent/editor.ron"),
            Err(ConfigError::Io(_))
        ));
    }
}
