//! Configuration system
//!
//! Scene and spatial-index tuning values, loadable from TOML or RON.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

/// On-disk encodings a configuration can use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Serializable settings with file persistence
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Decode from text in the given format
    fn parse(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Toml => toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Encode as text in the given format
    fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string())),
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }

    /// Load from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)?;
        let config = Self::parse(&text, format)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Write to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = self.render(ConfigFormat::from_path(path)?)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

/// Failures loading or saving a configuration
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Text did not decode into the expected settings
    #[error("Malformed config: {0}")]
    Parse(String),

    /// Settings could not be encoded
    #[error("Could not encode config: {0}")]
    Serialize(String),

    /// Extension is neither `.toml` nor `.ron`
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Quad tree build parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadTreeConfig {
    /// A leaf holding this many objects or fewer is not subdivided
    pub min_objects_per_leaf: usize,

    /// Subdivision stops once a leaf's level exceeds this
    pub max_level: u8,

    /// Multiplier applied to a leaf's size to get its growth caps
    pub growth_factor: f32,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            min_objects_per_leaf: 5,
            max_level: 30,
            growth_factor: 1.5,
        }
    }
}

impl Config for QuadTreeConfig {}

/// Scene graph behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Spatial index parameters for scenes that build a quad tree
    pub quad_tree: QuadTreeConfig,

    /// Whether `set_active`/`set_visible` recurse into children
    pub propagate_flags: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            quad_tree: QuadTreeConfig::default(),
            propagate_flags: true,
        }
    }
}

impl Config for SceneConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_thresholds() {
        let config = QuadTreeConfig::default();
        assert_eq!(config.min_objects_per_leaf, 5);
        assert_eq!(config.max_level, 30);
        assert!((config.growth_factor - 1.5).abs() < f32::EPSILON);
        assert!(SceneConfig::default().propagate_flags);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: SceneConfig = toml::from_str(
            "propagate_flags = false\n[quad_tree]\nmax_level = 4\n",
        )
        .unwrap();

        assert!(!config.propagate_flags);
        assert_eq!(config.quad_tree.max_level, 4);
        assert_eq!(config.quad_tree.min_objects_per_leaf, 5);
    }

    #[test]
    fn test_ron_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("scene_engine_cfg_{}.ron", std::process::id()));

        let config = QuadTreeConfig {
            min_objects_per_leaf: 2,
            max_level: 8,
            growth_factor: 2.0,
        };
        config.save_to_file(&path).unwrap();
        let loaded = QuadTreeConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_toml_text_roundtrip() {
        let config = SceneConfig { propagate_flags: false, ..SceneConfig::default() };
        let text = config.render(ConfigFormat::Toml).unwrap();
        assert_eq!(SceneConfig::parse(&text, ConfigFormat::Toml).unwrap(), config);
    }

    #[test]
    fn test_malformed_text() {
        let result = QuadTreeConfig::parse("max_level = \"deep\"", ConfigFormat::Toml);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = SceneConfig::default().save_to_file("scene.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
