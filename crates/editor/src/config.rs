//! Editor configuration
//!
//! Every field has a default, so an empty TOML file (or no file at all)
//! yields a working editor.

use std::path::{Path, PathBuf};

use floorgraph_core::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_HISTORY_CAPACITY;

/// Storage key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "campus-map-project";

/// Settings for an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo snapshots
    pub history_capacity: usize,

    /// Key the project is persisted under
    pub storage_key: String,

    /// Directory for file-backed persistence
    pub storage_dir: Option<PathBuf>,

    /// Persist after every edit
    pub autosave: bool,

    /// Distance given to stair/elevator links made by the connect gesture
    pub floor_change_distance: f64,

    /// Decimals kept when the connect gesture derives a local distance
    pub distance_precision: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_dir: None,
            autosave: true,
            floor_change_distance: 1.0,
            distance_precision: 2,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> GraphResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| GraphError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!("Loaded editor configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> GraphResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> GraphResult<()> {
        if self.history_capacity == 0 {
            return Err(GraphError::InvalidConfig(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        if self.storage_key.trim().is_empty() {
            return Err(GraphError::InvalidConfig(
                "storage_key cannot be empty".to_string(),
            ));
        }
        if !self.floor_change_distance.is_finite() || self.floor_change_distance < 0.0 {
            return Err(GraphError::InvalidConfig(format!(
                "floor_change_distance must be a non-negative number, got {}",
                self.floor_change_distance
            )));
        }
        if self.distance_precision > 10 {
            return Err(GraphError::InvalidConfig(format!(
                "distance_precision must be at most 10, got {}",
                self.distance_precision
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(EditorConfig::from_toml_str("").unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = EditorConfig::from_toml_str(
            r#"
            history_capacity = 10
            storage_dir = "/var/lib/floorgraph"
            autosave = false
            "#,
        )
        .unwrap();
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.storage_dir, Some(PathBuf::from("/var/lib/floorgraph")));
        assert!(!config.autosave);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_invalid_values() {
        let err = EditorConfig::from_toml_str("history_capacity = 0").unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfig(_)));
        assert!(EditorConfig::from_toml_str("floor_change_distance = -2.0").is_err());
        assert!(EditorConfig::from_toml_str("storage_key = \" \"").is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = EditorConfig::from_toml_str("history_capacity = [").unwrap_err();
        assert!(matches!(err, GraphError::ConfigParse(_)));
    }

    #[test]
    fn test_load_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("editor.toml");
        std::fs::write(&path, "distance_precision = 1\n").unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap().distance_precision, 1);

        let missing = EditorConfig::load(temp.path().join("nope.toml")).unwrap_err();
        assert!(missing.is_io());
    }
}
