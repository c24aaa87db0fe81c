//! Optional JSON tool configuration.
//!
//! ```json
//! {
//!   "colors": { "kick": 60, "snare": 13 },
//!   "cc_mappings": "3:119:15,4:120:14",
//!   "drum_template": "Templates/Drum Rack.adg",
//!   "parallel": true
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use adg_library::ColorScheme;
use adg_patch::{parse_cc_mappings, CcMapping};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AdgError;

/// Values the tools would otherwise take from their built-in defaults.
/// Every field is optional; command line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Overrides layered on top of the default pad color table.
    pub colors: Option<ColorScheme>,
    /// Default `slot:cc:macro` list for `cc-map`.
    pub cc_mappings: Option<String>,
    pub drum_template: Option<PathBuf>,
    pub sampler_template: Option<PathBuf>,
    /// Process batch folders on all cores.
    pub parallel: bool,
}

impl ToolConfig {
    pub fn load(path: &Path) -> Result<Self, AdgError> {
        let config_error = |reason: String| AdgError::Config {
            path: path.to_path_buf(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|err| config_error(err.to_string()))?;
        let config: ToolConfig = serde_json::from_str(&text).map_err(|err| config_error(err.to_string()))?;
        debug!(path = %path.display(), "loaded tool config");
        Ok(config)
    }

    /// Load `path` if given, else fall back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, AdgError> {
        path.map(Self::load).unwrap_or_else(|| Ok(Self::default()))
    }

    /// Default color table with the configured overrides applied.
    pub fn color_scheme(&self) -> ColorScheme {
        let mut scheme = ColorScheme::default();
        if let Some(colors) = &self.colors {
            scheme.merge(colors);
        }
        scheme
    }

    pub fn cc_mappings(&self) -> Result<Vec<CcMapping>, AdgError> {
        match &self.cc_mappings {
            Some(list) => Ok(parse_cc_mappings(list)?),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adg_library::ColorCategory;

    #[test]
    fn missing_file_means_defaults() {
        let config = ToolConfig::load_or_default(None).expect("defaults");
        assert_eq!(config, ToolConfig::default());
        assert_eq!(config.color_scheme().color(ColorCategory::Kick), 60);
        assert!(config.cc_mappings().expect("mappings").is_empty());
    }

    #[test]
    fn overrides_are_layered_on_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("adg.json");
        fs::write(&path, r#"{ "colors": { "kick": 5 }, "cc_mappings": "3:119:15", "parallel": true }"#)
            .expect("write");
        let config = ToolConfig::load(&path).expect("load");
        assert!(config.parallel);
        let scheme = config.color_scheme();
        assert_eq!(scheme.color(ColorCategory::Kick), 5);
        assert_eq!(scheme.color(ColorCategory::Snare), 13);
        assert_eq!(config.cc_mappings().expect("mappings")[0].macro_index, 15);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("adg.json");
        fs::write(&path, r#"{ "colours": {} }"#).expect("write");
        let err = ToolConfig::load(&path).expect_err("must fail");
        assert!(matches!(err, AdgError::Config { .. }));
        assert!(err.to_string().contains("adg.json"));
    }
}
