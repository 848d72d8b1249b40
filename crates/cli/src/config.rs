//! `qtree.toml` configuration.
//!
//! # Example
//!
//! ```toml
//! [engine]
//! server_version = "9.1.0.19562"
//! use_lookup = true
//! ```
//!
//! `column_comparison_supported` may be set directly; it overrides whatever
//! `server_version` implies.

use std::path::Path;

use serde::Deserialize;

use qtree_core::{EngineConfig, ServerVersion};

/// File read when `--config` is not given, if present in the working directory.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "qtree.toml";

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct QtreeConfig {
    #[serde(default)]
    pub engine: EngineSection,
}

/// `[engine]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct EngineSection {
    /// Version of the connected server, e.g. `9.1.0.19562`.
    pub server_version: Option<String>,
    pub column_comparison_supported: Option<bool>,
    #[serde(default)]
    pub use_lookup: bool,
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Read and parse a config TOML file from `path`.
pub(crate) fn read_config(path: &Path) -> Result<QtreeConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

/// Load the explicit config file, or the default one when it exists.
pub(crate) fn load_config(path: Option<&Path>) -> Result<QtreeConfig, String> {
    match path {
        Some(path) => read_config(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                read_config(default)
            } else {
                Ok(QtreeConfig::default())
            }
        }
    }
}

impl QtreeConfig {
    /// Engine settings derived from the `[engine]` section.
    pub(crate) fn engine_config(&self) -> Result<EngineConfig, String> {
        let section = &self.engine;
        let mut config = match &section.server_version {
            Some(text) => {
                let version: ServerVersion = text.parse().map_err(|e| format!("{}", e))?;
                EngineConfig::for_server(version, section.use_lookup)
            }
            None => EngineConfig {
                use_lookup: section.use_lookup,
                ..EngineConfig::default()
            },
        };
        if let Some(explicit) = section.column_comparison_supported {
            config.column_comparison_supported = explicit;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> QtreeConfig {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse("").engine_config().unwrap();
        assert!(!config.column_comparison_supported);
        assert!(!config.use_lookup);
    }

    #[test]
    fn server_version_gates_column_comparison() {
        let old = parse("[engine]\nserver_version = \"9.0.2.0\"\n");
        assert!(!old.engine_config().unwrap().column_comparison_supported);
        let new = parse("[engine]\nserver_version = \"9.1.0.19562\"\nuse_lookup = true\n");
        let config = new.engine_config().unwrap();
        assert!(config.column_comparison_supported);
        assert!(config.use_lookup);
    }

    #[test]
    fn explicit_flag_overrides_version() {
        let config = parse(
            "[engine]\nserver_version = \"9.2\"\ncolumn_comparison_supported = false\n",
        );
        assert!(!config.engine_config().unwrap().column_comparison_supported);
    }

    #[test]
    fn bad_version_is_reported() {
        let config = parse("[engine]\nserver_version = \"nine\"\n");
        assert!(config.engine_config().unwrap_err().contains("nine"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/qtree.toml"))).unwrap_err();
        assert!(err.starts_with("could not read"));
    }
}
