//! Application settings for the worktrack backend.
//!
//! Settings are loaded from a TOML file with environment-variable overrides
//! for the values that commonly differ between deployments. Every field has
//! a sensible default so a bare `Settings::default()` is usable in tests.

use serde::{Deserialize, Serialize};

use crate::error::{WorktrackError, WorktrackResult};

/// The complete set of application settings.
///
/// # Examples
///
/// ```
/// use worktrack_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.log_level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether debug mode is enabled.
    pub debug: bool,
    /// The tracing filter directive (e.g. "info", "worktrack_admin=debug").
    pub log_level: String,
    /// The address the HTTP server binds to.
    pub listen_addr: String,
    /// Enterprise features enabled for this installation, by feature key
    /// (e.g. "multiselect_custom_fields").
    pub enterprise_features: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            listen_addr: "127.0.0.1:8000".to_string(),
            enterprise_features: Vec::new(),
        }
    }
}

impl Settings {
    /// Parses settings from a TOML document.
    pub fn from_toml_str(content: &str) -> WorktrackResult<Self> {
        toml::from_str(content).map_err(|e| WorktrackError::Configuration(e.to_string()))
    }

    /// Loads settings from a TOML file, then applies environment overrides.
    pub fn load(path: &std::path::Path) -> WorktrackResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut settings = Self::from_toml_str(&content)?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Applies `WORKTRACK_*` environment-variable overrides.
    ///
    /// Recognized variables: `WORKTRACK_DEBUG`, `WORKTRACK_LOG_LEVEL`,
    /// `WORKTRACK_LISTEN_ADDR`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(debug) = std::env::var("WORKTRACK_DEBUG") {
            self.debug = matches!(debug.as_str(), "1" | "true" | "yes");
        }
        if let Ok(level) = std::env::var("WORKTRACK_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Ok(addr) = std::env::var("WORKTRACK_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
    }

    /// Returns `true` if the given enterprise feature key is enabled.
    pub fn enterprise_feature_enabled(&self, key: &str) -> bool {
        self.enterprise_features.iter().any(|f| f == key)
    }
}
