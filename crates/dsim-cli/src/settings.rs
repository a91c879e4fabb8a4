//! User settings - persisted defaults for the `dsim` command.
//!
//! Settings live in `settings.toml` under the platform config directory.
//! A missing or unreadable file yields defaults; it is never an error.
//!
//! Precedence for every value: command-line flag, then environment
//! variable (`DSIM_API_URL`, applied by clap), then this file, then the
//! built-in default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dsim_client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use dsim_core::ActiveView;
use dsim_model::MappingConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// =============================================================================
// ROOT SETTINGS
// =============================================================================

/// Serialized to TOML and stored in the user's config directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Prediction service connection.
    pub api: ApiSettings,

    /// Mapping and view defaults.
    pub workspace: WorkspaceSettings,
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(error) => {
                warn!(path = %path.display(), %error, "Ignoring invalid settings file");
                Self::default()
            }
        }
    }

    /// Writes settings to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize settings")?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write settings to {}", path.display()))
    }

    /// Default config file path.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "DistrictSimulator", "dsim")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }

    /// TOML text of these settings.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize settings")
    }

    /// Client configuration after applying command-line overrides.
    ///
    /// `base_url` already carries the `DSIM_API_URL` value when the flag
    /// was not given.
    pub fn client_config(
        &self,
        base_url: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> ClientConfig {
        let base_url = base_url.unwrap_or(&self.api.base_url);
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(self.api.timeout_secs));
        debug!(base_url, timeout_secs = timeout.as_secs(), "Resolved service settings");
        ClientConfig::new(base_url)
            .with_timeout(timeout)
            .with_retry(self.api.retry)
    }
}

// =============================================================================
// API SETTINGS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Service API base, e.g. `http://localhost:5000/api`.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Retry a submission once after a connection failure.
    pub retry: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            retry: true,
        }
    }
}

// =============================================================================
// WORKSPACE SETTINGS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceSettings {
    /// File whose text is used as the mapping when none is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_mapping_file: Option<PathBuf>,

    /// View shown after a successful simulation.
    pub default_view: ActiveView,
}

impl WorkspaceSettings {
    /// The configured mapping file's text, or the built-in default mapping.
    pub fn mapping(&self) -> Result<MappingConfig> {
        match &self.default_mapping_file {
            Some(path) => read_mapping_file(path),
            None => Ok(MappingConfig::default()),
        }
    }
}

/// Reads a mapping file verbatim. The text is not validated.
pub fn read_mapping_file(path: &Path) -> Result<MappingConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read mapping file {}", path.display()))?;
    Ok(MappingConfig::from_text(text))
}
