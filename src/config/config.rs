use crate::core::SearchConfig;
use crate::state::ControllerSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable overriding `service.base_url`
pub const API_URL_ENV: &str = "SYMPTOM_DIAG_API_URL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub search: SearchSettings,
    pub selection: SelectionSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the diagnosis service
    pub base_url: String,

    /// Client-side timeout for each request; 0 keeps transport defaults
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Quiet period after the last keystroke before searching
    pub debounce_ms: u64,

    /// Minimum trimmed length that triggers a search
    pub min_query_chars: usize,

    /// Longest text the service accepts
    pub max_query_chars: usize,

    /// How many random suggestions to show
    pub suggestion_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    /// Maximum number of symptoms per diagnosis
    pub max_selected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing EnvFilter directive; RUST_LOG takes precedence
    pub filter: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout_ms: 15_000,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        let defaults = SearchConfig::default();
        Self {
            debounce_ms: defaults.debounce_ms,
            min_query_chars: defaults.min_query_chars,
            max_query_chars: defaults.max_query_chars,
            suggestion_count: defaults.suggestion_count,
        }
    }
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            max_selected: crate::core::MAX_SELECTED,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults when
    /// no file exists. Nothing is written.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        let config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            debug!(target: "config", "No config at {}, using defaults", config_path.display());
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!(target: "config", "Loaded config from {}", path.display());
        config.validated()
    }

    /// Save config to the given location
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("symptom-diag").join("config.toml"))
    }

    /// Apply `SYMPTOM_DIAG_API_URL` on top of file values
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                debug!(target: "config", "{} overrides base_url", API_URL_ENV);
                self.service.base_url = url.trim().to_string();
            }
        }
        self
    }

    fn validated(self) -> Result<Self> {
        if self.selection.max_selected == 0 {
            anyhow::bail!("selection.max_selected must be at least 1");
        }
        if self.search.min_query_chars > self.search.max_query_chars {
            anyhow::bail!(
                "search.min_query_chars ({}) exceeds search.max_query_chars ({})",
                self.search.min_query_chars,
                self.search.max_query_chars
            );
        }
        Ok(self)
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            search: SearchConfig {
                debounce_ms: self.search.debounce_ms,
                min_query_chars: self.search.min_query_chars,
                max_query_chars: self.search.max_query_chars,
                suggestion_count: self.search.suggestion_count,
            },
            max_selected: self.selection.max_selected,
        }
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# symptom-diag configuration file
# Location: ~/.config/symptom-diag/config.toml (Linux)
#           ~/Library/Application Support/symptom-diag/config.toml (macOS)
#           %APPDATA%\symptom-diag\config.toml (Windows)

[service]
# Diagnosis service address (overridden by SYMPTOM_DIAG_API_URL)
base_url = "http://localhost:5000"

# Per-request timeout in milliseconds, 0 to rely on transport defaults
request_timeout_ms = 15000

[search]
# Wait this long after the last keystroke before searching
debounce_ms = 300

# Shorter texts (after trimming) never trigger a search
min_query_chars = 3

# The service rejects longer texts
max_query_chars = 200

# Number of random quick suggestions drawn from the catalogue
suggestion_count = 6

[selection]
# Maximum number of symptoms sent for one diagnosis
max_selected = 5

[logging]
# tracing filter, e.g. "debug" or "info,symptom_diag::api=trace"
filter = "info"
"#
        .to_string()
    }
}
