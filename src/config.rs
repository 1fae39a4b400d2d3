//! Configuration for the hybrid search host.
//!
//! Loaded from TOML with every field defaulted, then overlaid with the
//! `BRAVE_API_KEY` and `BRAVE_DAILY_QUOTA` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hybrid_search::providers::{BraveConfig, DuckDuckGoConfig, WikipediaConfig};
use hybrid_search::providers::brave::BRAVE_API_URL;
use hybrid_search::providers::duckduckgo::DUCKDUCKGO_HTML_URL;
use hybrid_search::providers::wikipedia::{WIKIPEDIA_API_URL, WIKIPEDIA_SITE_URL};
use serde::{Deserialize, Serialize};

use crate::error::{HybridError, Result};

/// Environment variable holding the Brave subscription token.
pub const ENV_BRAVE_API_KEY: &str = "BRAVE_API_KEY";

/// Environment variable overriding the Brave daily quota.
pub const ENV_BRAVE_DAILY_QUOTA: &str = "BRAVE_DAILY_QUOTA";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridConfig {
    /// Results returned when the caller does not ask for a count.
    pub max_results: usize,
    /// Deadline for one aggregated search, in seconds.
    pub request_timeout_secs: u64,
    /// Brave Search API settings.
    pub brave: BraveSettings,
    /// DuckDuckGo HTML scraping settings.
    pub duckduckgo: DuckDuckGoSettings,
    /// Wikipedia API settings.
    pub wikipedia: WikipediaSettings,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            request_timeout_secs: 20,
            brave: BraveSettings::default(),
            duckduckgo: DuckDuckGoSettings::default(),
            wikipedia: WikipediaSettings::default(),
        }
    }
}

/// Brave Search API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BraveSettings {
    pub enabled: bool,
    /// Subscription token. Usually supplied through `BRAVE_API_KEY`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    pub daily_quota: u32,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BraveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            daily_quota: 66,
            base_url: BRAVE_API_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl BraveSettings {
    /// Provider configuration for these settings.
    pub fn provider_config(&self) -> BraveConfig {
        BraveConfig {
            api_key: self.api_key.clone(),
            daily_quota: self.daily_quota,
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..BraveConfig::default()
        }
    }
}

/// DuckDuckGo HTML scraping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DuckDuckGoSettings {
    pub enabled: bool,
    pub base_url: String,
    /// Minimum spacing between outbound calls, in milliseconds.
    pub min_interval_ms: u64,
    pub timeout_secs: u64,
    /// Fixed User-Agent; a rotated browser UA is used when unset.
    pub user_agent: Option<String>,
}

impl Default for DuckDuckGoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DUCKDUCKGO_HTML_URL.to_string(),
            min_interval_ms: 1000,
            timeout_secs: 15,
            user_agent: None,
        }
    }
}

impl DuckDuckGoSettings {
    /// Provider configuration for these settings.
    pub fn provider_config(&self) -> DuckDuckGoConfig {
        DuckDuckGoConfig {
            base_url: self.base_url.clone(),
            min_interval: Duration::from_millis(self.min_interval_ms),
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
            ..DuckDuckGoConfig::default()
        }
    }
}

/// Wikipedia API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WikipediaSettings {
    pub enabled: bool,
    pub api_url: String,
    pub site_url: String,
    pub timeout_secs: u64,
}

impl Default for WikipediaSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: WIKIPEDIA_API_URL.to_string(),
            site_url: WIKIPEDIA_SITE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl WikipediaSettings {
    /// Provider configuration for these settings.
    pub fn provider_config(&self) -> WikipediaConfig {
        WikipediaConfig {
            api_url: self.api_url.clone(),
            site_url: self.site_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..WikipediaConfig::default()
        }
    }
}

impl HybridConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| HybridError::Config(e.to_string()))
    }

    /// Resolve the effective configuration.
    ///
    /// Reads `path` if given, otherwise [`default_config_path`](Self::default_config_path)
    /// when that file exists, otherwise built-in defaults. Environment
    /// overrides are applied and the result is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, a file cannot be
    /// parsed, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_config_path();
                if default_path.is_file() {
                    tracing::debug!(path = %default_path.display(), "loading default config");
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from an environment-style lookup.
    ///
    /// Empty values are ignored. An unparseable quota is ignored with a
    /// warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_BRAVE_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.brave.api_key = key.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_BRAVE_DAILY_QUOTA).filter(|v| !v.trim().is_empty()) {
            match raw.trim().parse::<u32>() {
                Ok(quota) => self.brave.daily_quota = quota,
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring invalid BRAVE_DAILY_QUOTA"),
            }
        }
    }

    /// Check the configuration for values no search can run with.
    ///
    /// # Errors
    ///
    /// Returns [`HybridError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(HybridError::Config("max_results must be greater than 0".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(HybridError::Config(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        let timeouts = [
            ("brave", self.brave.enabled, self.brave.timeout_secs),
            ("duckduckgo", self.duckduckgo.enabled, self.duckduckgo.timeout_secs),
            ("wikipedia", self.wikipedia.enabled, self.wikipedia.timeout_secs),
        ];
        for (section, enabled, timeout_secs) in timeouts {
            if enabled && timeout_secs == 0 {
                return Err(HybridError::Config(format!(
                    "{section}.timeout_secs must be greater than 0"
                )));
            }
        }
        Ok(())
    }

    /// Deadline for one aggregated search.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the default config file path: `~/.config/hybrid/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("hybrid").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("hybrid")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/hybrid-config/config.toml")
        }
    }
}
