//! # Console Configuration
//!
//! Where the backend lives, where the token is kept, and which policies the
//! session gate and the stores follow.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BAKERY_API_URL=https://bakery.example/api                          │
//! │     BAKERY_TIMEOUT_SECS=10                                             │
//! │     BAKERY_TOKEN_PATH=/run/bakery/session.token                        │
//! │     BAKERY_GUARD_POLICY=optimistic                                     │
//! │     BAKERY_STALE_POLICY=latest_issued_wins                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/bakery-console/console.toml (Linux)                      │
//! │     ~/Library/Application Support/com.bakery.console/console.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:5000/api, 30s timeout, fail-closed guard          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # console.toml
//! [api]
//! base_url = "https://bakery.example/api"
//! timeout_secs = 30
//!
//! [session]
//! token_path = "/var/lib/bakery/session.token"   # optional
//! guard_policy = "fail_closed"                    # fail_closed | optimistic
//!
//! [store]
//! stale_policy = "last_completion_wins"           # | latest_issued_wins
//! ```

use bakery_core::{GuardPolicy, StalePolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "console.toml";

// =============================================================================
// API Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL every endpoint path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Session Settings
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Explicit token file. Defaults to the platform data directory.
    #[serde(default)]
    pub token_path: Option<PathBuf>,

    /// How protected views treat a persisted but unvalidated token.
    #[serde(default)]
    pub guard_policy: GuardPolicy,
}

// =============================================================================
// Store Settings
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Which completion wins when requests for one operation overlap.
    #[serde(default)]
    pub stale_policy: StalePolicy,
}

// =============================================================================
// Console Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub store: StoreSettings,
}

impl ConsoleConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (console.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading console config from file");
                let contents = std::fs::read_to_string(&path).map_err(|e| {
                    ClientError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
                })?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load console config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn validate(&self) -> ClientResult<()> {
        let url = url::Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidConfig(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }
        if url.host_str().is_none() {
            return Err(ClientError::InvalidConfig("API URL is missing a host".into()));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("BAKERY_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Ok(secs) = std::env::var("BAKERY_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.api.timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring non-numeric BAKERY_TIMEOUT_SECS"),
            }
        }

        if let Ok(path) = std::env::var("BAKERY_TOKEN_PATH") {
            self.session.token_path = Some(PathBuf::from(path));
        }

        if let Ok(policy) = std::env::var("BAKERY_GUARD_POLICY") {
            match policy.parse() {
                Ok(parsed) => self.session.guard_policy = parsed,
                Err(e) => warn!("{}", e),
            }
        }

        if let Ok(policy) = std::env::var("BAKERY_STALE_POLICY") {
            match policy.parse() {
                Ok(parsed) => self.store.stale_policy = parsed,
                Err(e) => warn!("{}", e),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bakery", "console")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn guard_policy(&self) -> GuardPolicy {
        self.session.guard_policy
    }

    pub fn stale_policy(&self) -> StalePolicy {
        self.store.stale_policy
    }
}
