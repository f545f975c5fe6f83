//! Layered TOML configuration.
//!
//! Sources, later overriding earlier:
//! - Bundled defaults (include_str! from textguard.toml)
//! - `~/.config/textguard/textguard.toml`
//! - `./textguard.toml`
//! - An explicit file, when given

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use textguard_cache::ResultCacheConfig;
use textguard_error::{ConfigError, TextGuardError, TextGuardResult};
use textguard_executor::RetryConfig;
use textguard_models::UpstreamConfig;
use textguard_rate_limit::{QuotaConfig, TierConfig};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../textguard.toml");

/// Binds a caller credential, read from an environment variable, to a tier.
///
/// ```toml
/// [[credentials]]
/// env = "FREE_API_KEY"
/// tier = "free"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct CredentialSource {
    /// Environment variable holding the credential
    env: String,
    /// Tier the credential unlocks
    tier: String,
}

impl CredentialSource {
    /// Creates a binding.
    pub fn new(env: impl Into<String>, tier: impl Into<String>) -> Self {
        Self {
            env: env.into(),
            tier: tier.into(),
        }
    }
}

/// Complete TextGuard configuration.
///
/// # Example
///
/// ```no_run
/// use textguard::TextGuardConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TextGuardConfig::load()?;
/// let free = &config.tiers()["free"];
/// println!("free tier: {} requests/day", free.requests_per_day);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Getters)]
pub struct TextGuardConfig {
    /// Tier name to limits
    #[serde(default)]
    tiers: HashMap<String, TierConfig>,

    /// Credential bindings
    #[serde(default)]
    credentials: Vec<CredentialSource>,

    /// Result cache settings
    #[serde(default)]
    cache: ResultCacheConfig,

    /// Retry settings
    #[serde(default)]
    retry: RetryConfig,

    /// Quota window settings
    #[serde(default)]
    quota: QuotaConfig,

    /// Analysis service settings
    #[serde(default)]
    upstream: UpstreamConfig,
}

impl TextGuardConfig {
    /// The defaults shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled file fails to parse.
    pub fn bundled() -> TextGuardResult<Self> {
        finish(Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)))
    }

    /// Load configuration from a specific file path, without defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> TextGuardResult<Self> {
        debug!("Loading configuration from file");
        finish(Config::builder().add_source(File::from(path.as_ref())))
    }

    /// Load configuration with precedence: current dir > home dir > bundled
    /// defaults.
    ///
    /// User config files are optional and skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if any present source fails to parse.
    pub fn load() -> TextGuardResult<Self> {
        Self::load_with(None::<&Path>)
    }

    /// As [`load`](Self::load), with `explicit` layered on top.
    ///
    /// Unlike the user files, an explicit file must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` is missing or any source fails to
    /// parse.
    #[instrument(skip(explicit))]
    pub fn load_with(explicit: Option<impl AsRef<Path>>) -> TextGuardResult<Self> {
        debug!("Loading configuration with precedence: explicit > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/textguard/textguard.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("textguard").required(false));

        if let Some(path) = explicit {
            debug!(path = %path.as_ref().display(), "Adding explicit configuration file");
            builder = builder.add_source(File::from(path.as_ref()));
        }

        finish(builder)
    }

    /// Credential bindings as the env-variable-to-tier map the registry
    /// expects.
    pub fn credential_map(&self) -> HashMap<String, String> {
        self.credentials
            .iter()
            .map(|source| (source.env.clone(), source.tier.clone()))
            .collect()
    }

    /// Adds or replaces a tier.
    pub fn with_tier(mut self, name: impl Into<String>, tier: TierConfig) -> Self {
        self.tiers.insert(name.into(), tier);
        self
    }

    /// Adds a credential binding.
    pub fn with_credential(mut self, source: CredentialSource) -> Self {
        self.credentials.push(source);
        self
    }

    /// Replaces the cache settings.
    pub fn with_cache(mut self, cache: ResultCacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Replaces the retry settings.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the quota settings.
    pub fn with_quota(mut self, quota: QuotaConfig) -> Self {
        self.quota = quota;
        self
    }
}

fn finish(builder: ConfigBuilder<DefaultState>) -> TextGuardResult<TextGuardConfig> {
    builder
        .build()
        .map_err(|e| {
            TextGuardError::from(ConfigError::new(format!(
                "Failed to build configuration: {}",
                e
            )))
        })?
        .try_deserialize()
        .map_err(|e| {
            TextGuardError::from(ConfigError::new(format!(
                "Failed to parse configuration: {}",
                e
            )))
        })
}
