//! Credential-to-tier resolution.

use crate::{TierConfig, TierDefinition};
use std::collections::HashMap;
use std::fmt;
use textguard_error::{AuthError, AuthErrorKind, ConfigError, TextGuardResult};
use tracing::{debug, instrument, warn};

/// Maps caller credentials to tiers and tiers to their limits.
///
/// Read-only once built. Credentials themselves come from an external
/// source (environment variables named in configuration).
///
/// # Example
///
/// ```
/// use textguard_rate_limit::{TierDefinition, TierRegistry};
///
/// let registry = TierRegistry::new([TierDefinition::new("free", 100, 10)])
///     .with_credential("free_key", "free")
///     .unwrap();
///
/// assert_eq!(registry.resolve("free_key").unwrap(), "free");
/// assert!(registry.resolve("nope").is_err());
/// assert_eq!(registry.limits("free").unwrap().max_batch_size, 10);
/// ```
#[derive(Clone, Default)]
pub struct TierRegistry {
    tiers: HashMap<String, TierDefinition>,
    credentials: HashMap<String, String>,
}

impl fmt::Debug for TierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TierRegistry")
            .field("tiers", &self.tiers)
            .field("credentials", &self.credentials.len())
            .finish()
    }
}

impl TierRegistry {
    /// Creates a registry with the given tiers and no credentials.
    pub fn new(tiers: impl IntoIterator<Item = TierDefinition>) -> Self {
        Self {
            tiers: tiers
                .into_iter()
                .map(|tier| (tier.name.clone(), tier))
                .collect(),
            credentials: HashMap::new(),
        }
    }

    /// Registers a credential for an existing tier.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the tier is unknown.
    pub fn with_credential(
        mut self,
        credential: impl Into<String>,
        tier: impl Into<String>,
    ) -> TextGuardResult<Self> {
        let tier = tier.into();
        if !self.tiers.contains_key(&tier) {
            return Err(ConfigError::new(format!(
                "Credential mapped to unknown tier '{}'",
                tier
            ))
            .into());
        }
        self.credentials.insert(credential.into(), tier);
        Ok(self)
    }

    /// Builds a registry from configuration tables.
    ///
    /// `credentials` maps an environment variable name to a tier name; the
    /// credential is whatever `lookup` returns for that name. Variables that
    /// are unset are skipped with a warning so a deployment can enable only
    /// some tiers.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a credential names an unknown tier.
    #[instrument(skip_all, fields(tiers = tiers.len(), credentials = credentials.len()))]
    pub fn from_config<F>(
        tiers: &HashMap<String, TierConfig>,
        credentials: &HashMap<String, String>,
        lookup: F,
    ) -> TextGuardResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut registry = Self::new(
            tiers
                .iter()
                .map(|(name, config)| TierDefinition::from_config(name.clone(), config)),
        );

        for (variable, tier) in credentials {
            match lookup(variable) {
                Some(credential) if !credential.trim().is_empty() => {
                    debug!(variable = %variable, tier = %tier, "Registered credential");
                    registry = registry.with_credential(credential, tier.clone())?;
                }
                _ => {
                    warn!(variable = %variable, tier = %tier, "Credential variable not set, tier unreachable");
                }
            }
        }

        Ok(registry)
    }

    /// Resolves a credential to its tier name.
    ///
    /// # Errors
    ///
    /// Returns an auth error if the credential is empty or unknown.
    pub fn resolve(&self, credential: &str) -> TextGuardResult<String> {
        if credential.trim().is_empty() {
            return Err(AuthError::new(AuthErrorKind::MissingCredential).into());
        }

        self.credentials
            .get(credential)
            .cloned()
            .ok_or_else(|| AuthError::new(AuthErrorKind::UnknownCredential).into())
    }

    /// Limits for a tier.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the tier is unknown.
    pub fn limits(&self, tier: &str) -> TextGuardResult<&TierDefinition> {
        self.tiers
            .get(tier)
            .ok_or_else(|| ConfigError::new(format!("Unknown tier: {}", tier)).into())
    }

    /// Known tier names, sorted.
    pub fn tiers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tiers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
