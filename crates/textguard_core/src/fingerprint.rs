//! Deterministic cache keys for analysis requests.

use crate::AnalysisOptions;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use textguard_error::{JsonError, TextGuardResult};

/// SHA-256 digest of normalized input text plus serialized options.
///
/// # Examples
///
/// ```
/// use textguard_core::{AnalysisOptions, Fingerprint};
///
/// let options = AnalysisOptions::default();
/// let a = Fingerprint::compute("Free  money\n", &options).unwrap();
/// let b = Fingerprint::compute("Free money", &options).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().len(), 64);
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint for `input` under `options`.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the options cannot be serialized.
    pub fn compute(input: &str, options: &AnalysisOptions) -> TextGuardResult<Self> {
        let normalized = normalize_text(input);
        let serialized = serde_json::to_string(options).map_err(JsonError::from)?;

        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        // Separator keeps ("ab", "c") and ("a", "bc") apart.
        hasher.update([0u8]);
        hasher.update(serialized.as_bytes());
        let digest = hasher.finalize();

        Ok(Self(digest.iter().map(|b| format!("{:02x}", b)).collect()))
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Trims the text and collapses internal whitespace runs to single spaces.
pub fn normalize_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_change_fingerprint() {
        let plain = AnalysisOptions::default();
        let warm = AnalysisOptions::builder().temperature(0.9).build().unwrap();

        let a = Fingerprint::compute("hello", &plain).unwrap();
        let b = Fingerprint::compute("hello", &warm).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_case_is_preserved() {
        let options = AnalysisOptions::default();
        let a = Fingerprint::compute("FREE", &options).unwrap();
        let b = Fingerprint::compute("free", &options).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  a \t b\n\nc  "), "a b c");
        assert_eq!(normalize_text(""), "");
    }
}
