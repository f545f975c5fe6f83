//! Response classification and analysis parsing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use textguard_core::AnalysisResult;
use textguard_error::{JsonError, TextGuardResult};
use tracing::debug;

/// Raw response from one remote call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
    /// Delay suggested by the service before retrying, if any
    pub retry_after: Option<Duration>,
}

impl TransportResponse {
    /// Response without a retry hint.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    /// Attaches a retry hint.
    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }
}

/// Every status code maps to exactly one class.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum StatusClass {
    /// 2xx
    Success,
    /// 429: the service asked us to slow down
    RateLimited,
    /// Anything else; retrying would only burn quota
    Fatal,
}

/// Classifies an HTTP status.
///
/// # Examples
///
/// ```
/// use textguard_models::{StatusClass, classify_status};
///
/// assert_eq!(classify_status(200), StatusClass::Success);
/// assert_eq!(classify_status(429), StatusClass::RateLimited);
/// assert_eq!(classify_status(503), StatusClass::Fatal);
/// ```
pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        429 => StatusClass::RateLimited,
        _ => StatusClass::Fatal,
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

static CONFIDENCE_AFTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?%?)\s*(?:confidence|probability|likelihood)")
        .expect("confidence pattern is valid")
});

static CONFIDENCE_BEFORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:confidence|probability|likelihood)(?:\s+(?:score|level))?\s*(?::|of|is|=)?\s*(\d+(?:\.\d+)?%?)")
        .expect("confidence pattern is valid")
});

const NEGATIONS: &[&str] = &[
    "not spam",
    "not a spam",
    "isn't spam",
    "is not spam",
    "no spam",
    "non-spam",
];

const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Parses a chat-completions body into an analysis of `text`.
///
/// # Errors
///
/// Returns a JSON error if the body is not a chat completion with at least
/// one choice.
pub fn parse_analysis(text: &str, body: &str) -> TextGuardResult<AnalysisResult> {
    let completion: ChatCompletion = serde_json::from_str(body).map_err(JsonError::from)?;
    let analysis = completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| JsonError::new("Chat completion contained no choices"))?;

    let is_spam = detect_spam(&analysis);
    let confidence = extract_confidence(&analysis);
    debug!(is_spam, confidence, "Parsed analysis");

    Ok(AnalysisResult::new(text, is_spam, confidence, analysis))
}

/// Whether the analysis calls the text spam.
pub fn detect_spam(analysis: &str) -> bool {
    let lower = analysis.to_lowercase();
    lower.contains("spam") && !NEGATIONS.iter().any(|negation| lower.contains(negation))
}

/// Extracts a confidence in [0, 1] from the analysis, defaulting to 0.5.
///
/// Percentages and bare numbers above 1 are read as percentages.
///
/// # Examples
///
/// ```
/// use textguard_models::extract_confidence;
///
/// assert_eq!(extract_confidence("Spam with 95% confidence"), 0.95);
/// assert_eq!(extract_confidence("Confidence: 0.8"), 0.8);
/// assert_eq!(extract_confidence("Looks fine"), 0.5);
/// ```
pub fn extract_confidence(analysis: &str) -> f64 {
    let lower = analysis.to_lowercase();
    let captured = CONFIDENCE_AFTER
        .captures(&lower)
        .or_else(|| CONFIDENCE_BEFORE.captures(&lower))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string());

    let Some(raw) = captured else {
        return DEFAULT_CONFIDENCE;
    };

    let (number, percent) = match raw.strip_suffix('%') {
        Some(number) => (number, true),
        None => (raw.as_str(), false),
    };

    match number.parse::<f64>() {
        Ok(value) if percent || value > 1.0 => (value / 100.0).clamp(0.0, 1.0),
        Ok(value) => value.clamp(0.0, 1.0),
        Err(_) => DEFAULT_CONFIDENCE,
    }
}
