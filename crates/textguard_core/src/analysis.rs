//! Analysis options and results.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

fn default_analysis_type() -> String {
    "spam".to_string()
}

/// Per-request options that influence the remote answer.
///
/// Options are part of the cache fingerprint, so two requests with the same
/// text but different options are cached separately. `extra` is a sorted map
/// so serialization is deterministic.
///
/// # Examples
///
/// ```
/// use textguard_core::AnalysisOptions;
///
/// let options = AnalysisOptions::builder()
///     .temperature(0.1)
///     .build()
///     .unwrap();
/// assert_eq!(options.analysis_type(), "spam");
/// assert_eq!(*options.temperature(), Some(0.1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(default)]
pub struct AnalysisOptions {
    /// Kind of analysis requested (default "spam")
    #[serde(default = "default_analysis_type")]
    #[builder(setter(into))]
    analysis_type: String,

    /// Model override; the executor's configured model is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(setter(into, strip_option))]
    model: Option<String>,

    /// Sampling temperature override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(setter(strip_option))]
    temperature: Option<f32>,

    /// Provider-specific options forwarded verbatim
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    extra: BTreeMap<String, JsonValue>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            analysis_type: default_analysis_type(),
            model: None,
            temperature: None,
            extra: BTreeMap::new(),
        }
    }
}

impl AnalysisOptions {
    /// Creates a new options builder.
    pub fn builder() -> AnalysisOptionsBuilder {
        AnalysisOptionsBuilder::default()
    }
}

/// Outcome of analysing one text.
///
/// # Examples
///
/// ```
/// use textguard_core::AnalysisResult;
///
/// let result = AnalysisResult::new("hello", false, 0.9, "Not spam, 90% confidence");
/// assert!(!result.is_spam());
/// assert_eq!(*result.confidence(), 0.9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct AnalysisResult {
    /// The analysed text as submitted
    text: String,
    /// Whether the service judged the text to be spam
    #[getter(skip)]
    is_spam: bool,
    /// Confidence in the judgement, in [0, 1]
    confidence: f64,
    /// Free-form explanation returned by the service
    analysis: String,
}

impl AnalysisResult {
    /// Creates a result.
    pub fn new(
        text: impl Into<String>,
        is_spam: bool,
        confidence: f64,
        analysis: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            is_spam,
            confidence,
            analysis: analysis.into(),
        }
    }

    /// Whether the service judged the text to be spam.
    pub fn is_spam(&self) -> bool {
        self.is_spam
    }
}
