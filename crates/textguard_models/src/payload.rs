//! Request payload construction.

use crate::UpstreamConfig;
use textguard_core::{AnalysisOptions, ChatPayload, Message, Role};

/// Builds the chat payload for analysing `text`.
///
/// Options override the configured model and temperature; `extra` options
/// are forwarded as top-level fields.
///
/// # Examples
///
/// ```
/// use textguard_core::AnalysisOptions;
/// use textguard_models::{UpstreamConfig, build_payload};
///
/// let payload = build_payload(
///     "Claim your prize",
///     &AnalysisOptions::default(),
///     &UpstreamConfig::default(),
///     Some("free"),
/// );
/// assert_eq!(payload.model, "deepseek-chat");
/// assert_eq!(payload.messages.len(), 2);
/// assert!(payload.messages[1].content.ends_with("Claim your prize"));
/// ```
pub fn build_payload(
    text: &str,
    options: &AnalysisOptions,
    config: &UpstreamConfig,
    tier: Option<&str>,
) -> ChatPayload {
    let model = options
        .model()
        .clone()
        .unwrap_or_else(|| config.model().clone());
    let temperature = options.temperature().unwrap_or(*config.temperature());

    ChatPayload {
        model,
        messages: vec![
            Message::new(Role::System, config.system_prompt().as_str()),
            Message::new(
                Role::User,
                format!("Analyze this text for {}: {}", options.analysis_type(), text),
            ),
        ],
        temperature: Some(temperature),
        tier: tier.map(str::to_string),
        extra: options.extra().clone(),
    }
}
