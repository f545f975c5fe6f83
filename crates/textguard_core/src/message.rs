//! Message and payload types sent to the analysis service.

use crate::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// A single chat message.
///
/// # Examples
///
/// ```
/// use textguard_core::{Message, Role};
///
/// let message = Message::new(Role::User, "Win a free cruise!");
/// assert_eq!(message.role, Role::User);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// Message text
    pub content: String,
}

impl Message {
    /// Creates a message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Body of one remote analysis call.
///
/// Carries the model identifier, the conversation, the caller's tier label
/// and any extra options, which are flattened into the top-level JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPayload {
    /// Model identifier (e.g., "deepseek-chat")
    pub model: String,
    /// Conversation content
    pub messages: Vec<Message>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Tier label of the caller, forwarded for upstream accounting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    /// Extra provider options
    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}
