//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Participant in a chat-completions conversation.
///
/// Serialized in lowercase, the form chat-completions endpoints expect.
///
/// # Examples
///
/// ```
/// use textguard_core::Role;
///
/// assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
/// assert_eq!(format!("{}", Role::User), "User");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System messages provide context and instructions
    System,
    /// User messages carry the text under analysis
    User,
}
