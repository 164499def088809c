//! Conversation roles.

/// Who authored a conversation turn.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions applied to the whole exchange
    System,
    /// The requesting side of the exchange
    User,
    /// The generating side of the exchange
    Assistant,
}
