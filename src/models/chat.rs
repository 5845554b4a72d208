use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A persisted chat exchange: one prompt and the provider's response.
///
/// Both providers write to the same log; usage counters and history are
/// computed over it.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// The unique identifier for the message.
    pub id: Uuid,
    /// The user who asked.
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    /// The user's prompt.
    pub prompt: String,
    /// The generated response.
    pub response: String,
    /// The timestamp when the exchange was stored.
    pub created_at: DateTime<Utc>,
}
