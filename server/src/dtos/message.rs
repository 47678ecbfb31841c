//! Message DTOs

use serde::{Deserialize, Serialize};

/// Longest accepted message body, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 5000;

/// DTO to create a new message (no id, no timestamp: both assigned on insert).
/// The body is checked by `services::conversations::validate_message_body`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateMessageDTO {
    pub conversation_id: String,
    pub sender_id: String,
    pub body: String,
}
