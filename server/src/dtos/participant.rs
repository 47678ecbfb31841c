//! Participant DTOs

use serde::{Deserialize, Serialize};

/// DTO to add a user to a conversation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateParticipantDTO {
    pub user_id: String,
    pub has_seen_latest_message: bool,
}
