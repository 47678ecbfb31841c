//! Conversation DTOs

use super::CreateParticipantDTO;
use serde::{Deserialize, Serialize};

/// DTO to create a conversation together with its initial participants
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateConversationDTO {
    pub participants: Vec<CreateParticipantDTO>,
}
