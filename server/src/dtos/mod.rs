//! DTOs module - Data Transfer Objects
//!
//! Input shapes accepted by the repositories, validated before they reach the
//! database. Output shapes live in `graphql::models`.

pub mod conversation;
pub mod message;
pub mod participant;
pub mod user;

pub use conversation::CreateConversationDTO;
pub use message::{CreateMessageDTO, MAX_MESSAGE_LENGTH};
pub use participant::CreateParticipantDTO;
pub use user::{CreateUserDTO, UpdateUsernameDTO};
