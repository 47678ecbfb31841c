//! Entities module - domain records persisted in the database
//!
//! Each entity maps one table. The `*Populated` views are the shapes carried by
//! resolvers and pub/sub events: a record plus the related rows a client needs
//! to render it.

pub mod conversation;
pub mod message;
pub mod participant;
pub mod user;

pub use conversation::{Conversation, ConversationPopulated};
pub use message::{Message, MessagePopulated};
pub use participant::{ConversationParticipant, ParticipantPopulated};
pub use user::{User, UserSummary};
