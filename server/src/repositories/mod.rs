//! Repositories module - database access for every entity
//!
//! Each repository owns a clone of the connection pool and exposes the queries
//! of one entity. Queries are checked at runtime (`query_as::<_, T>`) against
//! the schema in `migrations/`. Multi-row writes run inside one transaction.

pub mod conversation;
pub mod message;
pub mod participant;
pub mod traits;
pub mod user;

// Re-export traits for easier import
pub use traits::{Create, Read};

pub use conversation::ConversationRepository;
pub use message::MessageRepository;
pub use participant::ParticipantRepository;
pub use user::UserRepository;

/// New primary key for any table.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
