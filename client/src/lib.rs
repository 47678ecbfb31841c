//! Client library for the conversation server
//!
//! - [`operations`]: the GraphQL documents the client sends
//! - [`models`]: response payloads
//! - [`transport`]: HTTP execution and `graphql-transport-ws` subscriptions
//! - [`cache`]: how live events are folded into the local conversation list
//!   and message threads
//! - [`compose`] and [`format`]: message input and timestamp display helpers

pub mod cache;
pub mod compose;
pub mod error;
pub mod format;
pub mod models;
pub mod operations;
pub mod transport;

pub use cache::{ConversationCache, MessageThread};
pub use error::ClientError;
pub use transport::{HttpClient, subscribe};
