//! In-process publish/subscribe of conversation and message events

pub mod broker;
pub mod filters;

pub use broker::{Event, PubSub, Topic};
