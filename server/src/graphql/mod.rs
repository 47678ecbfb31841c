//! GraphQL schema: queries, mutations and subscriptions over the conversation
//! store, served on `/graphql` and `/graphql/subscriptions`.

use crate::core::AppState;
use async_graphql::{Schema, extensions};
use std::sync::Arc;

pub mod ext;
pub mod guards;
pub mod handlers;
pub mod models;
pub mod mutations;
pub mod queries;
pub mod scalars;
pub mod subscriptions;

pub type AppSchema = Schema<queries::Query, mutations::Mutation, subscriptions::Subscription>;

pub fn schema(state: Arc<AppState>) -> AppSchema {
    Schema::build(
        queries::Query::default(),
        mutations::Mutation::default(),
        subscriptions::Subscription::default(),
    )
    .data(state)
    .extension(extensions::Analyzer)
    .extension(extensions::Tracing)
    .limit_complexity(200)
    .limit_depth(12)
    .finish()
}
