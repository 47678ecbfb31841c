use async_graphql::MergedObject;

mod auth;
mod conversation;
mod message;
mod user;

/// The root mutation type.
#[derive(MergedObject, Default)]
pub struct Mutation(
    auth::AuthMutation,
    user::UserMutation,
    conversation::ConversationMutation,
    message::MessageMutation,
);
