use async_graphql::MergedObject;

mod conversation;
mod message;
mod user;

/// The root query type.
#[derive(MergedObject, Default)]
pub struct Query(
    user::UserQuery,
    conversation::ConversationQuery,
    message::MessageQuery,
);
