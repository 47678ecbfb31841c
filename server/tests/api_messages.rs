//! Integration tests for messages: the `messages` query and `sendMessage`

mod common;

#[cfg(test)]
mod message_tests {
    use super::common::*;
    use convo_server::pubsub::{Event, Topic};
    use convo_server::repositories::Read;
    use futures_util::StreamExt;
    use serde_json::json;
    use sqlx::SqlitePool;

    const MESSAGES: &str = r#"query($id: String!) {
        messages(conversationId: $id) { id conversationId body createdAt sender { id username } }
    }"#;

    const SEND: &str = r#"mutation($id: String!, $body: String!) {
        sendMessage(conversationId: $id, body: $body)
    }"#;

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "conversations")))]
    async fn test_messages_oldest_first(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let alice = create_test_jwt("u-alice", "alice");

        let body = gql(&server, Some(&alice), MESSAGES, json!({ "id": "c-ab" })).await;
        let messages = body["data"]["messages"].as_array().expect("messages");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["body"], "hey alice");
        assert_eq!(messages[0]["sender"]["username"], "bob");
        assert_eq!(messages[1]["body"], "hi bob!");
        assert!(messages[0]["createdAt"].as_i64() < messages[1]["createdAt"].as_i64());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "conversations")))]
    async fn test_messages_access(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let charlie = create_test_jwt("u-charlie", "charlie");

        let body = gql(&server, Some(&charlie), MESSAGES, json!({ "id": "c-ab" })).await;
        assert_eq!(first_error(&body), Some("Not authorized"));

        let body = gql(&server, Some(&charlie), MESSAGES, json!({ "id": "c-nope" })).await;
        assert_eq!(first_error(&body), Some("Conversation Not Found"));

        let body = gql(&server, None, MESSAGES, json!({ "id": "c-ab" })).await;
        assert_eq!(first_error(&body), Some("Not authorized"));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "conversations")))]
    async fn test_send_message_updates_read_state(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());
        let sent = state.pubsub.subscribe(Topic::MessageSent);
        let updated = state.pubsub.subscribe(Topic::ConversationUpdated);
        tokio::pin!(sent, updated);

        let bob = create_test_jwt("u-bob", "bob");
        let body = gql(&server, Some(&bob), SEND, json!({ "id": "c-ab", "body": "  see you" })).await;
        assert_eq!(body["data"]["sendMessage"], true);

        let bob_row = state
            .participant
            .read(&("c-ab".to_string(), "u-bob".to_string()))
            .await?
            .expect("bob");
        let alice_row = state
            .participant
            .read(&("c-ab".to_string(), "u-alice".to_string()))
            .await?
            .expect("alice");
        assert!(bob_row.has_seen_latest_message);
        assert!(!alice_row.has_seen_latest_message);

        match sent.next().await.expect("message event").as_ref() {
            Event::MessageSent(message) => {
                assert_eq!(message.message.body, "  see you");
                assert_eq!(message.sender.username, "bob");
            }
            other => panic!("unexpected event {other:?}"),
        }
        match updated.next().await.expect("update event").as_ref() {
            Event::ConversationUpdated {
                conversation,
                added_user_ids,
                removed_user_ids,
            } => {
                assert!(added_user_ids.is_empty() && removed_user_ids.is_empty());
                let latest = conversation.latest_message.as_ref().expect("latest");
                assert_eq!(latest.message.body, "  see you");
            }
            other => panic!("unexpected event {other:?}"),
        }
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "conversations")))]
    async fn test_send_message_rejections(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());
        let alice = create_test_jwt("u-alice", "alice");
        let charlie = create_test_jwt("u-charlie", "charlie");

        let body = gql(&server, Some(&alice), SEND, json!({ "id": "c-ab", "body": " \n " })).await;
        assert_eq!(body["errors"][0]["extensions"]["kind"], "InvalidInput");

        let too_long = "x".repeat(5001);
        let body = gql(&server, Some(&alice), SEND, json!({ "id": "c-ab", "body": too_long })).await;
        assert_eq!(body["errors"][0]["extensions"]["kind"], "InvalidInput");

        let body = gql(&server, Some(&charlie), SEND, json!({ "id": "c-ab", "body": "hi" })).await;
        assert_eq!(first_error(&body), Some("Not authorized"));

        let body = gql(&server, Some(&alice), SEND, json!({ "id": "c-nope", "body": "hi" })).await;
        assert_eq!(first_error(&body), Some("Conversation Not Found"));

        assert_eq!(state.msg.find_many_by_conversation("c-ab").await?.len(), 2);
        Ok(())
    }
}
