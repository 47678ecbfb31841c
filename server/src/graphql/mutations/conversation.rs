use crate::core::error::CONVERSATION_NOT_FOUND;
use crate::core::{GqlError, GqlResult};
use crate::dtos::CreateConversationDTO;
use crate::graphql::ext::ContextExt;
use crate::graphql::guards::{membership_guard, participant_guard};
use crate::graphql::models::CreateConversationResponse;
use crate::pubsub::Event;
use crate::repositories::Create;
use crate::services::conversations::{diff_participants, normalize_participants, participant_rows};
use async_graphql::{Context, Object};
use std::collections::HashSet;
use tracing::info;

#[derive(Default)]
pub struct ConversationMutation;

/// Fails with an input error naming the first id that matches no user.
async fn ensure_users_exist(ctx: &Context<'_>, ids: &[String]) -> GqlResult<()> {
    let found: HashSet<String> = ctx
        .state()
        .user
        .find_many_by_ids(ids)
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect();

    match ids.iter().find(|id| !found.contains(*id)) {
        Some(unknown) => Err(GqlError::invalid_input(
            "participantIds",
            format!("Unknown user: {unknown}"),
        )
        .into()),
        None => Ok(()),
    }
}

#[Object]
impl ConversationMutation {
    /// Starts a conversation between the caller and `participant_ids`.
    async fn create_conversation(
        &self,
        ctx: &Context<'_>,
        participant_ids: Vec<String>,
    ) -> GqlResult<CreateConversationResponse> {
        let session = ctx.require_session()?;
        let state = ctx.state();

        let ids = normalize_participants(&session.user_id, &participant_ids);
        ensure_users_exist(ctx, &ids).await?;

        let conversation = state
            .conversation
            .create(&CreateConversationDTO {
                participants: participant_rows(&session.user_id, &ids),
            })
            .await?;

        let conversation_id = conversation.id().to_string();
        info!(%conversation_id, participants = ids.len(), "Conversation created");
        state.pubsub.publish(Event::ConversationCreated(conversation));

        Ok(CreateConversationResponse { conversation_id })
    }

    /// Marks the latest message as seen for `user_id`, which must be the caller.
    async fn mark_conversation_as_read(
        &self,
        ctx: &Context<'_>,
        user_id: String,
        conversation_id: String,
    ) -> GqlResult<bool> {
        let session = ctx.require_session()?;
        if session.user_id != user_id {
            return Err(GqlError::NotAuthorized.into());
        }

        let state = ctx.state();
        membership_guard(state, &conversation_id, &user_id).await?;
        state.participant.mark_as_read(&conversation_id, &user_id).await?;

        Ok(true)
    }

    async fn delete_conversation(&self, ctx: &Context<'_>, conversation_id: String) -> GqlResult<bool> {
        let session = ctx.require_session()?;
        let state = ctx.state();
        participant_guard(state, &conversation_id, &session.user_id).await?;

        // the snapshot is what subscribers use to decide who gets the event
        if let Some(snapshot) = state.conversation.delete_cascade(&conversation_id).await? {
            info!(%conversation_id, "Conversation deleted");
            state.pubsub.publish(Event::ConversationDeleted(snapshot));
        }

        Ok(true)
    }

    /// Replaces the participant set with `participant_ids`.
    async fn update_participants(
        &self,
        ctx: &Context<'_>,
        conversation_id: String,
        participant_ids: Vec<String>,
    ) -> GqlResult<bool> {
        let session = ctx.require_session()?;
        let state = ctx.state();
        let conversation = participant_guard(state, &conversation_id, &session.user_id).await?;

        let requested: Vec<String> = participant_ids
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        if requested.is_empty() {
            return Err(GqlError::invalid_input(
                "participantIds",
                "A conversation needs at least one participant",
            )
            .into());
        }

        let diff = diff_participants(&conversation.participant_ids(), &requested);
        ensure_users_exist(ctx, &diff.to_add).await?;

        let Some(updated) = state
            .conversation
            .update_participants(&conversation_id, &diff.to_add, &diff.to_remove)
            .await?
        else {
            return Err(GqlError::NotFound(CONVERSATION_NOT_FOUND).into());
        };

        info!(
            %conversation_id,
            added = diff.to_add.len(),
            removed = diff.to_remove.len(),
            "Participants updated"
        );
        state.pubsub.publish(Event::ConversationUpdated {
            conversation: updated,
            added_user_ids: diff.to_add,
            removed_user_ids: diff.to_remove,
        });

        Ok(true)
    }
}
