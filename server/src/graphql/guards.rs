use crate::core::error::CONVERSATION_NOT_FOUND;
use crate::core::{AppState, GqlError, GqlResult};
use crate::entities::ConversationPopulated;
use crate::repositories::Read;
use crate::services::conversations::is_participant;

/// Loads a conversation the caller takes part in.
/// Missing conversation: `Conversation Not Found`. Not a participant: `Not authorized`.
pub async fn participant_guard(
    state: &AppState,
    conversation_id: &str,
    user_id: &str,
) -> GqlResult<ConversationPopulated> {
    let Some(conversation) = state.conversation.find_populated(conversation_id).await? else {
        return Err(GqlError::NotFound(CONVERSATION_NOT_FOUND).into());
    };

    if !is_participant(&conversation.participants, user_id) {
        return Err(GqlError::NotAuthorized.into());
    }

    Ok(conversation)
}

/// Same checks as [`participant_guard`] without loading the populated view.
pub async fn membership_guard(
    state: &AppState,
    conversation_id: &str,
    user_id: &str,
) -> GqlResult<()> {
    if state.conversation.read(&conversation_id.to_string()).await?.is_none() {
        return Err(GqlError::NotFound(CONVERSATION_NOT_FOUND).into());
    }

    let membership = (conversation_id.to_string(), user_id.to_string());
    if state.participant.read(&membership).await?.is_none() {
        return Err(GqlError::NotAuthorized.into());
    }

    Ok(())
}
