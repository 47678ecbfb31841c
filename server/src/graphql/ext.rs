use crate::core::{AppState, GqlError, GqlResult, Session};
use async_graphql::Context;
use std::sync::Arc;

pub trait ContextExt {
    fn state(&self) -> &Arc<AppState>;
    fn session(&self) -> Option<&Session>;
    /// The caller's session, or `Not authorized`.
    fn require_session(&self) -> GqlResult<&Session>;
}

impl ContextExt for Context<'_> {
    fn state(&self) -> &Arc<AppState> {
        self.data_unchecked()
    }

    fn session(&self) -> Option<&Session> {
        self.data_opt::<Session>()
    }

    #[track_caller]
    fn require_session(&self) -> GqlResult<&Session> {
        match self.session() {
            Some(session) => Ok(session),
            None => Err(GqlError::NotAuthorized.into()),
        }
    }
}
