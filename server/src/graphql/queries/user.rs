use crate::core::{GqlResult, ResultExt};
use crate::graphql::ext::ContextExt;
use crate::graphql::models::User;
use crate::repositories::Read;
use async_graphql::{Context, Object};

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// Users whose username contains `username` (case-insensitive), excluding the caller.
    async fn search_users(&self, ctx: &Context<'_>, username: String) -> GqlResult<Vec<User>> {
        let session = ctx.require_session()?;
        let users = ctx
            .state()
            .user
            .search_by_username(&username, &session.user_id)
            .await?;

        Ok(users.into_iter().map(Into::into).collect())
    }

    /// The signed-in user, as currently stored.
    async fn get_current_user(&self, ctx: &Context<'_>) -> GqlResult<Option<User>> {
        let session = ctx.require_session()?;
        let user = ctx
            .state()
            .user
            .read(&session.user_id)
            .await
            .map_err_gql("failed to load current user")?;

        Ok(user.map(Into::into))
    }
}
