use crate::core::error::{NOT_AUTHORIZED, USERNAME_TAKEN};
use crate::dtos::UpdateUsernameDTO;
use crate::graphql::ext::ContextExt;
use crate::graphql::models::CreateUsernameResponse;
use async_graphql::{Context, Object};
use tracing::{error, info};
use validator::Validate;

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    /// Renames the caller. Every failure is reported in the response `error`.
    async fn create_username(&self, ctx: &Context<'_>, username: String) -> CreateUsernameResponse {
        let Some(session) = ctx.session() else {
            return CreateUsernameResponse::failed(NOT_AUTHORIZED);
        };

        let body = UpdateUsernameDTO { username };
        if let Err(e) = body.validate() {
            return CreateUsernameResponse::failed(e.to_string());
        }

        let users = &ctx.state().user;
        match users.find_by_username(&body.username).await {
            Ok(Some(_)) => return CreateUsernameResponse::failed(USERNAME_TAKEN),
            Ok(None) => {}
            Err(e) => {
                error!("Failed to look up username: {e}");
                return CreateUsernameResponse::failed("Internal server error");
            }
        }

        match users.update_username(&session.user_id, &body.username).await {
            Ok(Some(_)) => {
                info!(user_id = %session.user_id, "Username changed");
                CreateUsernameResponse::ok()
            }
            Ok(None) => CreateUsernameResponse::failed("User not found"),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                CreateUsernameResponse::failed(USERNAME_TAKEN)
            }
            Err(e) => {
                error!("Failed to update username: {e}");
                CreateUsernameResponse::failed("Internal server error")
            }
        }
    }
}
