use crate::core::auth::{cleared_session_cookie, encode_jwt, session_cookie};
use crate::core::error::{INVALID_CREDENTIALS, USERNAME_TAKEN};
use crate::core::{GqlError, GqlResult, ResultExt};
use crate::dtos::CreateUserDTO;
use crate::entities::User;
use crate::graphql::ext::ContextExt;
use crate::graphql::models::AuthPayload;
use crate::repositories::Create;
use async_graphql::{Context, Object};
use axum::http::header::SET_COOKIE;
use tracing::info;
use validator::Validate;

#[derive(Default)]
pub struct AuthMutation;

#[Object]
impl AuthMutation {
    /// Registers a new account and returns a token for it. No cookie is set:
    /// the client logs in afterwards.
    async fn sign_in(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> GqlResult<AuthPayload> {
        let state = ctx.state();
        let body = CreateUserDTO { username, password };
        body.validate()?;

        if state.user.find_by_username(&body.username).await?.is_some() {
            return Err(GqlError::Conflict(USERNAME_TAKEN).into());
        }

        let password_hash =
            User::hash_password(&body.password).map_err_gql("failed to hash password")?;

        let user = match state
            .user
            .create(&CreateUserDTO {
                username: body.username,
                password: password_hash,
            })
            .await
        {
            Ok(user) => user,
            // lost a race with a concurrent registration
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(GqlError::Conflict(USERNAME_TAKEN).into());
            }
            Err(e) => return Err(e.into()),
        };

        let token = encode_jwt(&user.username, &user.id, &state.jwt_secret, state.token_ttl_hours)
            .map_err_gql("failed to sign token")?;

        Ok(AuthPayload {
            token,
            user: user.into(),
        })
    }

    /// Verifies the credentials, sets the session cookie and returns the token.
    async fn login(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> GqlResult<AuthPayload> {
        let state = ctx.state();
        let invalid = || GqlError::InvalidInput {
            fields: vec!["username".to_string(), "password".to_string()],
            message: INVALID_CREDENTIALS.to_string(),
        };

        let Some(user) = state.user.find_by_username(&username).await? else {
            return Err(invalid().into());
        };

        if !user.verify_password(&password) {
            return Err(invalid().into());
        }

        let token = encode_jwt(&user.username, &user.id, &state.jwt_secret, state.token_ttl_hours)
            .map_err_gql("failed to sign token")?;

        ctx.insert_http_header(
            SET_COOKIE,
            session_cookie(&token, state.token_ttl_hours, state.secure_cookies),
        );
        info!(user_id = %user.id, "User logged in");

        Ok(AuthPayload {
            token,
            user: user.into(),
        })
    }

    /// Clears the session cookie. Always succeeds.
    async fn sign_out(&self, ctx: &Context<'_>) -> bool {
        ctx.insert_http_header(SET_COOKIE, cleared_session_cookie());
        true
    }
}
