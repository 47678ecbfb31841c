use async_graphql::ErrorExtensions;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::panic::Location;
use std::sync::Arc;

// ------------------------------------------------------------------ //
// HTTP errors (plain routes)
// ------------------------------------------------------------------ //

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

/// Failure of a non-GraphQL route, rendered as `{"error": ...}`.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: &'static str,
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "database check failed");
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "Database unavailable",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

// ------------------------------------------------------------------ //
// GraphQL errors
// ------------------------------------------------------------------ //

pub const NOT_AUTHORIZED: &str = "Not authorized";
pub const CONVERSATION_NOT_FOUND: &str = "Conversation Not Found";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const USERNAME_TAKEN: &str = "Username already taken. Try another";

pub type GqlResult<T, E = GqlErrorInterface> = std::result::Result<T, E>;

#[derive(Clone, Debug, thiserror::Error)]
pub enum GqlError {
    /// No session, or the session does not grant access.
    #[error("Not authorized")]
    NotAuthorized,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{message}")]
    InvalidInput {
        fields: Vec<String>,
        message: String,
    },
    #[error("{0}")]
    Conflict(&'static str),
    #[error("database error: {0}")]
    Database(Arc<sqlx::Error>),
    #[error("internal server error: {0}")]
    Internal(&'static str),
}

impl From<sqlx::Error> for GqlError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(Arc::new(err))
    }
}

impl From<validator::ValidationErrors> for GqlError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = err
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        Self::InvalidInput {
            fields,
            message: err.to_string(),
        }
    }
}

impl GqlError {
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            fields: vec![field.to_string()],
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GqlError::NotAuthorized => "NotAuthorized",
            GqlError::NotFound(_) => "NotFound",
            GqlError::InvalidInput { .. } => "InvalidInput",
            GqlError::Conflict(_) => "Conflict",
            GqlError::Database(_) => "Database",
            GqlError::Internal(_) => "Internal",
        }
    }

    /// Message shown to clients. Storage and internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            GqlError::Database(_) | GqlError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn fields(&self) -> Vec<String> {
        match self {
            GqlError::InvalidInput { fields, .. } => fields.clone(),
            _ => Vec::new(),
        }
    }
}

/// Carries the tracing span and caller location of a [`GqlError`] so the log
/// line points at the resolver that failed.
#[derive(Clone, Debug)]
pub struct GqlErrorInterface {
    error: GqlError,
    span: tracing::Span,
    location: &'static Location<'static>,
}

impl GqlErrorInterface {
    fn with_location(self, location: &'static Location<'static>) -> Self {
        Self { location, ..self }
    }

    pub fn error(&self) -> &GqlError {
        &self.error
    }
}

impl ErrorExtensions for GqlErrorInterface {
    fn extend(&self) -> async_graphql::Error {
        let err = async_graphql::Error::new(self.error.public_message()).extend_with(|_, e| {
            e.set("kind", self.error.kind());
            e.set("fields", self.error.fields());
        });

        match self.error {
            GqlError::Database(_) | GqlError::Internal(_) => {
                self.span.in_scope(|| {
                    tracing::error!(
                        error = %self.error,
                        location = %self.location,
                        "gql error: {}",
                        self.error
                    );
                });
            }
            _ => {
                self.span.in_scope(|| {
                    tracing::debug!(
                        error = %self.error,
                        location = %self.location,
                        "gql error: {}",
                        self.error
                    );
                });
            }
        }

        err
    }
}

impl<T> From<T> for GqlErrorInterface
where
    GqlError: From<T>,
{
    #[track_caller]
    fn from(value: T) -> Self {
        Self {
            error: GqlError::from(value),
            span: tracing::Span::current(),
            location: Location::caller(),
        }
    }
}

impl From<&'static str> for GqlErrorInterface {
    #[track_caller]
    fn from(msg: &'static str) -> Self {
        Self {
            error: GqlError::Internal(msg),
            span: tracing::Span::current(),
            location: Location::caller(),
        }
    }
}

impl From<GqlErrorInterface> for async_graphql::Error {
    fn from(err: GqlErrorInterface) -> Self {
        err.extend()
    }
}

pub trait ResultExt<T>: Sized {
    /// Replaces the error with `ctx`, logging the original at debug level.
    fn map_err_gql<C>(self, ctx: C) -> GqlResult<T>
    where
        GqlErrorInterface: From<C>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn map_err_gql<C>(self, ctx: C) -> GqlResult<T>
    where
        GqlErrorInterface: From<C>,
    {
        match self {
            Ok(v) => Ok(v),
            Err(source) => {
                tracing::debug!(source = ?source, "mapping error");
                Err(GqlErrorInterface::from(ctx).with_location(Location::caller()))
            }
        }
    }
}

impl<T> ResultExt<T> for Option<T> {
    #[track_caller]
    fn map_err_gql<C>(self, ctx: C) -> GqlResult<T>
    where
        GqlErrorInterface: From<C>,
    {
        match self {
            Some(v) => Ok(v),
            None => Err(GqlErrorInterface::from(ctx).with_location(Location::caller())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_reports_unavailable_database() {
        let response = AppError::from(sqlx::Error::PoolClosed).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_database_errors_are_masked() {
        let err = GqlError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), "Database");
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_not_authorized_message() {
        assert_eq!(GqlError::NotAuthorized.public_message(), "Not authorized");
    }

    #[test]
    fn test_extension_carries_kind() {
        let err: GqlErrorInterface = GqlError::NotFound(CONVERSATION_NOT_FOUND).into();
        let gql = err.extend();
        assert_eq!(gql.message, "Conversation Not Found");
        let kind = gql
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("kind"))
            .cloned();
        assert_eq!(kind, Some(async_graphql::Value::from("NotFound")));
    }

    #[test]
    fn test_option_map_err_gql() {
        let missing: Option<i32> = None;
        let err = missing.map_err_gql(GqlError::NotAuthorized).unwrap_err();
        assert!(matches!(err.error(), GqlError::NotAuthorized));
    }
}
