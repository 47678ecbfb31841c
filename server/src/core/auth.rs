//! Token based sessions.
//!
//! A session is whatever a valid JWT says it is: the token is looked up in the
//! `token` cookie first and in the `Authorization: Bearer` header second.
//! Invalid tokens never fail a request on their own; they only leave the
//! request without a session, and resolvers that need one reject it.

use axum::http::{HeaderMap, header};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

pub const SESSION_COOKIE: &str = "token";

// struct encoding the content of the jwt token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: String,
    pub username: String,
}

/// The authenticated caller of a request or subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub username: String,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.id,
            username: claims.username,
        }
    }
}

#[instrument(skip(secret), fields(username = %username, id = %id))]
pub fn encode_jwt(
    username: &str,
    id: &str,
    secret: &str,
    ttl_hours: i64,
) -> jsonwebtoken::errors::Result<String> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let exp = (now + Duration::hours(ttl_hours)).timestamp() as usize;
    let iat = now.timestamp() as usize;
    let claim = Claims {
        iat,
        exp,
        username: username.to_string(),
        id: id.to_string(),
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> jsonwebtoken::errors::Result<TokenData<Claims>> {
    decode(
        jwt_token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
}

/// Turns a raw token into a session, logging and discarding invalid ones.
pub fn session_from_token(token: &str, secret: &str) -> Option<Session> {
    match decode_jwt(token, secret) {
        Ok(data) => {
            debug!(user_id = %data.claims.id, "Session resolved from token");
            Some(Session::from(data.claims))
        }
        Err(e) => {
            warn!("Auth failed: {}", e);
            None
        }
    }
}

/// Extracts the bearer token of an `Authorization` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

/// Finds the session token of an HTTP request: cookie first, bearer header second.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookie_token = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| parse_cookie(value).remove(SESSION_COOKIE));
    if cookie_token.is_some() {
        return cookie_token;
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string)
}

pub fn session_from_headers(headers: &HeaderMap, secret: &str) -> Option<Session> {
    token_from_headers(headers).and_then(|token| session_from_token(&token, secret))
}

/// Finds the session token sent in a `connection_init` payload.
/// Accepts `authToken`, `token` or an `Authorization` bearer value.
pub fn token_from_connection_params(params: &serde_json::Value) -> Option<String> {
    let field = |name: &str| params.get(name).and_then(|v| v.as_str());

    field("authToken")
        .or_else(|| field("token"))
        .map(str::to_string)
        .or_else(|| {
            field("Authorization")
                .or_else(|| field("authorization"))
                .and_then(bearer_token)
                .map(str::to_string)
        })
}

/// Parses a `Cookie` header into name/value pairs. Values are percent-decoded.
pub fn parse_cookie(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), percent_decode(value.trim())))
        })
        .collect()
}

fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = decoded {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// `Set-Cookie` value carrying a fresh session token.
pub fn session_cookie(token: &str, ttl_hours: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl_hours * 60 * 60
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn cleared_session_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}
