//! Application state shared by the router, the GraphQL schema and the
//! subscription streams.

use crate::pubsub::PubSub;
use crate::repositories::{
    ConversationRepository, MessageRepository, ParticipantRepository, UserRepository,
};
use sqlx::SqlitePool;

pub struct AppState {
    pub user: UserRepository,
    pub conversation: ConversationRepository,
    pub participant: ParticipantRepository,
    pub msg: MessageRepository,

    /// Fan-out of conversation and message events to live subscriptions
    pub pubsub: PubSub,

    /// Secret key for signing JWT tokens
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// Adds `Secure` to the session cookie (production only)
    pub secure_cookies: bool,

    pool: SqlitePool,
}

impl AppState {
    /// Builds every repository on top of the shared pool.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool
    /// * `jwt_secret` - key used to sign and verify tokens
    /// * `token_ttl_hours` - lifetime of issued tokens and cookies
    /// * `pubsub_capacity` - per-topic broadcast buffer
    pub fn new(
        pool: SqlitePool,
        jwt_secret: String,
        token_ttl_hours: i64,
        pubsub_capacity: usize,
    ) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            conversation: ConversationRepository::new(pool.clone()),
            participant: ParticipantRepository::new(pool.clone()),
            msg: MessageRepository::new(pool.clone()),
            pubsub: PubSub::new(pubsub_capacity),
            jwt_secret,
            token_ttl_hours,
            secure_cookies: false,
            pool,
        }
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
