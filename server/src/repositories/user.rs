//! UserRepository - user accounts

use super::{Create, Read, new_id};
use crate::dtos::CreateUserDTO;
use crate::entities::{User, UserSummary};
use chrono::Utc;
use sqlx::{Error, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info, instrument};

/// Maximum number of users returned by a search.
pub const SEARCH_LIMIT: i64 = 50;

pub struct UserRepository {
    connection_pool: SqlitePool,
}

impl UserRepository {
    pub fn new(connection_pool: SqlitePool) -> UserRepository {
        Self { connection_pool }
    }

    /// Find user by exact username match (usernames are unique)
    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }

    /// Case-insensitive "contains" search on usernames, excluding the user `exclude_id`.
    /// LIKE wildcards in the fragment match literally.
    #[instrument(skip(self))]
    pub async fn search_by_username(
        &self,
        fragment: &str,
        exclude_id: &str,
    ) -> Result<Vec<UserSummary>, Error> {
        let pattern = format!("%{}%", escape_like(fragment));
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, username
            FROM users
            WHERE username LIKE ? ESCAPE '\'
              AND id <> ?
            ORDER BY username ASC
            LIMIT ?
            "#,
        )
        .bind(pattern)
        .bind(exclude_id)
        .bind(SEARCH_LIMIT)
        .fetch_all(&self.connection_pool)
        .await?;

        debug!("Search returned {} users", users.len());
        Ok(users)
    }

    /// Returns the users among `ids` that exist. Order is not guaranteed.
    #[instrument(skip(self), fields(count = ids.len()))]
    pub async fn find_many_by_ids(&self, ids: &[String]) -> Result<Vec<UserSummary>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder = QueryBuilder::<Sqlite>::new("SELECT id, username FROM users WHERE id IN (");
        let mut separated = query_builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        query_builder
            .build_query_as::<UserSummary>()
            .fetch_all(&self.connection_pool)
            .await
    }

    /// Renames a user, returning the updated record (None if the user does not exist)
    #[instrument(skip(self))]
    pub async fn update_username(&self, id: &str, username: &str) -> Result<Option<User>, Error> {
        let result = sqlx::query("UPDATE users SET username = ? WHERE id = ?")
            .bind(username)
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!("No user to rename");
            return Ok(None);
        }

        info!("Username updated");
        self.read(&id.to_string()).await
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    /// `data.password` must already be hashed.
    #[instrument(skip(self, data), fields(username = %data.username))]
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        let user = User {
            id: new_id(),
            username: data.username.clone(),
            password: data.password.clone(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO users (id, username, password, created_at) VALUES (?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.password)
            .bind(user.created_at)
            .execute(&self.connection_pool)
            .await?;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }
}

impl Read<User, String> for UserRepository {
    #[instrument(skip(self))]
    async fn read(&self, id: &String) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>("SELECT id, username, password, created_at FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
