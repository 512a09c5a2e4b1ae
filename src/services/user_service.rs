//! Read-only access to the `users` table.

use crate::models::user::User;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// The two lookups the gateway exposes over users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every user, ordered by id.
    async fn find_all(&self) -> RepositoryResult<Vec<User>>;

    /// The user with exactly this id, or `None` on a miss.
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
}

#[derive(Clone)]
pub struct SqliteUserRepository {
    db: Arc<SqlitePool>,
}

impl SqliteUserRepository {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_all(&self) -> RepositoryResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, email, created_at FROM users ORDER BY id ASC",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(users)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(user)
    }
}
