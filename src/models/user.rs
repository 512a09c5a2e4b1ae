//! Represents a row of the `users` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user record. The gateway only reads these; the table is managed elsewhere.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct User {
    /// Numeric primary key.
    pub id: i64,

    pub username: String,

    pub email: Option<String>,

    /// When the user row was created.
    pub created_at: DateTime<Utc>,
}
