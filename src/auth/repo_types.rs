use std::fmt;

use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,                   // assigned by the store
    pub username: String,           // unique, trimmed
    pub email: Option<String>,      // unique among non-null values, lowercased
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 hash, not exposed in JSON
    #[serde(skip_serializing)]
    pub access_token: String,       // 64 hex chars, never rotated
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

// Keeps the hash and token out of logs and spans.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Validated fields for a user that has not been persisted yet.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub access_token: String,
}
