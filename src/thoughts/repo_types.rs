use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const MESSAGE_MIN_CHARS: usize = 5;
pub const MESSAGE_MAX_CHARS: usize = 140;

/// Length rule shared by the service and the stores, counted in characters.
pub fn message_len_ok(message: &str) -> bool {
    (MESSAGE_MIN_CHARS..=MESSAGE_MAX_CHARS).contains(&message.chars().count())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Thought {
    pub id: Uuid,
    pub message: String,
    pub hearts: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Weak reference to the author. `None` for thoughts posted without an owner.
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewThought {
    pub message: String,
    pub created_by: Option<Uuid>,
}
