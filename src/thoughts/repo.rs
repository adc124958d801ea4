use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::classify,
    error::StoreResult,
    thoughts::repo_types::{NewThought, Thought},
};

/// Thought store contract. Every method is a single atomic store operation; the
/// `*_owned` methods match on id and owner together.
#[async_trait]
pub trait ThoughtStore: Send + Sync {
    async fn insert(&self, thought: NewThought) -> StoreResult<Thought>;
    async fn list(&self) -> StoreResult<Vec<Thought>>;
    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Thought>>;
    async fn update_owned(&self, id: Uuid, owner: Uuid, message: &str)
        -> StoreResult<Option<Thought>>;
    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<Thought>>;
    /// Adds one heart in place. Never read-modify-write.
    async fn increment_hearts(&self, id: Uuid) -> StoreResult<Option<Thought>>;
}

#[derive(Clone)]
pub struct PgThoughtStore {
    db: PgPool,
}

impl PgThoughtStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ThoughtStore for PgThoughtStore {
    async fn insert(&self, thought: NewThought) -> StoreResult<Thought> {
        sqlx::query_as::<_, Thought>(
            r#"
            INSERT INTO thoughts (message, created_by)
            VALUES ($1, $2)
            RETURNING id, message, hearts, created_at, created_by
            "#,
        )
        .bind(&thought.message)
        .bind(thought.created_by)
        .fetch_one(&self.db)
        .await
        .map_err(|e| classify(e, "insert thought"))
    }

    async fn list(&self) -> StoreResult<Vec<Thought>> {
        sqlx::query_as::<_, Thought>(
            r#"
            SELECT id, message, hearts, created_at, created_by
            FROM thoughts
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| classify(e, "list thoughts"))
    }

    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Thought>> {
        sqlx::query_as::<_, Thought>(
            r#"
            SELECT id, message, hearts, created_at, created_by
            FROM thoughts
            WHERE created_by = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await
        .map_err(|e| classify(e, "list thoughts by owner"))
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner: Uuid,
        message: &str,
    ) -> StoreResult<Option<Thought>> {
        sqlx::query_as::<_, Thought>(
            r#"
            UPDATE thoughts
               SET message = $3
             WHERE id = $1 AND created_by = $2
            RETURNING id, message, hearts, created_at, created_by
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(message)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| classify(e, "update thought"))
    }

    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<Thought>> {
        sqlx::query_as::<_, Thought>(
            r#"
            DELETE FROM thoughts
             WHERE id = $1 AND created_by = $2
            RETURNING id, message, hearts, created_at, created_by
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| classify(e, "delete thought"))
    }

    async fn increment_hearts(&self, id: Uuid) -> StoreResult<Option<Thought>> {
        sqlx::query_as::<_, Thought>(
            r#"
            UPDATE thoughts
               SET hearts = hearts + 1
             WHERE id = $1
            RETURNING id, message, hearts, created_at, created_by
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| classify(e, "increment hearts"))
    }
}
