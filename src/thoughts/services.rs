use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::AppError,
    thoughts::{
        repo::ThoughtStore,
        repo_types::{message_len_ok, NewThought, Thought, MESSAGE_MAX_CHARS, MESSAGE_MIN_CHARS},
    },
};

const NOT_FOUND_OR_NOT_OWNED: &str = "Thought not found or not owned by you";

fn validate_message(message: &str) -> Result<(), AppError> {
    if !message_len_ok(message) {
        return Err(AppError::validation(format!(
            "message must be between {MESSAGE_MIN_CHARS} and {MESSAGE_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

/// Persists a new thought with zero hearts. `owner` is `None` only for thoughts
/// posted without an authenticated author.
pub async fn create(
    store: &dyn ThoughtStore,
    message: &str,
    owner: Option<Uuid>,
) -> Result<Thought, AppError> {
    validate_message(message)?;
    let thought = store
        .insert(NewThought {
            message: message.to_string(),
            created_by: owner,
        })
        .await?;
    info!(thought_id = %thought.id, owner = ?owner, "thought created");
    Ok(thought)
}

pub async fn list(store: &dyn ThoughtStore) -> Result<Vec<Thought>, AppError> {
    Ok(store.list().await?)
}

pub async fn list_by_owner(store: &dyn ThoughtStore, owner: Uuid) -> Result<Vec<Thought>, AppError> {
    Ok(store.list_by_owner(owner).await?)
}

/// Replaces the message of a thought owned by `requester`. Unknown ids and thoughts
/// owned by someone else produce the same `NotFound`.
pub async fn update(
    store: &dyn ThoughtStore,
    id: Uuid,
    new_message: &str,
    requester: Uuid,
) -> Result<Thought, AppError> {
    if new_message.trim().is_empty() {
        return Err(AppError::validation("newMessage is required to update the thought"));
    }
    validate_message(new_message)?;

    match store.update_owned(id, requester, new_message).await? {
        Some(thought) => {
            info!(thought_id = %id, "thought updated");
            Ok(thought)
        }
        None => {
            debug!(thought_id = %id, requester = %requester, "update matched nothing");
            Err(AppError::NotFound(NOT_FOUND_OR_NOT_OWNED.into()))
        }
    }
}

/// Removes a thought owned by `requester`, with the same `NotFound` collapsing as
/// [`update`].
pub async fn delete(
    store: &dyn ThoughtStore,
    id: Uuid,
    requester: Uuid,
) -> Result<Thought, AppError> {
    match store.delete_owned(id, requester).await? {
        Some(thought) => {
            info!(thought_id = %id, "thought deleted");
            Ok(thought)
        }
        None => {
            debug!(thought_id = %id, requester = %requester, "delete matched nothing");
            Err(AppError::NotFound(NOT_FOUND_OR_NOT_OWNED.into()))
        }
    }
}

/// Adds one heart through the store's atomic increment. Open to any caller.
pub async fn like(store: &dyn ThoughtStore, id: Uuid) -> Result<Thought, AppError> {
    store
        .increment_hearts(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Thought not found".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn message_length_bounds() {
        let store = MemoryStore::new();
        let owner = Some(Uuid::new_v4());

        assert!(matches!(
            create(&store, "hi", owner).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            create(&store, "hiya", owner).await,
            Err(AppError::Validation(_))
        ));
        assert!(create(&store, "hello", owner).await.is_ok());
        assert!(create(&store, &"x".repeat(140), owner).await.is_ok());
        assert!(matches!(
            create(&store, &"x".repeat(141), owner).await,
            Err(AppError::Validation(_))
        ));
        // counted in characters, not bytes
        assert!(create(&store, &"é".repeat(140), owner).await.is_ok());
    }

    #[tokio::test]
    async fn created_thought_defaults() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let t = create(&store, "first thought", Some(owner)).await.unwrap();
        assert_eq!(t.hearts, 0);
        assert_eq!(t.created_by, Some(owner));

        let anon = create(&store, "nobody's thought", None).await.unwrap();
        assert_eq!(anon.created_by, None);
        assert_eq!(list(&store).await.unwrap(), vec![t.clone(), anon]);
        assert_eq!(list_by_owner(&store, owner).await.unwrap(), vec![t]);
    }

    #[tokio::test]
    async fn non_owner_cannot_update_or_delete() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let t = create(&store, "mine, all mine", Some(owner)).await.unwrap();
        let stranger = Uuid::new_v4();

        assert!(matches!(
            update(&store, t.id, "xxxxx", stranger).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            delete(&store, t.id, stranger).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(list(&store).await.unwrap(), vec![t.clone()]);

        // an unknown id looks exactly the same
        let unknown = update(&store, Uuid::new_v4(), "xxxxx", owner).await.unwrap_err();
        let foreign = update(&store, t.id, "xxxxx", stranger).await.unwrap_err();
        assert_eq!(unknown.to_string(), foreign.to_string());
    }

    #[tokio::test]
    async fn owner_update_touches_only_message() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let t = create(&store, "first draft", Some(owner)).await.unwrap();
        like(&store, t.id).await.unwrap();

        let edited = update(&store, t.id, "second draft", owner).await.unwrap();
        assert_eq!(edited.message, "second draft");
        assert_eq!(edited.hearts, 1);
        assert_eq!(edited.created_at, t.created_at);
        assert_eq!(edited.created_by, Some(owner));

        assert!(matches!(
            update(&store, t.id, "   ", owner).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn owner_delete_removes() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let t = create(&store, "short lived", Some(owner)).await.unwrap();
        assert_eq!(delete(&store, t.id, owner).await.unwrap(), t);
        assert!(list(&store).await.unwrap().is_empty());
        assert!(matches!(
            delete(&store, t.id, owner).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn like_unknown_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            like(&store, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_likes_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let t = create(store.as_ref(), "popular thought", None).await.unwrap();
        let id = t.id;

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { like(store.as_ref(), id).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let after = list(store.as_ref()).await.unwrap();
        assert_eq!(after[0].hearts, t.hearts + 100);
    }
}
