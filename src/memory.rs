use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    error::{StoreError, StoreResult, UniqueField},
    thoughts::{
        repo::ThoughtStore,
        repo_types::{message_len_ok, NewThought, Thought, MESSAGE_MAX_CHARS, MESSAGE_MIN_CHARS},
    },
};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    thoughts: Vec<Thought>,
}

/// In-process store for development and tests. Every call takes the lock exactly once,
/// so each trait method is one atomic unit of work like a single document operation.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Inner) -> StoreResult<T>,
    {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| StoreError::Backend(anyhow::anyhow!("memory store lock poisoned: {e}")))?;
        f(&mut inner)
    }
}

fn length_violation() -> StoreError {
    StoreError::Constraint(format!(
        "message must be between {MESSAGE_MIN_CHARS} and {MESSAGE_MAX_CHARS} characters"
    ))
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        self.with_inner(|inner| {
            for existing in &inner.users {
                if existing.username == user.username {
                    return Err(StoreError::Duplicate(UniqueField::Username));
                }
                if user.email.is_some() && existing.email == user.email {
                    return Err(StoreError::Duplicate(UniqueField::Email));
                }
                if existing.access_token == user.access_token {
                    return Err(StoreError::Duplicate(UniqueField::AccessToken));
                }
            }
            let created = User {
                id: Uuid::new_v4(),
                username: user.username,
                email: user.email,
                password_hash: user.password_hash,
                access_token: user.access_token,
                created_at: OffsetDateTime::now_utc(),
            };
            inner.users.push(created.clone());
            Ok(created)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.with_inner(|inner| Ok(inner.users.iter().find(|u| u.id == id).cloned()))
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.with_inner(|inner| {
            Ok(inner.users.iter().find(|u| u.username == username).cloned())
        })
    }

    async fn find_by_token(&self, token: &str) -> StoreResult<Option<User>> {
        self.with_inner(|inner| {
            Ok(inner.users.iter().find(|u| u.access_token == token).cloned())
        })
    }
}

#[async_trait]
impl ThoughtStore for MemoryStore {
    async fn insert(&self, thought: NewThought) -> StoreResult<Thought> {
        if !message_len_ok(&thought.message) {
            return Err(length_violation());
        }
        self.with_inner(|inner| {
            let created = Thought {
                id: Uuid::new_v4(),
                message: thought.message,
                hearts: 0,
                created_at: OffsetDateTime::now_utc(),
                created_by: thought.created_by,
            };
            inner.thoughts.push(created.clone());
            Ok(created)
        })
    }

    async fn list(&self) -> StoreResult<Vec<Thought>> {
        self.with_inner(|inner| Ok(inner.thoughts.clone()))
    }

    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Thought>> {
        self.with_inner(|inner| {
            Ok(inner
                .thoughts
                .iter()
                .filter(|t| t.created_by == Some(owner))
                .cloned()
                .collect())
        })
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner: Uuid,
        message: &str,
    ) -> StoreResult<Option<Thought>> {
        if !message_len_ok(message) {
            return Err(length_violation());
        }
        self.with_inner(|inner| {
            let found = inner
                .thoughts
                .iter_mut()
                .find(|t| t.id == id && t.created_by == Some(owner));
            Ok(found.map(|t| {
                t.message = message.to_string();
                t.clone()
            }))
        })
    }

    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<Thought>> {
        self.with_inner(|inner| {
            let pos = inner
                .thoughts
                .iter()
                .position(|t| t.id == id && t.created_by == Some(owner));
            Ok(pos.map(|i| inner.thoughts.remove(i)))
        })
    }

    async fn increment_hearts(&self, id: Uuid) -> StoreResult<Option<Thought>> {
        self.with_inner(|inner| {
            Ok(inner.thoughts.iter_mut().find(|t| t.id == id).map(|t| {
                t.hearts += 1;
                t.clone()
            }))
        })
    }
}
