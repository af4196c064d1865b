use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

#[cfg(test)]
pub mod mem;
pub mod pg;

pub use pg::PgStore;

/// Account row. The hash never leaves the server; `skip_serializing`
/// keeps it out of any response body built from this type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// To-do row, always owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Field set for inserting a to-do; ids and timestamps are assigned by
/// the store.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<OffsetDateTime>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    Duplicate,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence operations backing the API. Every to-do lookup is keyed
/// by `(id, owner)` together, never by id alone, so ownership scoping
/// cannot be forgotten at a call site.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn list_todos_by_owner(&self, owner: Uuid) -> Result<Vec<Todo>, StoreError>;
    async fn insert_todo(&self, owner: Uuid, new: NewTodo) -> Result<Todo, StoreError>;
    async fn find_todo(&self, id: Uuid, owner: Uuid) -> Result<Option<Todo>, StoreError>;
    /// Persist the given record over the stored row with the same
    /// `(id, user_id)`, refreshing `updated_at`. `None` if no such row.
    async fn update_todo(&self, todo: &Todo) -> Result<Option<Todo>, StoreError>;
    /// `true` if a row was deleted, `false` if nothing matched.
    async fn delete_todo(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError>;
}
