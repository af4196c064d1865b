use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::Todo;

/// Request body for creating a to-do. Only `title` is required.
#[derive(Debug, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, deserialize_with = "time::serde::rfc3339::option::deserialize")]
    pub due_date: Option<OffsetDateTime>,
}

/// Merge-patch body for updates: an absent field leaves the stored
/// value untouched, while for the nullable fields an explicit `null`
/// clears it. The double `Option` keeps those two cases apart.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "double_option_rfc3339")]
    pub due_date: Option<Option<OffsetDateTime>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn double_option_rfc3339<'de, D>(
    deserializer: D,
) -> Result<Option<Option<OffsetDateTime>>, D::Error>
where
    D: Deserializer<'de>,
{
    time::serde::rfc3339::option::deserialize(deserializer).map(Some)
}

/// Request body for the completion toggle.
#[derive(Debug, Deserialize)]
pub struct ToggleComplete {
    pub completed: bool,
}

/// To-do as returned to its owner.
#[derive(Debug, Serialize)]
pub struct TodoPublic {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Todo> for TodoPublic {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            user_id: todo.user_id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            due_date: todo.due_date,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

/// Body returned after a successful delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}
