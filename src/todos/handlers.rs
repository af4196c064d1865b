use axum::{
    extract::{Path, State},
    routing::{get, patch, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{ApiJson, AppError},
    state::AppState,
    store::NewTodo,
};

use super::dto::{CreateTodo, DeleteResponse, TodoPublic, ToggleComplete, UpdateTodo};

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/", get(list_todos).post(create_todo))
        .route("/todos/:id", put(update_todo).delete(delete_todo))
        .route("/todos/:id/complete", patch(toggle_complete))
}

/// The path id stays a `String` so a non-uuid value maps to the same
/// 422 as any other malformed input.
fn parse_todo_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid todo id".into()))
}

#[instrument(skip(state, user))]
pub async fn list_todos(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<TodoPublic>>, AppError> {
    let todos = state.store.list_todos_by_owner(user.id).await?;
    Ok(Json(todos.into_iter().map(TodoPublic::from).collect()))
}

#[instrument(skip(state, user, payload))]
pub async fn create_todo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<CreateTodo>,
) -> Result<Json<TodoPublic>, AppError> {
    let todo = state
        .store
        .insert_todo(
            user.id,
            NewTodo {
                title: payload.title,
                description: payload.description,
                completed: payload.completed,
                due_date: payload.due_date,
            },
        )
        .await?;

    info!(user_id = %user.id, todo_id = %todo.id, "todo created");
    Ok(Json(TodoPublic::from(todo)))
}

#[instrument(skip(state, user, payload))]
pub async fn update_todo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateTodo>,
) -> Result<Json<TodoPublic>, AppError> {
    let id = parse_todo_id(&id)?;
    let mut todo = state
        .store
        .find_todo(id, user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(title) = payload.title {
        todo.title = title;
    }
    if let Some(description) = payload.description {
        todo.description = description;
    }
    if let Some(completed) = payload.completed {
        todo.completed = completed;
    }
    if let Some(due_date) = payload.due_date {
        todo.due_date = due_date;
    }

    let todo = state
        .store
        .update_todo(&todo)
        .await?
        .ok_or(AppError::NotFound)?;
    info!(user_id = %user.id, todo_id = %todo.id, "todo updated");
    Ok(Json(TodoPublic::from(todo)))
}

#[instrument(skip(state, user, payload))]
pub async fn toggle_complete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ToggleComplete>,
) -> Result<Json<TodoPublic>, AppError> {
    let id = parse_todo_id(&id)?;
    let mut todo = state
        .store
        .find_todo(id, user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    todo.completed = payload.completed;

    let todo = state
        .store
        .update_todo(&todo)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(TodoPublic::from(todo)))
}

#[instrument(skip(state, user))]
pub async fn delete_todo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = parse_todo_id(&id)?;
    if !state.store.delete_todo(id, user.id).await? {
        return Err(AppError::NotFound);
    }

    info!(user_id = %user.id, todo_id = %id, "todo deleted");
    Ok(Json(DeleteResponse {
        message: "Todo deleted successfully".into(),
    }))
}
