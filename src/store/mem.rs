use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{NewTodo, Store, StoreError, Todo, User};

/// In-memory [`Store`] with the same observable contract as Postgres,
/// used to drive the router in tests without a database.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    todos: Vec<Todo>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == email) {
            return Err(StoreError::Duplicate);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn list_todos_by_owner(&self, owner: Uuid) -> Result<Vec<Todo>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut todos: Vec<Todo> = inner
            .todos
            .iter()
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect();
        todos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(todos)
    }

    async fn insert_todo(&self, owner: Uuid, new: NewTodo) -> Result<Todo, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let now = OffsetDateTime::now_utc();
        let todo = Todo {
            id: Uuid::new_v4(),
            user_id: owner,
            title: new.title,
            description: new.description,
            completed: new.completed,
            due_date: new.due_date,
            created_at: now,
            updated_at: now,
        };
        inner.todos.push(todo.clone());
        Ok(todo)
    }

    async fn find_todo(&self, id: Uuid, owner: Uuid) -> Result<Option<Todo>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .todos
            .iter()
            .find(|t| t.id == id && t.user_id == owner)
            .cloned())
    }

    async fn update_todo(&self, todo: &Todo) -> Result<Option<Todo>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner
            .todos
            .iter_mut()
            .find(|t| t.id == todo.id && t.user_id == todo.user_id)
        {
            Some(slot) => {
                let mut updated = todo.clone();
                updated.updated_at = OffsetDateTime::now_utc();
                *slot = updated.clone();
                Ok(Some(updated))
            }
            None => Ok(None),
        }
    }

    async fn delete_todo(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.todos.len();
        inner.todos.retain(|t| !(t.id == id && t.user_id == owner));
        Ok(inner.todos.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_todo(title: &str) -> NewTodo {
        NewTodo {
            title: title.to_string(),
            description: None,
            completed: false,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemStore::new();
        store
            .insert_user("alice@test.com", "hash")
            .await
            .expect("first insert succeeds");
        let result = store.insert_user("alice@test.com", "other").await;
        assert!(matches!(result, Err(StoreError::Duplicate)));
    }

    #[tokio::test]
    async fn todo_lookups_are_owner_scoped() {
        let store = MemStore::new();
        let alice = store.insert_user("alice@test.com", "h").await.unwrap();
        let bob = store.insert_user("bob@test.com", "h").await.unwrap();
        let todo = store.insert_todo(alice.id, new_todo("mine")).await.unwrap();

        assert!(store.find_todo(todo.id, bob.id).await.unwrap().is_none());
        assert!(!store.delete_todo(todo.id, bob.id).await.unwrap());
        assert!(store.find_todo(todo.id, alice.id).await.unwrap().is_some());
        assert!(store.list_todos_by_owner(bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_preserves_insertion_order() {
        let store = MemStore::new();
        let alice = store.insert_user("alice@test.com", "h").await.unwrap();
        for title in ["first", "second", "third"] {
            store.insert_todo(alice.id, new_todo(title)).await.unwrap();
        }
        let titles: Vec<String> = store
            .list_todos_by_owner(alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn update_misses_foreign_rows() {
        let store = MemStore::new();
        let alice = store.insert_user("alice@test.com", "h").await.unwrap();
        let bob = store.insert_user("bob@test.com", "h").await.unwrap();
        let mut todo = store.insert_todo(alice.id, new_todo("mine")).await.unwrap();
        todo.user_id = bob.id;
        todo.title = "stolen".to_string();

        assert!(store.update_todo(&todo).await.unwrap().is_none());
        let kept = store.find_todo(todo.id, alice.id).await.unwrap().unwrap();
        assert_eq!(kept.title, "mine");
    }
}
