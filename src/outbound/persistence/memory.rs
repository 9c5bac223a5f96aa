//! In-memory implementation of the storage ports.
//!
//! Both tables live behind one `RwLock` so multi-row mutations (cascade
//! delete, bulk completed-todo removal) observe and mutate a single
//! consistent snapshot. A poisoned lock is reported as a connection
//! failure rather than propagating the panic.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{
    NewTodoRecord, NewUserRecord, StoreError, TodoStore, UniqueField, UserStore,
};
use crate::domain::{Todo, User};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    todos: HashMap<Uuid, Todo>,
}

/// Process-local store backing both the users and todos ports.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::connection("store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::connection("store lock poisoned"))
    }
}

/// Creation order: insertion stamp first, identifier as the tiebreaker so
/// rows created in the same instant still list deterministically.
fn sorted_users(users: impl Iterator<Item = User>) -> Vec<User> {
    let mut rows: Vec<User> = users.collect();
    rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    rows
}

fn sorted_todos(todos: impl Iterator<Item = Todo>) -> Vec<Todo> {
    let mut rows: Vec<Todo> = todos.collect();
    rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    rows
}

fn page_slice<T>(rows: Vec<T>, page: u32, size: u32) -> Vec<T> {
    let offset = page as usize * size as usize;
    rows.into_iter().skip(offset).take(size as usize).collect()
}

fn check_user_unique(
    tables: &Tables,
    username: &str,
    email: &str,
    exclude: Option<Uuid>,
) -> Result<(), StoreError> {
    let others = tables
        .users
        .values()
        .filter(|user| exclude != Some(user.id));
    for user in others {
        if user.username == username {
            return Err(StoreError::UniqueViolation {
                field: UniqueField::Username,
                value: username.to_owned(),
            });
        }
        if user.email == email {
            return Err(StoreError::UniqueViolation {
                field: UniqueField::Email,
                value: email.to_owned(),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, record: NewUserRecord) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        check_user_unique(&tables, &record.username, &record.email, None)?;

        let user = User {
            id: Uuid::new_v4(),
            username: record.username,
            email: record.email,
            name: record.name,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn search_users_by_name(&self, fragment: &str) -> Result<Vec<User>, StoreError> {
        let needle = fragment.to_lowercase();
        let tables = self.read()?;
        Ok(sorted_users(
            tables
                .users
                .values()
                .filter(|user| user.name.to_lowercase().contains(&needle))
                .cloned(),
        ))
    }

    async fn list_users(&self, page: u32, size: u32) -> Result<Vec<User>, StoreError> {
        let tables = self.read()?;
        let rows = sorted_users(tables.users.values().cloned());
        Ok(page_slice(rows, page, size))
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.users.len() as u64)
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&user.id) {
            return Err(StoreError::query(format!("no user row for {}", user.id)));
        }
        check_user_unique(&tables, &user.username, &user.email, Some(user.id))?;
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_user_cascade(&self, id: Uuid) -> Result<Option<u64>, StoreError> {
        let mut tables = self.write()?;
        if tables.users.remove(&id).is_none() {
            return Ok(None);
        }
        let before = tables.todos.len();
        tables.todos.retain(|_, todo| todo.user_id != id);
        Ok(Some((before - tables.todos.len()) as u64))
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert_todo(&self, record: NewTodoRecord) -> Result<Todo, StoreError> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&record.user_id) {
            return Err(StoreError::MissingOwner {
                user_id: record.user_id,
            });
        }

        let todo = Todo {
            id: Uuid::new_v4(),
            title: record.title,
            description: record.description,
            completed: record.completed,
            user_id: record.user_id,
            due_date: record.due_date,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        tables.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn find_todo(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        Ok(self.read()?.todos.get(&id).cloned())
    }

    async fn list_todos(&self, page: u32, size: u32) -> Result<Vec<Todo>, StoreError> {
        let tables = self.read()?;
        let rows = sorted_todos(tables.todos.values().cloned());
        Ok(page_slice(rows, page, size))
    }

    async fn find_todos(
        &self,
        user_id: Option<Uuid>,
        completed: Option<bool>,
    ) -> Result<Vec<Todo>, StoreError> {
        let tables = self.read()?;
        Ok(sorted_todos(
            tables
                .todos
                .values()
                .filter(|todo| user_id.is_none_or(|owner| todo.user_id == owner))
                .filter(|todo| completed.is_none_or(|flag| todo.completed == flag))
                .cloned(),
        ))
    }

    async fn count_todos(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.todos.len() as u64)
    }

    async fn count_todos_for_user(
        &self,
        user_id: Uuid,
        completed: Option<bool>,
    ) -> Result<u64, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .todos
            .values()
            .filter(|todo| todo.user_id == user_id)
            .filter(|todo| completed.is_none_or(|flag| todo.completed == flag))
            .count() as u64)
    }

    async fn update_todo(&self, todo: &Todo) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if !tables.todos.contains_key(&todo.id) {
            return Err(StoreError::query(format!("no todo row for {}", todo.id)));
        }
        tables.todos.insert(todo.id, todo.clone());
        Ok(())
    }

    async fn delete_todo(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.write()?.todos.remove(&id).is_some())
    }

    async fn delete_completed_for_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut tables = self.write()?;
        let before = tables.todos.len();
        tables
            .todos
            .retain(|_, todo| !(todo.user_id == user_id && todo.completed));
        Ok((before - tables.todos.len()) as u64)
    }
}
