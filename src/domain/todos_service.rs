//! Todo repository logic.
//!
//! Implements the todo driving port over the storage ports: ownership
//! verification on create, filtered/paginated listing, partial updates,
//! completion toggling, and bulk deletion of a user's completed todos.
//! Owner id and name in the external view are resolved through the
//! ownership relation rather than stored alongside the todo.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::ports::{
    NewTodo, NewTodoRecord, TodoListQuery, TodoListing, TodoOperations, TodoPatch, TodoStore,
    TodoView, UserStore,
};
use super::{Error, Todo, User, map_store_error, next_stamp};

fn todo_not_found(id: Uuid) -> Error {
    Error::not_found(format!("Todo not found with id: {id}"))
}

fn user_not_found(id: Uuid) -> Error {
    Error::not_found(format!("User not found with id: {id}"))
}

fn view(todo: Todo, owner: Option<&User>) -> TodoView {
    TodoView {
        id: todo.id,
        title: todo.title,
        description: todo.description,
        completed: todo.completed,
        user_id: owner.map(|user| user.id),
        user_name: owner.map(|user| user.name.clone()),
        due_date: todo.due_date,
        created_at: todo.created_at,
        updated_at: todo.updated_at,
    }
}

/// Todo repository logic implementing [`TodoOperations`].
#[derive(Clone)]
pub struct TodoService<U, T> {
    users: Arc<U>,
    todos: Arc<T>,
}

impl<U, T> TodoService<U, T> {
    /// Create a new service over the user and todo storage ports.
    pub fn new(users: Arc<U>, todos: Arc<T>) -> Self {
        Self { users, todos }
    }
}

impl<U, T> TodoService<U, T>
where
    U: UserStore,
    T: TodoStore,
{
    /// Resolve owners for a batch of todos, looking each owner up once.
    async fn resolve_views(&self, todos: Vec<Todo>) -> Result<Vec<TodoView>, Error> {
        let mut owners: HashMap<Uuid, Option<User>> = HashMap::new();
        let mut views = Vec::with_capacity(todos.len());

        for todo in todos {
            if !owners.contains_key(&todo.user_id) {
                let owner = self
                    .users
                    .find_user(todo.user_id)
                    .await
                    .map_err(map_store_error)?;
                owners.insert(todo.user_id, owner);
            }
            let owner = owners.get(&todo.user_id).and_then(Option::as_ref);
            views.push(view(todo, owner));
        }

        Ok(views)
    }

    async fn resolve_view(&self, todo: Todo) -> Result<TodoView, Error> {
        let owner = self
            .users
            .find_user(todo.user_id)
            .await
            .map_err(map_store_error)?;
        Ok(view(todo, owner.as_ref()))
    }
}

#[async_trait]
impl<U, T> TodoOperations for TodoService<U, T>
where
    U: UserStore,
    T: TodoStore,
{
    async fn create_todo(&self, new_todo: NewTodo) -> Result<TodoView, Error> {
        // Friendly pre-check; the store's owner constraint remains the
        // authoritative guard under concurrency.
        let owner = self
            .users
            .find_user(new_todo.user_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| {
                Error::invalid_reference(format!("User not found with id: {}", new_todo.user_id))
            })?;

        let now = Utc::now();
        let record = NewTodoRecord {
            title: new_todo.title,
            description: new_todo.description,
            completed: new_todo.completed.unwrap_or(false),
            user_id: new_todo.user_id,
            due_date: new_todo.due_date,
            created_at: now,
            updated_at: now,
        };
        let todo = self
            .todos
            .insert_todo(record)
            .await
            .map_err(map_store_error)?;

        info!(todo_id = %todo.id, user_id = %todo.user_id, "todo created");
        Ok(view(todo, Some(&owner)))
    }

    async fn get_todo(&self, id: Uuid) -> Result<TodoView, Error> {
        let todo = self
            .todos
            .find_todo(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| todo_not_found(id))?;
        self.resolve_view(todo).await
    }

    async fn list_todos(&self, query: TodoListQuery) -> Result<TodoListing, Error> {
        // Either filter switches the listing to the full unsliced match set;
        // paging applies to the unfiltered listing only.
        let todos = if query.user_id.is_some() || query.completed.is_some() {
            self.todos
                .find_todos(query.user_id, query.completed)
                .await
                .map_err(map_store_error)?
        } else {
            self.todos
                .list_todos(query.page, query.size)
                .await
                .map_err(map_store_error)?
        };
        let total = self.todos.count_todos().await.map_err(map_store_error)?;

        Ok(TodoListing {
            todos: self.resolve_views(todos).await?,
            total,
            page: query.page,
            size: query.size,
        })
    }

    async fn list_todos_for_user(
        &self,
        user_id: Uuid,
        completed: Option<bool>,
    ) -> Result<Vec<TodoView>, Error> {
        if self
            .users
            .find_user(user_id)
            .await
            .map_err(map_store_error)?
            .is_none()
        {
            return Err(user_not_found(user_id));
        }

        let todos = self
            .todos
            .find_todos(Some(user_id), completed)
            .await
            .map_err(map_store_error)?;
        self.resolve_views(todos).await
    }

    async fn update_todo(&self, id: Uuid, patch: TodoPatch) -> Result<TodoView, Error> {
        let mut todo = self
            .todos
            .find_todo(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| todo_not_found(id))?;

        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(description) = patch.description {
            todo.description = Some(description);
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        if let Some(due_date) = patch.due_date {
            todo.due_date = Some(due_date);
        }

        todo.updated_at = next_stamp(todo.updated_at);
        self.todos
            .update_todo(&todo)
            .await
            .map_err(map_store_error)?;

        info!(todo_id = %todo.id, "todo updated");
        self.resolve_view(todo).await
    }

    async fn toggle_todo(&self, id: Uuid) -> Result<TodoView, Error> {
        let mut todo = self
            .todos
            .find_todo(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| todo_not_found(id))?;

        todo.completed = !todo.completed;
        todo.updated_at = next_stamp(todo.updated_at);
        self.todos
            .update_todo(&todo)
            .await
            .map_err(map_store_error)?;

        info!(todo_id = %todo.id, completed = todo.completed, "todo toggled");
        self.resolve_view(todo).await
    }

    async fn delete_todo(&self, id: Uuid) -> Result<(), Error> {
        let removed = self
            .todos
            .delete_todo(id)
            .await
            .map_err(map_store_error)?;
        if !removed {
            return Err(todo_not_found(id));
        }
        info!(todo_id = %id, "todo deleted");
        Ok(())
    }

    async fn delete_completed_for_user(&self, user_id: Uuid) -> Result<u64, Error> {
        if self
            .users
            .find_user(user_id)
            .await
            .map_err(map_store_error)?
            .is_none()
        {
            return Err(user_not_found(user_id));
        }

        let deleted = self
            .todos
            .delete_completed_for_user(user_id)
            .await
            .map_err(map_store_error)?;

        info!(user_id = %user_id, deleted, "completed todos deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
#[path = "todos_service_tests.rs"]
mod tests;
