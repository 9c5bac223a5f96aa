//! Domain ports defining the edges of the hexagon.
//!
//! Driving ports ([`UserOperations`], [`TodoOperations`]) describe what the
//! inbound adapters may ask of the domain. Driven ports ([`UserStore`],
//! [`TodoStore`]) describe how the domain expects to interact with storage.
//! Each trait exposes strongly typed errors so adapters map their failures
//! into predictable variants.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error as ThisError;
use uuid::Uuid;

use super::error::Error;
use super::todo::Todo;
use super::user::User;

/// Column carrying a uniqueness constraint in the users table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    /// The `username` column.
    Username,
    /// The `email` column.
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username => f.write_str("Username"),
            Self::Email => f.write_str("Email"),
        }
    }
}

/// Errors surfaced by the storage adapters.
///
/// `UniqueViolation` and `MissingOwner` are the storage-level constraint
/// rejections; the services translate them into `Conflict` and
/// `InvalidReference` so a race past the friendly pre-check still produces
/// the same client-facing error.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum StoreError {
    /// Store connection could not be established or was lost.
    #[error("store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("store query failed: {message}")]
    Query { message: String },
    /// A uniqueness constraint rejected the write.
    #[error("{field} already exists: {value}")]
    UniqueViolation { field: UniqueField, value: String },
    /// The owning user referenced by a todo write does not exist.
    #[error("todo owner {user_id} does not exist")]
    MissingOwner { user_id: Uuid },
}

impl StoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Insert payload for a user row. The store assigns the identifier; the
/// service stamps both timestamps in the same unit of work as the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub username: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a todo row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodoRecord {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub user_id: Uuid,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persistence port for the users table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user, assigning its identifier. Fails with
    /// [`StoreError::UniqueViolation`] when username or email is taken.
    async fn insert_user(&self, record: NewUserRecord) -> Result<User, StoreError>;

    /// Fetch a user by identifier.
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Exact-match lookup by username.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Exact-match lookup by email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Case-insensitive substring search over display names.
    async fn search_users_by_name(&self, fragment: &str) -> Result<Vec<User>, StoreError>;

    /// Return the given page of users in creation order.
    async fn list_users(&self, page: u32, size: u32) -> Result<Vec<User>, StoreError>;

    /// Total number of users.
    async fn count_users(&self) -> Result<u64, StoreError>;

    /// Overwrite an existing user row. Fails with
    /// [`StoreError::UniqueViolation`] when the new username or email
    /// collides with a different user.
    async fn update_user(&self, user: &User) -> Result<(), StoreError>;

    /// Delete a user and every todo it owns in one atomic operation.
    /// Returns the number of todos removed, or `None` when the user did not
    /// exist.
    async fn delete_user_cascade(&self, id: Uuid) -> Result<Option<u64>, StoreError>;
}

/// Persistence port for the todos table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Insert a new todo, assigning its identifier. Fails with
    /// [`StoreError::MissingOwner`] when the owner reference is dangling.
    async fn insert_todo(&self, record: NewTodoRecord) -> Result<Todo, StoreError>;

    /// Fetch a todo by identifier.
    async fn find_todo(&self, id: Uuid) -> Result<Option<Todo>, StoreError>;

    /// Return the given page of todos in creation order.
    async fn list_todos(&self, page: u32, size: u32) -> Result<Vec<Todo>, StoreError>;

    /// Return every todo matching the given owner and completion filters,
    /// unsliced. Absent filters match everything.
    async fn find_todos(
        &self,
        user_id: Option<Uuid>,
        completed: Option<bool>,
    ) -> Result<Vec<Todo>, StoreError>;

    /// Total number of todos.
    async fn count_todos(&self) -> Result<u64, StoreError>;

    /// Count the todos owned by a user, optionally restricted by completion.
    async fn count_todos_for_user(
        &self,
        user_id: Uuid,
        completed: Option<bool>,
    ) -> Result<u64, StoreError>;

    /// Overwrite an existing todo row.
    async fn update_todo(&self, todo: &Todo) -> Result<(), StoreError>;

    /// Delete a todo. Returns whether a row was removed.
    async fn delete_todo(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Delete every completed todo owned by the user in one atomic
    /// operation, returning the number removed.
    async fn delete_completed_for_user(&self, user_id: Uuid) -> Result<u64, StoreError>;
}

/// Construction request for a new user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub name: String,
}

/// Partial update for a user; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Listing query for users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListQuery {
    pub page: u32,
    pub size: u32,
    /// Case-insensitive name fragment; when present, paging is bypassed and
    /// all matches are returned.
    pub search: Option<String>,
}

/// Users listing plus the pagination metadata echoed in response headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListing {
    pub users: Vec<User>,
    /// Unfiltered total row count.
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

/// Aggregate todo counts for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    pub user_id: Uuid,
    pub username: String,
    pub total_todos: u64,
    pub completed_todos: u64,
    pub pending_todos: u64,
}

/// Construction request for a new todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `false` when unspecified.
    pub completed: Option<bool>,
    pub user_id: Uuid,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update for a todo; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Listing query for todos. When either filter is present the full match
/// set is returned and `page`/`size` are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListQuery {
    pub page: u32,
    pub size: u32,
    pub user_id: Option<Uuid>,
    pub completed: Option<bool>,
}

/// External-facing todo shape with the owner resolved through the
/// ownership relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Owner identifier, absent when the owner row is missing.
    pub user_id: Option<Uuid>,
    /// Owner display name, absent when the owner row is missing.
    pub user_name: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Todos listing plus the pagination metadata echoed in response headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListing {
    pub todos: Vec<TodoView>,
    /// Unfiltered total row count.
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

/// Driving port for user repository logic.
#[async_trait]
pub trait UserOperations: Send + Sync {
    /// Create a user after checking username and email uniqueness.
    async fn create_user(&self, new_user: NewUser) -> Result<User, Error>;

    /// Fetch a user, failing with `NotFound` when absent.
    async fn get_user(&self, id: Uuid) -> Result<User, Error>;

    /// Exact-match lookup; an absent user is an empty result, not an error.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error>;

    /// Exact-match lookup; an absent user is an empty result, not an error.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    /// List users, either paged or filtered by a name search.
    async fn list_users(&self, query: UserListQuery) -> Result<UserListing, Error>;

    /// Apply a partial update, failing with `Conflict` when a provided
    /// username or email collides with a different user.
    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, Error>;

    /// Delete a user and cascade to its todos.
    async fn delete_user(&self, id: Uuid) -> Result<(), Error>;

    /// Aggregate todo counts for a user.
    async fn user_stats(&self, id: Uuid) -> Result<UserStats, Error>;
}

/// Driving port for todo repository logic.
#[async_trait]
pub trait TodoOperations: Send + Sync {
    /// Create a todo after verifying the owner exists.
    async fn create_todo(&self, new_todo: NewTodo) -> Result<TodoView, Error>;

    /// Fetch a todo, failing with `NotFound` when absent.
    async fn get_todo(&self, id: Uuid) -> Result<TodoView, Error>;

    /// List todos, either paged or filtered (unsliced) by owner and/or
    /// completion.
    async fn list_todos(&self, query: TodoListQuery) -> Result<TodoListing, Error>;

    /// List a user's todos, failing with `NotFound` when the user is absent.
    async fn list_todos_for_user(
        &self,
        user_id: Uuid,
        completed: Option<bool>,
    ) -> Result<Vec<TodoView>, Error>;

    /// Apply a partial update.
    async fn update_todo(&self, id: Uuid, patch: TodoPatch) -> Result<TodoView, Error>;

    /// Flip the completion flag.
    async fn toggle_todo(&self, id: Uuid) -> Result<TodoView, Error>;

    /// Delete a todo.
    async fn delete_todo(&self, id: Uuid) -> Result<(), Error>;

    /// Delete every completed todo owned by the user, returning the count.
    /// Zero matches is a success, not an error.
    async fn delete_completed_for_user(&self, user_id: Uuid) -> Result<u64, Error>;
}
