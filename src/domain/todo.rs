//! Todo entity.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A task owned by exactly one user.
///
/// ## Invariants
/// - `user_id` references an existing user at creation time; deleting the
///   owner cascades to its todos.
/// - `completed` defaults to `false` when unspecified at creation.
/// - `created_at` never changes; `updated_at` advances on every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    /// Opaque identifier assigned by the store on creation.
    pub id: Uuid,
    /// Required title, at most 200 characters.
    pub title: String,
    /// Optional description, at most 1000 characters.
    pub description: Option<String>,
    /// Completion flag.
    pub completed: bool,
    /// Owning user reference.
    pub user_id: Uuid,
    /// Optional due timestamp.
    pub due_date: Option<DateTime<Utc>>,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,
}
