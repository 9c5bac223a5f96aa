//! User entity.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A registered user owning zero or more todos.
///
/// ## Invariants
/// - `username` and `email` are unique across all users (enforced by the
///   storage adapter as the authoritative guard).
/// - `created_at` never changes after creation; `updated_at` advances on
///   every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Opaque identifier assigned by the store on creation.
    pub id: Uuid,
    /// Unique login handle, 3–50 characters.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Display name, at most 100 characters.
    pub name: String,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,
}
