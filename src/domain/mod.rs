//! Domain entities, ports, and repository-logic services.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`] — transport-agnostic failure taxonomy.
//! - [`User`] / [`Todo`] — persisted entities.
//! - [`ports`] — driving and driven port traits plus their payload types.
//! - [`UserService`] / [`TodoService`] — repository logic implementing the
//!   driving ports over the storage ports.

pub mod error;
pub mod ports;
pub mod todo;
pub mod todos_service;
pub mod user;
pub mod users_service;

pub use self::error::{Error, ErrorCode};
pub use self::todo::Todo;
pub use self::todos_service::TodoService;
pub use self::user::User;
pub use self::users_service::UserService;

use chrono::{DateTime, Duration, Utc};

use self::ports::StoreError;

/// Translate storage-level failures into the client-facing taxonomy.
///
/// Constraint rejections keep the same messages the friendly pre-checks
/// produce, so a race past a pre-check is indistinguishable to the client.
pub(crate) fn map_store_error(error: StoreError) -> Error {
    match error {
        StoreError::UniqueViolation { field, value } => {
            Error::conflict(format!("{field} already exists: {value}"))
        }
        StoreError::MissingOwner { user_id } => {
            Error::invalid_reference(format!("User not found with id: {user_id}"))
        }
        StoreError::Connection { message } | StoreError::Query { message } => {
            Error::internal(message)
        }
    }
}

/// Next `updated_at` stamp for a mutation.
///
/// `updated_at` must change on every successful mutation; when two mutations
/// land within clock resolution the stamp is nudged one nanosecond past the
/// previous value so it still advances strictly.
pub(crate) fn next_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::nanoseconds(1)
    }
}
