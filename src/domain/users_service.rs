//! User repository logic.
//!
//! Implements the user driving port over the storage ports: uniqueness
//! enforcement on create and update, partial updates, name search, atomic
//! cascade deletion, and the per-user stats aggregate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::ports::{
    NewUser, NewUserRecord, TodoStore, UserListQuery, UserListing, UserOperations, UserPatch,
    UserStats, UserStore,
};
use super::{Error, User, map_store_error, next_stamp};

fn user_not_found(id: Uuid) -> Error {
    Error::not_found(format!("User not found with id: {id}"))
}

/// User repository logic implementing [`UserOperations`].
#[derive(Clone)]
pub struct UserService<U, T> {
    users: Arc<U>,
    todos: Arc<T>,
}

impl<U, T> UserService<U, T> {
    /// Create a new service over the user and todo storage ports.
    pub fn new(users: Arc<U>, todos: Arc<T>) -> Self {
        Self { users, todos }
    }
}

impl<U, T> UserService<U, T>
where
    U: UserStore,
    T: TodoStore,
{
    /// Reject the create when username or email is already taken.
    ///
    /// This is only the friendly fast path; the store's uniqueness
    /// constraint remains the authoritative guard under concurrency.
    async fn check_uniqueness(&self, new_user: &NewUser) -> Result<(), Error> {
        if self
            .users
            .find_user_by_username(&new_user.username)
            .await
            .map_err(map_store_error)?
            .is_some()
        {
            return Err(Error::conflict(format!(
                "Username already exists: {}",
                new_user.username
            )));
        }
        if self
            .users
            .find_user_by_email(&new_user.email)
            .await
            .map_err(map_store_error)?
            .is_some()
        {
            return Err(Error::conflict(format!(
                "Email already exists: {}",
                new_user.email
            )));
        }
        Ok(())
    }

    async fn apply_username(&self, user: &mut User, username: String) -> Result<(), Error> {
        if username != user.username {
            let existing = self
                .users
                .find_user_by_username(&username)
                .await
                .map_err(map_store_error)?;
            if existing.is_some_and(|other| other.id != user.id) {
                return Err(Error::conflict(format!(
                    "Username already exists: {username}"
                )));
            }
        }
        user.username = username;
        Ok(())
    }

    async fn apply_email(&self, user: &mut User, email: String) -> Result<(), Error> {
        if email != user.email {
            let existing = self
                .users
                .find_user_by_email(&email)
                .await
                .map_err(map_store_error)?;
            if existing.is_some_and(|other| other.id != user.id) {
                return Err(Error::conflict(format!("Email already exists: {email}")));
            }
        }
        user.email = email;
        Ok(())
    }
}

#[async_trait]
impl<U, T> UserOperations for UserService<U, T>
where
    U: UserStore,
    T: TodoStore,
{
    async fn create_user(&self, new_user: NewUser) -> Result<User, Error> {
        self.check_uniqueness(&new_user).await?;

        let now = Utc::now();
        let record = NewUserRecord {
            username: new_user.username,
            email: new_user.email,
            name: new_user.name,
            created_at: now,
            updated_at: now,
        };
        let user = self
            .users
            .insert_user(record)
            .await
            .map_err(map_store_error)?;

        info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<User, Error> {
        self.users
            .find_user(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| user_not_found(id))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        self.users
            .find_user_by_username(username)
            .await
            .map_err(map_store_error)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.users
            .find_user_by_email(email)
            .await
            .map_err(map_store_error)
    }

    async fn list_users(&self, query: UserListQuery) -> Result<UserListing, Error> {
        // A non-blank search returns all matches unsliced; paging applies to
        // the unfiltered listing only.
        let users = match query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(fragment) => self
                .users
                .search_users_by_name(fragment)
                .await
                .map_err(map_store_error)?,
            None => self
                .users
                .list_users(query.page, query.size)
                .await
                .map_err(map_store_error)?,
        };
        let total = self.users.count_users().await.map_err(map_store_error)?;

        Ok(UserListing {
            users,
            total,
            page: query.page,
            size: query.size,
        })
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, Error> {
        let mut user = self
            .users
            .find_user(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| user_not_found(id))?;

        if let Some(username) = patch.username {
            self.apply_username(&mut user, username).await?;
        }
        if let Some(email) = patch.email {
            self.apply_email(&mut user, email).await?;
        }
        if let Some(name) = patch.name {
            user.name = name;
        }

        // Refreshes even when a field was set to its existing value.
        user.updated_at = next_stamp(user.updated_at);
        self.users
            .update_user(&user)
            .await
            .map_err(map_store_error)?;

        info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), Error> {
        match self
            .users
            .delete_user_cascade(id)
            .await
            .map_err(map_store_error)?
        {
            Some(todos_removed) => {
                info!(user_id = %id, todos_removed, "user deleted");
                Ok(())
            }
            None => Err(user_not_found(id)),
        }
    }

    async fn user_stats(&self, id: Uuid) -> Result<UserStats, Error> {
        let user = self
            .users
            .find_user(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| user_not_found(id))?;

        let total = self
            .todos
            .count_todos_for_user(id, None)
            .await
            .map_err(map_store_error)?;
        let completed = self
            .todos
            .count_todos_for_user(id, Some(true))
            .await
            .map_err(map_store_error)?;

        // Derived rather than queried so completed + pending == total holds
        // even when the two counts interleave with concurrent mutations.
        let pending = total.saturating_sub(completed);

        Ok(UserStats {
            user_id: id,
            username: user.username,
            total_todos: total,
            completed_todos: completed,
            pending_todos: pending,
        })
    }
}

#[cfg(test)]
#[path = "users_service_tests.rs"]
mod tests;
