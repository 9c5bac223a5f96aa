//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{TodoOperations, UserOperations};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserOperations>,
    pub todos: Arc<dyn TodoOperations>,
}

impl HttpState {
    /// Bundle the driving port implementations for handler injection.
    pub fn new(users: Arc<dyn UserOperations>, todos: Arc<dyn TodoOperations>) -> Self {
        Self { users, todos }
    }
}
