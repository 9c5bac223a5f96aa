//! Shared fixtures for handler tests: a real service stack over the
//! in-memory store, mounted exactly as `main` mounts it.

use std::sync::Arc;

use actix_web::{App, web};

use crate::domain::{TodoService, UserService};
use crate::inbound::http::{self, state::HttpState};
use crate::outbound::persistence::MemoryStore;

/// Build handler state backed by a fresh in-memory store.
pub(crate) fn test_state() -> HttpState {
    let store = Arc::new(MemoryStore::new());
    HttpState::new(
        Arc::new(UserService::new(store.clone(), store.clone())),
        Arc::new(TodoService::new(store.clone(), store)),
    )
}

/// Assemble an application with the full versioned API surface.
pub(crate) fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(http::configure)
}
