//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod error;
pub mod health;
pub mod state;
pub mod todos;
pub mod users;
pub(crate) mod validation;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::ApiResult;

/// Register the versioned API surface on an application.
///
/// Health probes are registered separately at the root so orchestration
/// paths stay stable across API versions.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
            .service(users::list_users)
            .service(users::get_user_by_username)
            .service(users::user_stats)
            .service(users::get_user)
            .service(users::create_user)
            .service(users::update_user)
            .service(users::delete_user)
            .service(todos::list_todos)
            .service(todos::list_todos_for_user)
            .service(todos::delete_completed_for_user)
            .service(todos::get_todo)
            .service(todos::create_todo)
            .service(todos::update_todo)
            .service(todos::toggle_todo)
            .service(todos::delete_todo),
    );
}

/// Attach the pagination metadata headers shared by the collection
/// endpoints.
pub(crate) fn paging_headers(
    builder: &mut actix_web::HttpResponseBuilder,
    total: u64,
    page: u32,
    size: u32,
) {
    builder.insert_header(("X-Total-Count", total.to_string()));
    builder.insert_header(("X-Page", page.to_string()));
    builder.insert_header(("X-Page-Size", size.to_string()));
}
