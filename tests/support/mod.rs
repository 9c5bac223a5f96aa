//! Shared fixtures for the end-to-end API tests: a full service stack over
//! a fresh in-memory store, mounted the way `main` mounts it.

use std::sync::Arc;

use actix_web::{App, test as actix_test, web};
use serde_json::{Value, json};
use uuid::Uuid;

use todo_backend::domain::{TodoService, UserService};
use todo_backend::inbound::http::{self, state::HttpState};
use todo_backend::outbound::persistence::MemoryStore;

pub fn test_state() -> HttpState {
    let store = Arc::new(MemoryStore::new());
    HttpState::new(
        Arc::new(UserService::new(store.clone(), store.clone())),
        Arc::new(TodoService::new(store.clone(), store)),
    )
}

pub fn api_app(
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

/// POST a user and return its response body.
pub async fn create_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    username: &str,
) -> Value {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "name": format!("{username} name"),
        }))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert_eq!(
        response.status(),
        actix_web::http::StatusCode::CREATED,
        "user creation failed"
    );
    actix_test::read_body_json(response).await
}

/// POST a todo and return its response body.
pub async fn create_todo(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    user_id: Uuid,
    title: &str,
    completed: bool,
) -> Value {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/todos")
        .set_json(json!({
            "title": title,
            "userId": user_id,
            "completed": completed,
        }))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert_eq!(
        response.status(),
        actix_web::http::StatusCode::CREATED,
        "todo creation failed"
    );
    actix_test::read_body_json(response).await
}

pub fn id_of(body: &Value) -> Uuid {
    body.get("id")
        .and_then(Value::as_str)
        .and_then(|id| id.parse().ok())
        .expect("response carries an id")
}
