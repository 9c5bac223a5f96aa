//! Todos API handlers.
//!
//! ```text
//! GET    /api/v1/todos?page&size&userId&completed
//! GET    /api/v1/todos/{id}
//! POST   /api/v1/todos
//! PUT    /api/v1/todos/{id}
//! PATCH  /api/v1/todos/{id}/toggle
//! DELETE /api/v1/todos/{id}
//! GET    /api/v1/todos/user/{userId}?completed
//! DELETE /api/v1/todos/user/{userId}/completed
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::{NewTodo, TodoListQuery, TodoPatch, TodoView};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    Violations, check_description_length, check_title_length, require_title, validate_page_params,
};
use crate::inbound::http::{ApiResult, paging_headers};

/// Creation request body. Fields are optional so missing values surface as
/// field violations rather than deserialisation failures.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoCreateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub user_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

impl TodoCreateRequest {
    fn validate(self) -> Result<NewTodo, Error> {
        let mut violations = Violations::new();
        require_title(&mut violations, self.title.as_deref());
        if let Some(description) = self.description.as_deref() {
            check_description_length(&mut violations, description);
        }
        if self.user_id.is_none() {
            violations.add("userId", "User ID is required");
        }
        violations.into_result()?;

        Ok(NewTodo {
            title: self.title.unwrap_or_default(),
            description: self.description,
            completed: self.completed,
            user_id: self.user_id.unwrap_or_default(),
            due_date: self.due_date,
        })
    }
}

/// Partial update request body; absent fields are left untouched.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub due_date: Option<DateTime<Utc>>,
}

impl TodoUpdateRequest {
    fn validate(self) -> Result<TodoPatch, Error> {
        let mut violations = Violations::new();
        if let Some(title) = self.title.as_deref() {
            check_title_length(&mut violations, title);
        }
        if let Some(description) = self.description.as_deref() {
            check_description_length(&mut violations, description);
        }
        violations.into_result()?;

        Ok(TodoPatch {
            title: self.title,
            description: self.description,
            completed: self.completed,
            due_date: self.due_date,
        })
    }
}

/// External todo representation with the owner resolved; the owner fields
/// are null when the owning row has gone missing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TodoView> for TodoResponse {
    fn from(view: TodoView) -> Self {
        Self {
            id: view.id,
            title: view.title,
            description: view.description,
            completed: view.completed,
            user_id: view.user_id,
            user_name: view.user_name,
            due_date: view.due_date,
            created_at: view.created_at,
            updated_at: view.updated_at,
        }
    }
}

/// Outcome of a bulk completed-todo purge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCompletedResponse {
    pub message: String,
    pub deleted_count: u64,
}

fn default_page_size() -> i64 {
    20
}

/// Listing query parameters. When either filter is present the handlers
/// return the full match set and ignore `page`/`size`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoListParams {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
    pub user_id: Option<Uuid>,
    pub completed: Option<bool>,
}

/// Completion filter for user-scoped listings.
#[derive(Debug, Deserialize)]
pub struct CompletionFilter {
    pub completed: Option<bool>,
}

/// List todos, paged, or filtered (unsliced) by owner and/or completion.
#[get("/todos")]
pub async fn list_todos(
    state: web::Data<HttpState>,
    params: web::Query<TodoListParams>,
) -> ApiResult<HttpResponse> {
    let params = params.into_inner();
    let (page, size) = validate_page_params(params.page, params.size)?;

    let listing = state
        .todos
        .list_todos(TodoListQuery {
            page,
            size,
            user_id: params.user_id,
            completed: params.completed,
        })
        .await?;

    let body: Vec<TodoResponse> = listing.todos.into_iter().map(TodoResponse::from).collect();
    let mut builder = HttpResponse::Ok();
    paging_headers(&mut builder, listing.total, listing.page, listing.size);
    Ok(builder.json(body))
}

/// List a user's todos, optionally restricted by completion.
#[get("/todos/user/{userId}")]
pub async fn list_todos_for_user(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
    filter: web::Query<CompletionFilter>,
) -> ApiResult<HttpResponse> {
    let views = state
        .todos
        .list_todos_for_user(path.into_inner(), filter.completed)
        .await?;
    let body: Vec<TodoResponse> = views.into_iter().map(TodoResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Fetch a todo by identifier.
#[get("/todos/{id}")]
pub async fn get_todo(state: web::Data<HttpState>, path: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    let view = state.todos.get_todo(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TodoResponse::from(view)))
}

/// Create a new todo for an existing user.
#[post("/todos")]
pub async fn create_todo(
    state: web::Data<HttpState>,
    payload: web::Json<TodoCreateRequest>,
) -> ApiResult<HttpResponse> {
    let new_todo = payload.into_inner().validate()?;
    let view = state.todos.create_todo(new_todo).await?;
    Ok(HttpResponse::Created().json(TodoResponse::from(view)))
}

/// Apply a partial update to a todo.
#[put("/todos/{id}")]
pub async fn update_todo(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
    payload: web::Json<TodoUpdateRequest>,
) -> ApiResult<HttpResponse> {
    let patch = payload.into_inner().validate()?;
    let view = state.todos.update_todo(path.into_inner(), patch).await?;
    Ok(HttpResponse::Ok().json(TodoResponse::from(view)))
}

/// Flip a todo's completion flag.
#[patch("/todos/{id}/toggle")]
pub async fn toggle_todo(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let view = state.todos.toggle_todo(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TodoResponse::from(view)))
}

/// Delete a todo.
#[delete("/todos/{id}")]
pub async fn delete_todo(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state.todos.delete_todo(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete every completed todo owned by a user. Zero matches is a success.
#[delete("/todos/user/{userId}/completed")]
pub async fn delete_completed_for_user(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let deleted = state
        .todos
        .delete_completed_for_user(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(DeleteCompletedResponse {
        message: format!("Deleted {deleted} completed todos"),
        deleted_count: deleted,
    }))
}
