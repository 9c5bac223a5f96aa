//! Users API handlers.
//!
//! ```text
//! GET    /api/v1/users?page&size&search
//! GET    /api/v1/users/{id}
//! GET    /api/v1/users/username/{username}
//! POST   /api/v1/users
//! PUT    /api/v1/users/{id}
//! DELETE /api/v1/users/{id}
//! GET    /api/v1/users/{id}/stats
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{NewUser, UserListQuery, UserPatch, UserStats};
use crate::domain::{Error, User};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    Violations, check_email_syntax, check_name_length, check_username_length, require_email,
    require_name, require_username, validate_page_params,
};
use crate::inbound::http::{ApiResult, paging_headers};

/// Creation request body. Fields are optional so missing values surface as
/// field violations rather than deserialisation failures.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl UserCreateRequest {
    fn validate(self) -> Result<NewUser, Error> {
        let mut violations = Violations::new();
        require_username(&mut violations, self.username.as_deref());
        require_email(&mut violations, self.email.as_deref());
        require_name(&mut violations, self.name.as_deref());
        violations.into_result()?;

        Ok(NewUser {
            username: self.username.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
        })
    }
}

/// Partial update request body; absent fields are left untouched.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl UserUpdateRequest {
    fn validate(self) -> Result<UserPatch, Error> {
        let mut violations = Violations::new();
        if let Some(username) = self.username.as_deref() {
            check_username_length(&mut violations, username);
        }
        if let Some(email) = self.email.as_deref() {
            check_email_syntax(&mut violations, email);
        }
        if let Some(name) = self.name.as_deref() {
            check_name_length(&mut violations, name);
        }
        violations.into_result()?;

        Ok(UserPatch {
            username: self.username,
            email: self.email,
            name: self.name,
        })
    }
}

/// External user representation; only the listed fields are exposed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Aggregate todo counts for a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsResponse {
    pub user_id: Uuid,
    pub username: String,
    pub total_todos: u64,
    pub completed_todos: u64,
    pub pending_todos: u64,
}

impl From<UserStats> for UserStatsResponse {
    fn from(stats: UserStats) -> Self {
        Self {
            user_id: stats.user_id,
            username: stats.username,
            total_todos: stats.total_todos,
            completed_todos: stats.completed_todos,
            pending_todos: stats.pending_todos,
        }
    }
}

fn default_page_size() -> i64 {
    20
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
    pub search: Option<String>,
}

/// List users, paged, or filtered by a case-insensitive name search.
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    params: web::Query<UserListParams>,
) -> ApiResult<HttpResponse> {
    let params = params.into_inner();
    let (page, size) = validate_page_params(params.page, params.size)?;

    let listing = state
        .users
        .list_users(UserListQuery {
            page,
            size,
            search: params.search,
        })
        .await?;

    let body: Vec<UserResponse> = listing.users.into_iter().map(UserResponse::from).collect();
    let mut builder = HttpResponse::Ok();
    paging_headers(&mut builder, listing.total, listing.page, listing.size);
    Ok(builder.json(body))
}

/// Fetch a user by identifier.
#[get("/users/{id}")]
pub async fn get_user(state: web::Data<HttpState>, path: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    let user = state.users.get_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Fetch a user by exact username.
#[get("/users/username/{username}")]
pub async fn get_user_by_username(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let username = path.into_inner();
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| Error::not_found(format!("User not found with username: {username}")))?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Create a new user.
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<UserCreateRequest>,
) -> ApiResult<HttpResponse> {
    let new_user = payload.into_inner().validate()?;
    let user = state.users.create_user(new_user).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Apply a partial update to a user.
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
    payload: web::Json<UserUpdateRequest>,
) -> ApiResult<HttpResponse> {
    let patch = payload.into_inner().validate()?;
    let user = state.users.update_user(path.into_inner(), patch).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Delete a user and cascade to its todos.
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state.users.delete_user(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Aggregate todo counts for a user.
#[get("/users/{id}/stats")]
pub async fn user_stats(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let stats = state.users.user_stats(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserStatsResponse::from(stats)))
}
