//! End-to-end behaviour of the users API over the full service stack.

use actix_web::test as actix_test;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

mod support;

use support::{api_app, create_todo, create_user, id_of, test_state};

fn stamp(body: &Value, field: &str) -> DateTime<Utc> {
    body.get(field)
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse().ok())
        .expect("response carries the timestamp")
}

#[actix_web::test]
async fn created_user_is_fetchable_with_equal_stamps() {
    let app = actix_test::init_service(api_app(test_state())).await;
    let created = create_user(&app, "ada").await;
    assert_eq!(
        created.get("createdAt"),
        created.get("updatedAt"),
        "fresh rows carry identical stamps"
    );

    let id = id_of(&created);
    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{id}"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert!(response.status().is_success());

    let fetched: Value = actix_test::read_body_json(response).await;
    assert_eq!(fetched, created);
}

#[actix_web::test]
async fn duplicate_username_and_email_conflict() {
    let app = actix_test::init_service(api_app(test_state())).await;
    create_user(&app, "ada").await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({
            "username": "ada",
            "email": "other@example.com",
            "name": "Other",
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), actix_web::http::StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.get("error").and_then(Value::as_str),
        Some("Username already exists: ada")
    );

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({
            "username": "grace",
            "email": "ada@example.com",
            "name": "Grace",
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), actix_web::http::StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.get("error").and_then(Value::as_str),
        Some("Email already exists: ada@example.com")
    );
}

#[actix_web::test]
async fn name_only_update_keeps_identity_and_advances_stamp() {
    let app = actix_test::init_service(api_app(test_state())).await;
    let created = create_user(&app, "ada").await;
    let id = id_of(&created);

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{id}"))
        .set_json(json!({"name": "Augusta Ada King"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert!(response.status().is_success());

    let updated: Value = actix_test::read_body_json(response).await;
    assert_eq!(updated.get("username"), created.get("username"));
    assert_eq!(updated.get("email"), created.get("email"));
    assert_eq!(
        updated.get("name").and_then(Value::as_str),
        Some("Augusta Ada King")
    );
    assert_eq!(updated.get("createdAt"), created.get("createdAt"));
    let before = stamp(&created, "updatedAt");
    let after = stamp(&updated, "updatedAt");
    assert!(after > before, "updatedAt must advance: {before} -> {after}");
}

#[actix_web::test]
async fn reusing_own_username_is_not_a_conflict() {
    let app = actix_test::init_service(api_app(test_state())).await;
    let created = create_user(&app, "ada").await;
    let id = id_of(&created);

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{id}"))
        .set_json(json!({"username": "ada"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert!(response.status().is_success());
}

#[actix_web::test]
async fn delete_cascades_to_owned_todos() {
    let app = actix_test::init_service(api_app(test_state())).await;
    let ada = create_user(&app, "ada").await;
    let grace = create_user(&app, "grace").await;
    let ada_id = id_of(&ada);
    let grace_id = id_of(&grace);

    let owned = create_todo(&app, ada_id, "goes away", false).await;
    let kept = create_todo(&app, grace_id, "stays", false).await;

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/users/{ada_id}"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), actix_web::http::StatusCode::NO_CONTENT);

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/todos/{}", id_of(&owned)))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/todos/{}", id_of(&kept)))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert!(response.status().is_success());

    // Deleting again reports the user as gone.
    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/users/{ada_id}"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.get("error").and_then(Value::as_str),
        Some(format!("User not found with id: {ada_id}").as_str())
    );
}

#[actix_web::test]
async fn stats_report_consistent_counts() {
    let app = actix_test::init_service(api_app(test_state())).await;
    let ada = create_user(&app, "ada").await;
    let ada_id = id_of(&ada);
    create_todo(&app, ada_id, "one", true).await;
    create_todo(&app, ada_id, "two", true).await;
    create_todo(&app, ada_id, "three", false).await;

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{ada_id}/stats"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert!(response.status().is_success());

    let stats: Value = actix_test::read_body_json(response).await;
    assert_eq!(stats.get("username").and_then(Value::as_str), Some("ada"));
    assert_eq!(stats.get("totalTodos").and_then(Value::as_u64), Some(3));
    assert_eq!(stats.get("completedTodos").and_then(Value::as_u64), Some(2));
    assert_eq!(stats.get("pendingTodos").and_then(Value::as_u64), Some(1));
}

#[actix_web::test]
async fn search_returns_all_matches_and_keeps_unfiltered_total() {
    let app = actix_test::init_service(api_app(test_state())).await;
    for username in ["ada", "adelaide", "grace"] {
        create_user(&app, username).await;
    }

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users?search=ad&size=1")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("X-Total-Count")
            .and_then(|value| value.to_str().ok()),
        Some("3"),
        "total stays the unfiltered row count"
    );

    let body: Value = actix_test::read_body_json(response).await;
    let rows = body.as_array().expect("array body");
    assert_eq!(rows.len(), 2, "size must not slice search results");
}

#[actix_web::test]
async fn stats_for_unknown_user_is_not_found() {
    let app = actix_test::init_service(api_app(test_state())).await;
    let ghost = Uuid::new_v4();
    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{ghost}/stats"))
        .to_request();

    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);
}
