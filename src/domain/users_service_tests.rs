use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockTodoStore, MockUserStore, StoreError, UniqueField};

fn sample_user() -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        username: "ada".to_owned(),
        email: "ada@example.com".to_owned(),
        name: "Ada Lovelace".to_owned(),
        created_at: now,
        updated_at: now,
    }
}

fn make_service(
    users: MockUserStore,
    todos: MockTodoStore,
) -> UserService<MockUserStore, MockTodoStore> {
    UserService::new(Arc::new(users), Arc::new(todos))
}

fn new_user_request() -> NewUser {
    NewUser {
        username: "ada".to_owned(),
        email: "ada@example.com".to_owned(),
        name: "Ada Lovelace".to_owned(),
    }
}

#[tokio::test]
async fn create_user_rejects_taken_username() {
    let mut users = MockUserStore::new();
    users
        .expect_find_user_by_username()
        .times(1)
        .return_once(|_| Ok(Some(sample_user())));
    users.expect_insert_user().times(0);

    let service = make_service(users, MockTodoStore::new());
    let error = service
        .create_user(new_user_request())
        .await
        .expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "Username already exists: ada");
}

#[tokio::test]
async fn create_user_rejects_taken_email() {
    let mut users = MockUserStore::new();
    users
        .expect_find_user_by_username()
        .times(1)
        .return_once(|_| Ok(None));
    users
        .expect_find_user_by_email()
        .times(1)
        .return_once(|_| Ok(Some(sample_user())));
    users.expect_insert_user().times(0);

    let service = make_service(users, MockTodoStore::new());
    let error = service
        .create_user(new_user_request())
        .await
        .expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "Email already exists: ada@example.com");
}

#[tokio::test]
async fn create_user_translates_store_unique_violation() {
    // Both pre-checks pass but a concurrent creator wins the race; the
    // store-level rejection must surface as the same conflict.
    let mut users = MockUserStore::new();
    users
        .expect_find_user_by_username()
        .return_once(|_| Ok(None));
    users.expect_find_user_by_email().return_once(|_| Ok(None));
    users.expect_insert_user().times(1).return_once(|_| {
        Err(StoreError::UniqueViolation {
            field: UniqueField::Username,
            value: "ada".to_owned(),
        })
    });

    let service = make_service(users, MockTodoStore::new());
    let error = service
        .create_user(new_user_request())
        .await
        .expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "Username already exists: ada");
}

#[tokio::test]
async fn create_user_stamps_equal_timestamps() {
    let mut users = MockUserStore::new();
    users
        .expect_find_user_by_username()
        .return_once(|_| Ok(None));
    users.expect_find_user_by_email().return_once(|_| Ok(None));
    users.expect_insert_user().times(1).returning(|record| {
        assert_eq!(record.created_at, record.updated_at);
        Ok(User {
            id: Uuid::new_v4(),
            username: record.username,
            email: record.email,
            name: record.name,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    });

    let service = make_service(users, MockTodoStore::new());
    let user = service
        .create_user(new_user_request())
        .await
        .expect("created");

    assert_eq!(user.created_at, user.updated_at);
    assert_eq!(user.username, "ada");
}

#[tokio::test]
async fn update_name_only_keeps_identity_and_advances_stamp() {
    let existing = sample_user();
    let id = existing.id;
    let created_stamp = existing.created_at;
    let previous_stamp = existing.updated_at;
    let expected_username = existing.username.clone();

    let mut users = MockUserStore::new();
    users
        .expect_find_user()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    users
        .expect_update_user()
        .times(1)
        .withf(move |user: &User| {
            user.name == "Countess of Lovelace"
                && user.username == expected_username
                && user.updated_at > previous_stamp
        })
        .return_once(|_| Ok(()));

    let service = make_service(users, MockTodoStore::new());
    let patch = UserPatch {
        name: Some("Countess of Lovelace".to_owned()),
        ..UserPatch::default()
    };
    let updated = service.update_user(id, patch).await.expect("updated");

    assert_eq!(updated.name, "Countess of Lovelace");
    assert!(updated.updated_at > previous_stamp);
    assert_eq!(updated.created_at, created_stamp);
}

#[tokio::test]
async fn update_rejects_username_taken_by_another_user() {
    let existing = sample_user();
    let id = existing.id;
    let other = User {
        username: "grace".to_owned(),
        ..sample_user()
    };

    let mut users = MockUserStore::new();
    users
        .expect_find_user()
        .return_once(move |_| Ok(Some(existing)));
    users
        .expect_find_user_by_username()
        .times(1)
        .return_once(move |_| Ok(Some(other)));
    users.expect_update_user().times(0);

    let service = make_service(users, MockTodoStore::new());
    let patch = UserPatch {
        username: Some("grace".to_owned()),
        ..UserPatch::default()
    };
    let error = service.update_user(id, patch).await.expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "Username already exists: grace");
}

#[tokio::test]
async fn update_missing_user_is_not_found() {
    let mut users = MockUserStore::new();
    users.expect_find_user().return_once(|_| Ok(None));

    let service = make_service(users, MockTodoStore::new());
    let error = service
        .update_user(Uuid::new_v4(), UserPatch::default())
        .await
        .expect_err("not found");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_missing_user_is_not_found() {
    let mut users = MockUserStore::new();
    users.expect_delete_user_cascade().return_once(|_| Ok(None));

    let service = make_service(users, MockTodoStore::new());
    let error = service
        .delete_user(Uuid::new_v4())
        .await
        .expect_err("not found");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn stats_derives_pending_from_total_and_completed() {
    let user = sample_user();
    let id = user.id;

    let mut users = MockUserStore::new();
    users.expect_find_user().return_once(move |_| Ok(Some(user)));

    let mut todos = MockTodoStore::new();
    todos
        .expect_count_todos_for_user()
        .times(2)
        .returning(|_, completed| match completed {
            None => Ok(3),
            Some(true) => Ok(2),
            Some(false) => unreachable!("pending is derived, not queried"),
        });

    let service = make_service(users, todos);
    let stats = service.user_stats(id).await.expect("stats");

    assert_eq!(stats.total_todos, 3);
    assert_eq!(stats.completed_todos, 2);
    assert_eq!(stats.pending_todos, 1);
    assert_eq!(stats.username, "ada");
}

#[tokio::test]
async fn find_by_email_is_an_empty_result_when_absent() {
    let mut users = MockUserStore::new();
    users.expect_find_user_by_email().return_once(|_| Ok(None));

    let service = make_service(users, MockTodoStore::new());
    let found = service
        .find_by_email("nobody@example.com")
        .await
        .expect("lookup succeeds");

    assert!(found.is_none());
}

#[tokio::test]
async fn list_with_blank_search_falls_back_to_paging() {
    let mut users = MockUserStore::new();
    users
        .expect_list_users()
        .times(1)
        .withf(|page, size| (*page, *size) == (1, 5))
        .return_once(|_, _| Ok(vec![sample_user()]));
    users.expect_search_users_by_name().times(0);
    users.expect_count_users().return_once(|| Ok(12));

    let service = make_service(users, MockTodoStore::new());
    let listing = service
        .list_users(UserListQuery {
            page: 1,
            size: 5,
            search: Some("   ".to_owned()),
        })
        .await
        .expect("listing");

    assert_eq!(listing.users.len(), 1);
    assert_eq!(listing.total, 12);
    assert_eq!((listing.page, listing.size), (1, 5));
}
