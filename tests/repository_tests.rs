//! 用户存储与并发注册测试

use authgate::{
    error::AppError,
    models::{role::Role, user::NewUser},
    repository::{InMemoryUserRepository, UserRepository},
};
use axum::http::StatusCode;
use secrecy::{ExposeSecret, Secret};
use serde_json::json;
use std::sync::Arc;

mod common;
use common::{create_test_app, post_json};

fn new_user(username: &str, role: Role) -> NewUser {
    NewUser {
        username: username.to_string(),
        password_hash: Secret::new(format!("digest-of-{}", username)),
        role,
    }
}

#[test]
fn test_user_repository_insert_and_find() {
    let repo = InMemoryUserRepository::new();

    let user = repo.insert(new_user("alice", Role::Admin)).unwrap();
    assert_eq!(user.id, 1);

    let found = repo
        .find_by_username("alice")
        .unwrap()
        .expect("User not found");
    assert_eq!(found.id, 1);
    assert_eq!(found.role, Role::Admin);
    assert_eq!(found.password_hash.expose_secret(), "digest-of-alice");

    assert!(repo.find_by_username("bob").unwrap().is_none());
}

#[test]
fn test_user_repository_duplicate() {
    let repo = InMemoryUserRepository::new();
    repo.insert(new_user("alice", Role::User)).unwrap();

    let result = repo.insert(new_user("alice", Role::Admin));
    assert!(matches!(result, Err(AppError::DuplicateUsername)));
    assert_eq!(repo.count().unwrap(), 1);
    assert_eq!(repo.find_by_username("alice").unwrap().unwrap().role, Role::User);
}

#[test]
fn test_user_repository_list_all_ordered() {
    let repo = InMemoryUserRepository::new();
    for name in ["c", "a", "b"] {
        repo.insert(new_user(name, Role::User)).unwrap();
    }

    let users = repo.list_all().unwrap();
    let ids: Vec<u64> = users.iter().map(|u| u.id).collect();
    let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(names, vec!["c", "a", "b"]);
}

#[test]
fn test_concurrent_inserts_same_username() {
    let repo = Arc::new(InMemoryUserRepository::new());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let repo = repo.clone();
            std::thread::spawn(move || repo.insert(new_user("racer", Role::User)).is_ok())
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(repo.count().unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_same_username() {
    let app = create_test_app();

    let requests = (0..2).map(|i| {
        let app = app.clone();
        tokio::spawn(async move {
            post_json(
                &app,
                "/register",
                json!({"username": "twin", "password": format!("pw-{}", i)}),
            )
            .await
        })
    });

    let mut statuses = Vec::new();
    for handle in requests.collect::<Vec<_>>() {
        let (status, _) = handle.await.unwrap();
        statuses.push(status);
    }
    statuses.sort_by_key(|s| s.as_u16());

    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    // 再次注册也必须失败，说明只存在一条记录
    let (status, body) =
        post_json(&app, "/register", json!({"username": "twin", "password": "pw"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");
}
