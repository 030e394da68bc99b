//! 测试公共模块
//! 提供测试辅助函数和测试工具

#![allow(dead_code)]

use authgate::{
    auth::clock::{Clock, ManualClock, SystemClock},
    config::{AppConfig, LoggingConfig, SecurityConfig, ServerConfig},
    middleware::AppState,
    repository::InMemoryUserRepository,
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// 创建测试配置（低开销的 Argon2 参数）
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(), // 使用随机端口
            graceful_shutdown_timeout_secs: 5,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new("test-secret-key-for-testing-only-min-32-chars".to_string()),
            token_ttl_secs: 86400,
            hash_memory_kib: 1024,
            hash_iterations: 1,
            hash_parallelism: 1,
        },
    }
}

/// 创建测试应用状态（系统时钟）
pub fn create_test_app_state() -> Arc<AppState> {
    create_test_app_state_with_clock(Arc::new(SystemClock))
}

/// 创建测试应用状态（注入时钟）
pub fn create_test_app_state_with_clock(clock: Arc<dyn Clock>) -> Arc<AppState> {
    Arc::new(
        AppState::new(
            create_test_config(),
            Arc::new(InMemoryUserRepository::new()),
            clock,
        )
        .expect("Failed to create app state"),
    )
}

/// 创建测试路由与可控时钟
pub fn create_test_app_with_manual_clock() -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let state = create_test_app_state_with_clock(clock.clone());
    (authgate::routes::create_router(state), clock)
}

/// 创建挂载了本地 Prometheus 句柄的测试路由（不安装全局记录器）
pub fn create_test_app_with_metrics() -> Router {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let state = AppState::new(
        create_test_config(),
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(SystemClock),
    )
    .expect("Failed to create app state")
    .with_metrics(handle);

    authgate::routes::create_router(Arc::new(state))
}

/// 创建测试路由
pub fn create_test_app() -> Router {
    authgate::routes::create_router(create_test_app_state())
}

/// 发送 JSON POST 请求
pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    read_response(response).await
}

/// 发送 GET 请求，可选 Authorization 头
pub async fn get(app: &Router, uri: &str, authorization: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    read_response(response).await
}

async fn read_response(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

/// 注册并登录，返回令牌
pub async fn register_and_login(app: &Router, username: &str, password: &str, role: &str) -> String {
    let (status, _) = post_json(
        app,
        "/register",
        serde_json::json!({"username": username, "password": password, "role": role}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_json(
        app,
        "/login",
        serde_json::json!({"username": username, "password": password}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    body["token"].as_str().unwrap().to_string()
}
