//! 健康检查处理器
//! 提供 /、/health 与 /metrics 端点

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::middleware::AppState;

/// 应用启动时间
static APP_START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// 存活探针响应
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub users: usize,
}

/// 设置应用启动时间
pub fn set_start_time() {
    Lazy::force(&APP_START_TIME);
}

/// 获取应用运行时间（秒）
pub fn get_uptime() -> u64 {
    APP_START_TIME.elapsed().as_secs()
}

/// 服务说明
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "JWT Authentication API",
        "endpoints": {
            "register": "POST /register",
            "login": "POST /login",
            "dashboard": "GET /dashboard (requires authentication)",
            "admin": "GET /admin (requires admin role)",
            "metrics": "GET /metrics"
        }
    }))
}

/// 存活探针
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    // 存储异常时仍然报告存活，用户数记为 0
    let users = state.users.count().unwrap_or_default();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: get_uptime(),
        users,
    })
}

/// Prometheus 文本格式指标
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
