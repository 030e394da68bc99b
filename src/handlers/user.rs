//! 受保护资源的 HTTP 处理器

use crate::{auth::middleware::AuthContext, error::AppError, middleware::AppState};
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

/// 仪表盘：任何已认证用户
pub async fn dashboard(auth_context: AuthContext) -> Result<impl IntoResponse, AppError> {
    Ok(Json(json!({
        "message": "Welcome to your dashboard!",
        "user": auth_context,
    })))
}

/// 管理面板：仅管理员
pub async fn admin_panel(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let users = state.auth_service.list_users()?;

    Ok(Json(json!({
        "message": "Welcome to the admin panel!",
        "user": auth_context,
        "allUsers": users,
    })))
}
