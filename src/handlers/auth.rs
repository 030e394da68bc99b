//! 认证相关的 HTTP 处理器

use crate::{
    error::AppError,
    middleware::AppState,
    models::auth::{LoginRequest, RegisterRequest, RegisterResponse},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// 请求体无法解析时统一返回 InvalidInput
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        AppError::InvalidInput("Request body must be a JSON object".to_string())
    })
}

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = parse_body(payload)?;

    let user = state.auth_service.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = parse_body(payload)?;

    let response = state.auth_service.login(req).await?;

    Ok(Json(response))
}
