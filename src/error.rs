//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use crate::{auth::jwt::TokenError, middleware::current_request_id, models::role::Role};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Access token required")]
    MissingToken,

    #[error("Token rejected: {0}")]
    Token(#[from] TokenError),

    #[error("User not authenticated")]
    Unauthenticated,

    #[error("Role {role} not in {allowed:?}")]
    InsufficientRole { role: Role, allowed: Vec<Role> },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::DuplicateUsername => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::Token(_)
            | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::InsufficientRole { .. } => StatusCode::FORBIDDEN,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    ///
    /// 所有令牌错误共用同一条消息，调用方无法区分过期与篡改。
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::DuplicateUsername => "Username already exists".to_string(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::MissingToken => "Access token required".to_string(),
            AppError::Token(_) => "Invalid or expired token".to_string(),
            AppError::Unauthenticated => "User not authenticated".to_string(),
            AppError::InsufficientRole { .. } => {
                "Access denied. Insufficient permissions.".to_string()
            }
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }
}

/// 错误响应 DTO
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub request_id: String,
    #[serde(rename = "requiredRole", skip_serializing_if = "Option::is_none")]
    pub required_role: Option<Vec<Role>>,
    #[serde(rename = "yourRole", skip_serializing_if = "Option::is_none")]
    pub your_role: Option<Role>,
}

impl ErrorResponse {
    pub fn from_error(error: &AppError) -> Self {
        let (required_role, your_role) = match error {
            AppError::InsufficientRole { role, allowed } => (Some(allowed.clone()), Some(*role)),
            _ => (None, None),
        };

        Self {
            error: error.user_message(),
            request_id: current_request_id().unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            required_role,
            your_role,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        // 服务端错误记录详情，客户端错误仅告警
        if status.is_server_error() {
            tracing::error!(
                code = self.code(),
                message = %self,
                request_id = %error_response.request_id,
                "Application error"
            );
        } else {
            tracing::warn!(
                code = self.code(),
                message = %self,
                request_id = %error_response.request_id,
                "Request rejected"
            );
        }

        (status, Json(error_response)).into_response()
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}
