//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

use crate::{
    auth::middleware::{require_auth, require_role, RoleGuard},
    handlers,
    middleware::AppState,
};

/// 请求体上限（64 KiB）
const MAX_BODY_BYTES: usize = 64 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点
    let public_routes = Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::metrics));

    // 认证路由（无需认证）
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // 仅管理员：角色检查在认证之后执行
    let admin_routes = Router::new()
        .route("/admin", get(handlers::user::admin_panel))
        .route_layer(from_fn_with_state(RoleGuard::admin_only(), require_role));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        .route("/dashboard", get(handlers::user::dashboard))
        .merge(admin_routes)
        .route_layer(from_fn_with_state(state.token_service.clone(), require_auth));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(authenticated_routes)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}
