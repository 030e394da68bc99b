//! HTTP 中间件
//! 应用状态与请求追踪

use crate::{
    auth::{clock::Clock, jwt::TokenService, password::PasswordHasher},
    config::AppConfig,
    error::AppError,
    repository::UserRepository,
    services::AuthService,
    telemetry,
};
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// 应用状态
///
/// 服务使用 Arc 包装，多个请求共享同一实例，Clone 只是指针拷贝。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub users: Arc<dyn UserRepository>,
    pub auth_service: Arc<AuthService>,
    pub token_service: Arc<TokenService>,
    /// 已安装的 Prometheus 记录器；未安装时 /metrics 返回 404
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// 由配置与注入的存储、时钟构建应用状态
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let token_service = Arc::new(TokenService::from_config(&config, clock)?);
        let hasher = Arc::new(PasswordHasher::from_config(&config.security)?);
        let auth_service = Arc::new(AuthService::new(
            users.clone(),
            hasher,
            token_service.clone(),
        ));

        Ok(Self {
            config,
            users,
            auth_service,
            token_service,
            metrics: None,
        })
    }

    /// 挂载 Prometheus 句柄以启用 /metrics
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

tokio::task_local! {
    /// 当前请求的 request_id，错误响应体与 x-request-id 头使用同一个值
    static REQUEST_ID: String;
}

/// 读取当前请求的 request_id（不在请求作用域内时为 None）
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let uri = req.uri().path().to_string();

    // 创建 span
    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let scoped_id = request_id.clone();
    let handled = async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        telemetry::record_request(&method, status, elapsed);

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        // 在响应头中添加 trace_id
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span);

    REQUEST_ID.scope(scoped_id, handled).await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
