//! 日志与指标
//! 结构化日志初始化、Prometheus 记录器安装，以及认证相关指标的记录入口

use crate::config::AppConfig;
use axum::http::Method;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// 请求耗时直方图桶（秒）
const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];

/// 初始化日志
///
/// `RUST_LOG` 优先于 `logging.level`；`json` 输出附带 span 关闭事件，
/// 每个请求的耗时与 request_id 因此落在同一条日志里。
pub fn init_telemetry(config: &AppConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let log_layer = if config.logging.format.eq_ignore_ascii_case("pretty") {
        tracing_subscriber::fmt::layer().pretty().with_target(false).boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_span_events(FmtSpan::CLOSE)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(log_layer)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.logging.level,
        format = %config.logging.format,
        "Telemetry initialized"
    );
}

/// 安装全局 Prometheus 记录器，返回 `/metrics` 渲染用的句柄
///
/// 进程内只能安装一次，重复调用返回错误。
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            DURATION_BUCKETS,
        )?
        .install_recorder()?;

    tracing::debug!("Metrics recorder installed");
    Ok(handle)
}

/// 记录一次已完成的请求
pub fn record_request(method: &Method, status: u16, elapsed: Duration) {
    // 标签只取有限集合，避免基数膨胀
    let method = match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        _ => "OTHER",
    };
    let status = match status {
        200..=299 => "2xx",
        400 => "400",
        401 => "401",
        403 => "403",
        400..=499 => "4xx",
        _ => "5xx",
    };

    metrics::counter!("http_requests_total", "method" => method, "status" => status).increment(1);
    metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());
}

/// 记录一次令牌拒绝，`reason` 只在内部可见
pub fn record_token_rejection(reason: &'static str) {
    metrics::counter!("auth_token_rejections_total", "reason" => reason).increment(1);
}
