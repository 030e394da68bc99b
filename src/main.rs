//! 认证服务主入口

use authgate::{
    auth::clock::SystemClock, config::AppConfig, handlers::health, middleware::AppState,
    repository::InMemoryUserRepository, routes, telemetry,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("authgate {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 生产环境应该直接设置环境变量，不依赖 .env 文件
    if let Ok(env) = std::env::var("AUTHGATE_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::dotenv().ok();
    }

    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Auth service starting...");

    let metrics_handle = telemetry::init_metrics()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))?;

    // 3. 构建应用状态
    let app_state = Arc::new(
        AppState::new(
            config.clone(),
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(SystemClock),
        )?
        .with_metrics(metrics_handle),
    );

    // 4. 构建路由
    let app = routes::create_router(app_state);

    // 5. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // 6. 优雅关闭
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.graceful_shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
///
/// 收到信号后开始排空连接；超过超时时间则强制退出进程。
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
        tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        std::process::exit(1);
    });
}

/// 打印帮助信息
fn print_help() {
    println!("authgate {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: authgate [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量（前缀 AUTHGATE_，层级分隔符 __）:");
    println!("  AUTHGATE_SERVER__ADDR              监听地址 (默认 0.0.0.0:3001)");
    println!("  AUTHGATE_LOGGING__LEVEL            日志级别 (默认 info)");
    println!("  AUTHGATE_LOGGING__FORMAT           日志格式 json|pretty (默认 json)");
    println!("  AUTHGATE_SECURITY__JWT_SECRET      令牌签名密钥（必填），至少 32 字符");
    println!("  AUTHGATE_SECURITY__TOKEN_TTL_SECS  令牌有效期 (默认 86400)");
}
