//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

/// 令牌最长有效期（7 天）
const MAX_TOKEN_TTL_SECS: u64 = 604_800;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:3001"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// JWT 密钥（使用 Secret 包装，防止日志泄露）
    pub jwt_secret: Secret<String>,
    /// 令牌有效期（秒），默认 24 小时
    pub token_ttl_secs: u64,
    /// Argon2 内存开销（KiB）
    pub hash_memory_kib: u32,
    /// Argon2 迭代次数
    pub hash_iterations: u32,
    /// Argon2 并行度
    pub hash_parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("server.addr", "0.0.0.0:3001")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.token_ttl_secs", 86400)?
            .set_default("security.hash_memory_kib", 65536)?
            .set_default("security.hash_iterations", 3)?
            .set_default("security.hash_parallelism", 4)?;

        // 从环境变量加载配置（前缀为 AUTHGATE_）
        // jwt_secret 没有默认值，未设置时加载失败
        settings = settings.add_source(
            Environment::with_prefix("AUTHGATE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 验证端口范围
        if let Some(port_str) = self.server.addr.split(':').next_back() {
            if let Ok(port) = port_str.parse::<u16>() {
                if port != 0 && port < 1024 {
                    return Err(ConfigError::Message("Server port should be >= 1024".to_string()));
                }
            }
        }

        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        // 验证 JWT 密钥长度（至少 32 字符）
        if self.security.jwt_secret.expose_secret().len() < 32 {
            return Err(ConfigError::Message(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        // 验证令牌过期时间
        if self.security.token_ttl_secs == 0 || self.security.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Message(format!(
                "token_ttl_secs must be between 1 and {} (7 days)",
                MAX_TOKEN_TTL_SECS
            )));
        }

        // 验证 Argon2 参数
        argon2::Params::new(
            self.security.hash_memory_kib,
            self.security.hash_iterations,
            self.security.hash_parallelism,
            None,
        )
        .map_err(|e| ConfigError::Message(format!("Invalid password hashing parameters: {}", e)))?;

        Ok(())
    }
}
