//! 无状态令牌认证服务库
//! 注册、登录、令牌签发与基于角色的访问控制

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
