//! 认证服务：注册与登录

use crate::{
    auth::{jwt::TokenService, password::PasswordHasher},
    error::AppError,
    models::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        user::{NewUser, PublicUser},
    },
    repository::UserRepository,
};
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<PasswordHasher>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// 用户注册
    pub async fn register(&self, req: RegisterRequest) -> Result<PublicUser, AppError> {
        let (credentials, role) = req.into_parts()?;

        // 快速失败，避免为已存在的用户名计算哈希；以 insert 的原子检查为准
        if self.users.find_by_username(&credentials.username)?.is_some() {
            return Err(AppError::DuplicateUsername);
        }

        let password_hash = self.hash_password(credentials.password).await?;

        let user = self.users.insert(NewUser {
            username: credentials.username,
            password_hash: Secret::new(password_hash),
            role,
        })?;

        tracing::info!(
            user_id = user.id,
            username = %user.username,
            role = %user.role,
            "User registered"
        );

        Ok(PublicUser::from(user))
    }

    /// 用户登录
    ///
    /// 用户不存在与密码错误返回同一个错误。
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let credentials = req.into_credentials()?;

        let user = self.users.find_by_username(&credentials.username)?;
        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.expose_secret().clone());

        // 用户不存在时也执行一次校验，使耗时一致
        let verified = self.verify_password(credentials.password, stored_hash).await?;

        let user = match user {
            Some(user) if verified => user,
            _ => {
                tracing::warn!(username = %credentials.username, "Login failed");
                return Err(AppError::InvalidCredentials);
            }
        };

        let profile = PublicUser::from(user);
        let token = self.tokens.issue_default(&profile)?;

        tracing::info!(user_id = profile.id, username = %profile.username, "Login successful");

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            token,
            user: profile,
        })
    }

    /// 列出所有用户（管理员视图）
    pub fn list_users(&self) -> Result<Vec<PublicUser>, AppError> {
        self.users.list_all()
    }

    /// 在阻塞线程池中计算哈希，避免阻塞异步运行时
    async fn hash_password(&self, password: Secret<String>) -> Result<String, AppError> {
        let hasher = self.hasher.clone();

        tokio::task::spawn_blocking(move || hasher.hash(password.expose_secret()))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_password(
        &self,
        password: Secret<String>,
        stored_hash: Option<String>,
    ) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();

        tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => hasher.verify(password.expose_secret(), &hash),
            None => hasher.verify_dummy(password.expose_secret()),
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))
    }
}
