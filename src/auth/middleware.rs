//! JWT 认证与角色授权中间件

use crate::{
    auth::{
        jwt::{Claims, TokenService},
        pipeline::{authenticate, authorize},
    },
    error::AppError,
    models::role::Role,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use std::sync::Arc;

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    pub id: u64,
    pub username: String,
    pub role: Role,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
            role: claims.role,
        }
    }
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }
}

/// 角色守卫：允许访问的角色集合
#[derive(Debug, Clone)]
pub struct RoleGuard {
    allowed: Arc<[Role]>,
}

impl RoleGuard {
    pub fn new(allowed: &[Role]) -> Self {
        Self {
            allowed: Arc::from(allowed),
        }
    }

    pub fn admin_only() -> Self {
        Self::new(&[Role::Admin])
    }

    pub fn allowed(&self) -> &[Role] {
        &self.allowed
    }
}

/// JWT 认证中间件 - 必须认证
pub async fn require_auth(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_context = authenticate(req.headers(), &tokens)?;

    tracing::debug!(
        user_id = auth_context.id,
        role = %auth_context.role,
        "Request authenticated"
    );

    // 附加到请求扩展
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// 角色授权中间件 - 必须在 require_auth 之后执行
pub async fn require_role(
    State(guard): State<RoleGuard>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(req.extensions().get::<AuthContext>(), guard.allowed())?;

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_guard_admin_only() {
        let guard = RoleGuard::admin_only();
        assert_eq!(guard.allowed(), &[Role::Admin]);
    }

    #[test]
    fn test_context_from_claims() {
        let claims = Claims {
            id: 3,
            username: "dave".to_string(),
            role: Role::User,
            iat: 0,
            exp: 10,
        };

        let ctx = AuthContext::from(claims);
        assert_eq!(ctx.id, 3);
        assert_eq!(ctx.username, "dave");
        assert_eq!(ctx.role, Role::User);
    }
}
