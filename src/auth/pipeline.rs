//! Request-time authentication and authorization stages
//!
//! Each stage is a plain function returning `Result`, so the chain
//! short-circuits on the first failure and can be tested without a server.

use crate::{
    auth::{jwt::TokenService, middleware::AuthContext},
    error::AppError,
    models::role::Role,
};
use axum::http::{header::AUTHORIZATION, HeaderMap};

/// 从 Authorization 头提取令牌
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::MissingToken)
}

/// Authentication stage: bearer header -> verified identity
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthContext, AppError> {
    let token = extract_token(headers)?;
    let claims = tokens.verify(token)?;

    Ok(AuthContext::from(claims))
}

/// Authorization stage: identity must exist and hold one of `allowed`
pub fn authorize<'a>(
    identity: Option<&'a AuthContext>,
    allowed: &[Role],
) -> Result<&'a AuthContext, AppError> {
    let identity = identity.ok_or(AppError::Unauthenticated)?;

    if !allowed.contains(&identity.role) {
        tracing::warn!(
            user_id = identity.id,
            role = %identity.role,
            "Permission denied"
        );
        return Err(AppError::InsufficientRole {
            role: identity.role,
            allowed: allowed.to_vec(),
        });
    }

    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{clock::SystemClock, jwt::TokenError},
        models::user::PublicUser,
    };
    use chrono::Duration;
    use secrecy::Secret;
    use std::sync::Arc;

    fn token_service() -> TokenService {
        TokenService::new(
            &Secret::new("test_secret_key_32_characters_long!".to_string()),
            Duration::hours(1),
            Arc::new(SystemClock),
        )
        .unwrap()
    }

    fn identity(role: Role) -> AuthContext {
        AuthContext {
            id: 1,
            username: "alice".to_string(),
            role,
        }
    }

    #[test]
    fn test_extract_token_valid() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer test_token_123".parse().unwrap());

        let token = extract_token(&headers).unwrap();
        assert_eq!(token, "test_token_123");
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert!(matches!(extract_token(&headers), Err(AppError::MissingToken)));
    }

    #[test]
    fn test_extract_token_invalid_format() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "InvalidFormat".parse().unwrap());
        assert!(matches!(extract_token(&headers), Err(AppError::MissingToken)));

        headers.insert("authorization", "Bearer ".parse().unwrap());
        assert!(matches!(extract_token(&headers), Err(AppError::MissingToken)));

        headers.insert("authorization", "Basic dXNlcjpwdw==".parse().unwrap());
        assert!(matches!(extract_token(&headers), Err(AppError::MissingToken)));
    }

    #[test]
    fn test_authenticate_roundtrip() {
        let tokens = token_service();
        let user = PublicUser {
            id: 5,
            username: "carol".to_string(),
            role: Role::User,
        };
        let token = tokens.issue_default(&user).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {}", token).parse().unwrap());

        let ctx = authenticate(&headers, &tokens).unwrap();
        assert_eq!(ctx.id, 5);
        assert_eq!(ctx.username, "carol");
        assert_eq!(ctx.role, Role::User);
    }

    #[test]
    fn test_authenticate_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer malformed.token".parse().unwrap());

        assert!(matches!(
            authenticate(&headers, &token_service()),
            Err(AppError::Token(TokenError::Malformed))
        ));
    }

    #[test]
    fn test_authorize_requires_identity() {
        assert!(matches!(
            authorize(None, &[Role::Admin, Role::User]),
            Err(AppError::Unauthenticated)
        ));
    }

    #[test]
    fn test_authorize_membership() {
        let admin = identity(Role::Admin);
        let user = identity(Role::User);

        assert!(authorize(Some(&admin), &[Role::Admin]).is_ok());
        assert!(authorize(Some(&user), &[Role::User]).is_ok());

        match authorize(Some(&user), &[Role::Admin]) {
            Err(AppError::InsufficientRole { role, allowed }) => {
                assert_eq!(role, Role::User);
                assert_eq!(allowed, vec![Role::Admin]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_authorize_no_hierarchy() {
        // admin is not implicitly a user
        let admin = identity(Role::Admin);
        assert!(authorize(Some(&admin), &[Role::User]).is_err());
    }
}
