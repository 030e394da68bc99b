//! User repository (用户存储层)

use crate::{
    error::AppError,
    models::user::{NewUser, PublicUser, User},
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

/// 用户存储抽象
///
/// `insert` must be atomic with respect to `find_by_username` for the same
/// username: two concurrent inserts of one username never both succeed.
pub trait UserRepository: Send + Sync {
    /// 根据用户名查找用户
    fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// 插入用户，用户名重复时返回 DuplicateUsername
    fn insert(&self, user: NewUser) -> Result<User, AppError>;

    /// 列出所有用户（不含密码摘要），按 id 排序
    fn list_all(&self) -> Result<Vec<PublicUser>, AppError>;

    /// 统计用户数量
    fn count(&self) -> Result<usize, AppError>;
}

#[derive(Debug)]
struct Inner {
    users: HashMap<String, User>,
    last_id: u64,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }
}

/// 内存用户存储，适用于单进程部署与测试
#[derive(Debug)]
pub struct InMemoryUserRepository {
    inner: RwLock<Inner>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                users: HashMap::new(),
                last_id: 0,
            }),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal("user repository lock poisoned".to_string())
}

impl UserRepository for InMemoryUserRepository {
    fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.users.get(username).cloned())
    }

    fn insert(&self, user: NewUser) -> Result<User, AppError> {
        // 检查与写入在同一把写锁内完成
        let mut inner = self.inner.write().map_err(poisoned)?;

        if inner.users.contains_key(&user.username) {
            return Err(AppError::DuplicateUsername);
        }

        let record = User {
            id: inner.next_id(),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        inner.users.insert(record.username.clone(), record.clone());

        tracing::debug!(user_id = record.id, username = %record.username, "User stored");

        Ok(record)
    }

    fn list_all(&self) -> Result<Vec<PublicUser>, AppError> {
        let inner = self.inner.read().map_err(poisoned)?;

        let mut users: Vec<PublicUser> = inner.users.values().map(PublicUser::from).collect();
        users.sort_by_key(|u| u.id);

        Ok(users)
    }

    fn count(&self) -> Result<usize, AppError> {
        Ok(self.inner.read().map_err(poisoned)?.users.len())
    }
}
