//! Role model for coarse-grained authorization

use serde::{Deserialize, Serialize};

/// User role.
///
/// Closed set: an unknown label can never become a `Role`. Authorization
/// is membership-based, no role implies another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Least-privileged role, assigned when registration asks for nothing valid.
    pub const LEAST_PRIVILEGED: Role = Role::User;

    /// Parse a role label. Only the exact lowercase labels are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// Resolve the role requested at registration, downgrading anything
    /// unrecognised to the least-privileged role.
    pub fn from_requested(requested: Option<&str>) -> Self {
        requested.and_then(Role::parse).unwrap_or(Role::LEAST_PRIVILEGED)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
