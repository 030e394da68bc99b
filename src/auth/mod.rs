//! Authentication and authorization module

pub mod clock;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod pipeline;

pub use clock::{Clock, ManualClock, SystemClock};
pub use jwt::{Claims, TokenError, TokenService};
pub use middleware::{require_auth, require_role, AuthContext, RoleGuard};
pub use password::PasswordHasher;
pub use pipeline::{authenticate, authorize, extract_token};
