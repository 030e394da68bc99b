//! User storage layer

pub mod user_repo;

pub use user_repo::*;
