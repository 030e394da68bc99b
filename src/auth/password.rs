//! Password hashing and verification using Argon2id

use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use once_cell::sync::OnceCell;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// Password hasher with configurable parameters
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Digest of random data, verified against when the username is unknown
    dummy_hash: OnceCell<String>,
}

impl PasswordHasher {
    /// Create hasher with explicit Argon2 parameters
    pub fn new(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_hash: OnceCell::new(),
        }
    }

    /// Create hasher from the security section of the config
    pub fn from_config(security: &SecurityConfig) -> Result<Self, AppError> {
        let params = Params::new(
            security.hash_memory_kib,
            security.hash_iterations,
            security.hash_parallelism,
            None,
        )
        .map_err(|e| AppError::Config(format!("Invalid Argon2 params: {}", e)))?;

        Ok(Self::new(params))
    }

    /// Hash a password
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a hash
    ///
    /// A malformed digest is a plain mismatch, never an error.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Failed to parse password hash: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Burn one verification worth of work and report a mismatch.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let dummy = self.dummy_hash.get_or_try_init(|| {
            let random: String = thread_rng()
                .sample_iter(&Alphanumeric)
                .take(32)
                .map(char::from)
                .collect();
            self.hash(&random)
        });

        if let Ok(hash) = dummy {
            let _ = self.verify(password, hash);
        }

        false
    }
}

impl Default for PasswordHasher {
    /// Argon2id with the crate's default parameters
    fn default() -> Self {
        Self::new(Params::default())
    }
}
