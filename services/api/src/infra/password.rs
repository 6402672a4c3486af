use anyhow::{Context as _, anyhow};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};

use crate::domain::repository::PasswordHasher;
use crate::error::ApiError;

/// Argon2id hasher. Hashing runs on the blocking pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct Argon2PasswordHasher {
    /// Minimal cost parameters for dev and test databases. Never enable in production.
    pub fast: bool,
}

impl Argon2PasswordHasher {
    fn argon2(self) -> Result<Argon2<'static>, ApiError> {
        if self.fast {
            let params = Params::new(1024, 1, 1, None)
                .map_err(|e| anyhow!("invalid argon2 params: {e}"))?;
            Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
        } else {
            Ok(Argon2::default())
        }
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, ApiError> {
        let argon2 = self.argon2()?;
        let password = password.to_owned();
        let hash = tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| anyhow!("hash password: {e}"))
        })
        .await
        .context("join password hashing task")??;
        Ok(hash)
    }

    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, ApiError> {
        let argon2 = self.argon2()?;
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        let verified = tokio::task::spawn_blocking(move || {
            // An unparsable stored hash can never match.
            PasswordHash::new(&password_hash).is_ok_and(|parsed| {
                argon2
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
        })
        .await
        .context("join password verification task")?;
        Ok(verified)
    }
}
