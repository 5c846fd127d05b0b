//! Argon2id password hashing.
//!
//! Every hash gets a fresh random salt, which is embedded in the PHC string
//! that is stored. Verification re-derives with that salt and the same
//! server-side secret.

use crate::app_config::HashingConfig;
use crate::error::{Error, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
    secret: Option<Vec<u8>>,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", &self.params)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl CredentialHasher {
    pub fn new(config: &HashingConfig) -> Result<Self> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| Error::Hashing(e.to_string()))?;

        let secret = if config.secret.is_empty() {
            None
        } else {
            Some(config.secret.as_bytes().to_vec())
        };

        Ok(Self { params, secret })
    }

    fn argon2(&self) -> Result<Argon2<'_>> {
        match &self.secret {
            Some(secret) => Argon2::new_with_secret(
                secret,
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )
            .map_err(|e| Error::Hashing(e.to_string())),
            None => Ok(Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )),
        }
    }

    /// Hashes `plaintext` with a new random salt and returns the PHC string.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()?
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| Error::Hashing(e.to_string()))?
            .to_string();

        Ok(hash)
    }

    /// Returns true if `plaintext` produces `stored` under its embedded salt.
    /// A malformed stored hash never verifies.
    pub fn verify(&self, plaintext: &str, stored: &str) -> bool {
        let parsed = match PasswordHash::new(stored) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };

        match self.argon2() {
            Ok(argon2) => argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}
