use std::str::FromStr;
use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{self, PasswordHash, PasswordVerifier, SaltString},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand_core::OsRng;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::domain::error::DomainError;

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, DomainError>;
    /// `false` for blank input, malformed hashes and mismatches alike.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Unsalted SHA-256, base64 encoded. Compatible with the hashes already stored
/// by the mobile app; prefer [`Argon2Hasher`] for new deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl PasswordHasher for Sha256Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        if password.trim().is_empty() {
            return Err(DomainError::validation("password must not be blank"));
        }
        let digest = Sha256::digest(password.as_bytes());
        Ok(STANDARD.encode(digest))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        if password.trim().is_empty() || hash.trim().is_empty() {
            return false;
        }
        match self.hash(password) {
            Ok(candidate) => candidate == hash,
            Err(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        if password.trim().is_empty() {
            return Err(DomainError::validation("password must not be blank"));
        }
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = password_hash::PasswordHasher::hash_password(&argon2, password.as_bytes(), &salt)
            .map_err(|err| DomainError::Internal(err.to_string()))?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        if password.trim().is_empty() {
            return false;
        }
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HasherKind {
    Sha256,
    Argon2,
}

impl HasherKind {
    pub fn build(self) -> Arc<dyn PasswordHasher> {
        match self {
            HasherKind::Sha256 => Arc::new(Sha256Hasher),
            HasherKind::Argon2 => Arc::new(Argon2Hasher),
        }
    }
}

impl FromStr for HasherKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" => Ok(HasherKind::Sha256),
            "argon2" => Ok(HasherKind::Argon2),
            other => Err(anyhow::anyhow!("unknown password hasher: {}", other)),
        }
    }
}
