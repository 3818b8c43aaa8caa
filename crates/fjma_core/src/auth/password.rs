//! Argon2id password digests with tunable cost.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use log::warn;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Work-factor settings for new digests.
///
/// Existing digests keep verifying after a change because each PHC string
/// carries its own parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Hashing failure.
#[derive(Debug)]
pub enum HashError {
    /// Cost settings rejected by Argon2.
    InvalidParams(argon2::Error),
    /// Digest computation failed.
    Digest(password_hash::Error),
}

impl Display for HashError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParams(err) => write!(f, "invalid hash parameters: {err}"),
            Self::Digest(err) => write!(f, "password digest failed: {err}"),
        }
    }
}

impl Error for HashError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidParams(err) => Some(err),
            Self::Digest(err) => Some(err),
        }
    }
}

/// Salted one-way hasher for administrator passwords.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn new(config: &HashConfig) -> Result<Self, HashError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(HashError::InvalidParams)?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hashes `plaintext` with a fresh random salt into PHC string bytes.
    pub fn hash(&self, plaintext: &str) -> Result<Vec<u8>, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(HashError::Digest)?;
        Ok(digest.to_string().into_bytes())
    }

    /// Returns whether `plaintext` matches `digest`.
    ///
    /// Digests this hasher cannot read (non-PHC bytes, bcrypt `$2b$` strings
    /// from the earlier records tool, other PHC algorithms) never match.
    pub fn verify(&self, plaintext: &str, digest: &[u8]) -> bool {
        let Some(parsed) = std::str::from_utf8(digest)
            .ok()
            .and_then(|text| PasswordHash::new(text).ok())
        else {
            warn!("event=password_verify module=auth status=unreadable_digest");
            return false;
        };
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(password_hash::Error::Password) => false,
            Err(err) => {
                warn!("event=password_verify module=auth status=unsupported_digest error={err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CredentialHasher, HashConfig, HashError};

    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::new(&HashConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn hash_then_verify_matches_only_same_password() {
        let hasher = fast_hasher();
        let digest = hasher.hash("admin123").unwrap();
        assert!(hasher.verify("admin123", &digest));
        assert!(!hasher.verify("admin124", &digest));
    }

    #[test]
    fn hashing_is_salted() {
        let hasher = fast_hasher();
        let first = hasher.hash("same").unwrap();
        let second = hasher.hash("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn digest_verifies_under_different_cost_settings() {
        let digest = fast_hasher().hash("secret").unwrap();
        let other = CredentialHasher::new(&HashConfig {
            memory_kib: 16,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(other.verify("secret", &digest));
    }

    #[test]
    fn non_utf8_digest_never_matches() {
        assert!(!fast_hasher().verify("x", &[0xff, 0xfe]));
    }

    #[test]
    fn bcrypt_digest_never_matches() {
        let bcrypt = b"$2b$12$KIXQJYg0zQ6bX8n0e7f0UuQ6Yy6zZ1m9u1QjFjv0d4n1o3c5o7yWe";
        assert!(!fast_hasher().verify("admin123", bcrypt));
    }

    #[test]
    fn foreign_phc_algorithm_never_matches() {
        let scrypt = b"$scrypt$ln=4,r=8,p=1$c2FsdHNhbHQ$dGVzdGhhc2h0ZXN0aGFzaA";
        assert!(!fast_hasher().verify("secret", scrypt));
    }

    #[test]
    fn digest_error_exposes_source() {
        let err = CredentialHasher::new(&HashConfig {
            memory_kib: 8,
            iterations: 0,
            parallelism: 1,
        })
        .err()
        .unwrap();
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn zero_iterations_are_rejected() {
        let result = CredentialHasher::new(&HashConfig {
            memory_kib: 8,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(HashError::InvalidParams(_))));
    }
}
