//! Exchange API credentials.
//!
//! The secret is held in a `SecretString` so it never shows up in Debug
//! output and is zeroed on drop.

use secrecy::{ExposeSecret, SecretString};

#[derive(Clone)]
pub struct Credentials {
    key: String,
    secret: SecretString,
}

impl Credentials {
    pub fn new(key: String, secret: String) -> Self {
        Self {
            key,
            secret: SecretString::from(secret),
        }
    }

    /// The public half, safe to log.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Only for signing requests. Never log the return value.
    pub fn expose_secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
