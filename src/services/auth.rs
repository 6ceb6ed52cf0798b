//! Credential verification
//!
//! Checks a submitted email/password pair against the stored argon2 hash.
//! A missing account and a wrong password both come back as `false`; the
//! caller cannot tell which, so account existence never leaks.

use crate::db::repositories::UserRepository;
use crate::services::password::verify_password;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Verifies login credentials against stored users.
pub struct CredentialVerifier {
    users: Arc<dyn UserRepository>,
}

impl CredentialVerifier {
    /// Create a new credential verifier
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Verify that an email and password match a stored user.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure failures (storage errors,
    /// corrupt stored hash); both "no such user" and "wrong password" are
    /// `Ok(false)`.
    pub async fn verify(&self, email: &str, password: &str) -> Result<bool> {
        let user = match self
            .users
            .get_by_email(email)
            .await
            .context("Failed to look up user")?
        {
            Some(user) => user,
            None => return Ok(false),
        };

        verify_password(password, &user.password_hash)
    }
}
