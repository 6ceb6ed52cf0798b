//! Bootstrap seeding
//!
//! Creates the initial user from configured credentials so a fresh install
//! has an account to log in with. Both credentials are required; their
//! absence aborts startup rather than leaving a store nobody can access.

use crate::config::{ConfigError, SeedConfig};
use crate::db::repositories::UserRepository;
use crate::models::User;
use crate::services::password::hash_password;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Ensure the seed user exists.
///
/// A no-op when a user with the configured email is already stored;
/// otherwise the password is hashed and the user inserted.
///
/// # Errors
///
/// - [`ConfigError::Missing`] when either credential is absent or blank
/// - Storage errors from the lookup or insert
pub async fn seed_user(users: &Arc<dyn UserRepository>, config: &SeedConfig) -> Result<()> {
    let email = config
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::Missing("seed.email (INKPRESS_SEED_EMAIL)"))?;

    let password = config
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::Missing("seed.password (INKPRESS_SEED_PASSWORD)"))?;

    if users
        .get_by_email(email)
        .await
        .context("Failed to check for existing seed user")?
        .is_some()
    {
        tracing::debug!("Seed user already present");
        return Ok(());
    }

    let password_hash = hash_password(password).context("Failed to hash seed password")?;

    users
        .create(&User::new(email.to_string(), password_hash))
        .await
        .context("Failed to create seed user")?;

    tracing::info!("Seed user created");
    Ok(())
}
