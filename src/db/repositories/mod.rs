//! Database repositories
//!
//! Repository pattern implementations for database access. Each repository
//! handles CRUD operations for a specific entity and translates driver-level
//! unique-index rejections into [`UniqueViolation`] so services can react to
//! a lost uniqueness race without parsing driver error strings.

pub mod post;
pub mod tag;
pub mod user;

pub use post::{PostRepository, SqlxPostRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{SqlxUserRepository, UserRepository};

/// Raised when an insert or update trips a unique index.
///
/// Services downcast for this type (`err.downcast_ref::<UniqueViolation>()`)
/// to distinguish a race-lost commit from an infrastructure failure.
#[derive(Debug, thiserror::Error)]
#[error("Unique constraint violated on {column}")]
pub struct UniqueViolation {
    /// Column covered by the violated index
    pub column: &'static str,
}

/// Translate a sqlx error from a write path.
///
/// A unique-index rejection becomes [`UniqueViolation`] on the given column;
/// anything else is wrapped with the given context.
pub(crate) fn map_write_err(
    err: sqlx::Error,
    column: &'static str,
    context: &'static str,
) -> anyhow::Error {
    let is_unique = err
        .as_database_error()
        .map(|db| matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation))
        .unwrap_or(false);

    if is_unique {
        anyhow::Error::new(UniqueViolation { column })
    } else {
        anyhow::Error::new(err).context(context)
    }
}
