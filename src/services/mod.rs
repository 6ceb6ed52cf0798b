//! Services layer - Business logic
//!
//! This module contains the business logic for the backend. Services are
//! responsible for:
//! - Implementing the record workflows over the repositories
//! - Slug derivation and uniqueness resolution
//! - Validation and error cases

pub mod auth;
pub mod password;
pub mod post;
pub mod slug;
pub mod tag;
pub mod validator;

pub use auth::CredentialVerifier;
pub use password::{hash_password, verify_password};
pub use post::{PostService, PostServiceError};
pub use slug::{slugify, FALLBACK_SLUG};
pub use tag::{TagService, TagServiceError};
pub use validator::{validate, FieldErrors, FieldSnapshot, Rule};
