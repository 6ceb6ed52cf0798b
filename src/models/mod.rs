//! Data models
//!
//! This module contains the data structures used throughout the backend:
//! - Database entities (Post, Tag, User)
//! - Typed input structs carrying caller-supplied data

mod post;
mod tag;
mod user;

pub use post::{CreatePostInput, Post, UpdatePostInput};
pub use tag::{CreateTagInput, Tag, UpdateTagInput};
pub use user::User;
