//! Post model
//!
//! This module provides:
//! - `Post` entity representing a content record
//! - Input types for creating and updating posts
//!
//! The input structs are the fillable surface of a post: only the fields
//! declared here can ever be set from caller-supplied data, and unknown
//! fields in incoming payloads are dropped during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::validator::Rule;

/// Post entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug, unique across all posts
    pub slug: String,
    /// Post title
    pub title: String,
    /// Post body (free text)
    pub body: String,
    /// Publication timestamp
    pub published_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with the given parameters.
    ///
    /// The ID is set to 0 and assigned by the database on insert.
    pub fn new(
        slug: String,
        title: String,
        body: String,
        published_at: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            slug,
            title,
            body,
            published_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validation rules for the post entity.
    pub fn rules() -> &'static [(&'static str, &'static [Rule])] {
        &[
            ("title", &[Rule::Required, Rule::Max(255)]),
            ("slug", &[Rule::Required, Rule::Max(255)]),
            ("published_at", &[Rule::Datetime]),
        ]
    }
}

/// Input for creating a new post.
///
/// Every field is optional at the type level so that missing values reach
/// the validator (which reports them per field) instead of failing
/// deserialization up front.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostInput {
    /// Post title
    #[serde(default)]
    pub title: Option<String>,
    /// Explicit slug; when absent one is derived from the title
    #[serde(default)]
    pub slug: Option<String>,
    /// Post body
    #[serde(default)]
    pub body: Option<String>,
    /// Publication timestamp as a date-time string
    #[serde(default)]
    pub published_at: Option<String>,
}

impl CreatePostInput {
    /// Create an input with just a title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Set the slug
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Set the body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the publication timestamp string
    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = Some(published_at.into());
        self
    }
}

/// Input for updating an existing post.
///
/// Absent fields are left unchanged on the stored record. The slug is never
/// re-derived from the title here; URL stability takes priority over
/// slug/title consistency after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostInput {
    /// New title (optional)
    #[serde(default)]
    pub title: Option<String>,
    /// New slug (optional)
    #[serde(default)]
    pub slug: Option<String>,
    /// New body (optional)
    #[serde(default)]
    pub body: Option<String>,
    /// New publication timestamp string (optional)
    #[serde(default)]
    pub published_at: Option<String>,
}

impl UpdatePostInput {
    /// Create a new empty UpdatePostInput
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the slug
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Set the body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the publication timestamp string
    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = Some(published_at.into());
        self
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.slug.is_some()
            || self.body.is_some()
            || self.published_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_new() {
        let post = Post::new(
            "hello-world".to_string(),
            "Hello World".to_string(),
            "Body text".to_string(),
            None,
        );

        assert_eq!(post.id, 0);
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.title, "Hello World");
        assert!(post.published_at.is_none());
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_create_input_builder() {
        let input = CreatePostInput::with_title("My Post")
            .with_body("text")
            .with_published_at("2024-03-01 09:00:00");

        assert_eq!(input.title.as_deref(), Some("My Post"));
        assert_eq!(input.body.as_deref(), Some("text"));
        assert!(input.slug.is_none());
    }

    #[test]
    fn test_update_input_has_changes() {
        assert!(!UpdatePostInput::new().has_changes());
        assert!(UpdatePostInput::new().with_title("x").has_changes());
        assert!(UpdatePostInput::new().with_slug("x").has_changes());
    }

    #[test]
    fn test_create_input_ignores_unknown_fields() {
        let input: CreatePostInput = serde_json::from_str(
            r#"{"title": "Hi", "author": "not-a-fillable-field", "id": 99}"#,
        )
        .expect("Deserialization should succeed");

        assert_eq!(input.title.as_deref(), Some("Hi"));
        assert!(input.slug.is_none());
    }
}
