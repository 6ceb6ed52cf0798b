//! Tag model
//!
//! This module defines the Tag entity and its input types. Tags follow the
//! same slug-uniqueness pattern as posts but carry no publication timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::validator::Rule;

/// Tag entity representing a content label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug, unique across all tags
    pub slug: String,
    /// Tag name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Create a new Tag with the given parameters.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(slug: String, name: String) -> Self {
        Self {
            id: 0,
            slug,
            name,
            created_at: Utc::now(),
        }
    }

    /// Validation rules for the tag entity.
    pub fn rules() -> &'static [(&'static str, &'static [Rule])] {
        &[
            ("name", &[Rule::Required, Rule::Max(100)]),
            ("slug", &[Rule::Required, Rule::Max(100)]),
        ]
    }
}

/// Input for creating a new tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTagInput {
    /// Tag name
    #[serde(default)]
    pub name: Option<String>,
    /// Explicit slug; when absent one is derived from the name
    #[serde(default)]
    pub slug: Option<String>,
}

impl CreateTagInput {
    /// Create an input with just a name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            slug: None,
        }
    }

    /// Set the slug
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}

/// Input for updating an existing tag. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTagInput {
    /// New name (optional)
    #[serde(default)]
    pub name: Option<String>,
    /// New slug (optional)
    #[serde(default)]
    pub slug: Option<String>,
}

impl UpdateTagInput {
    /// Create a new empty UpdateTagInput
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the slug
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}
