//! Tag service
//!
//! The record workflow for tags: the same slug-uniqueness algorithm as the
//! post service, applied to the tag name, without a publication timestamp.

use crate::db::repositories::{TagRepository, UniqueViolation};
use crate::models::{CreateTagInput, Tag, UpdateTagInput};
use crate::services::slug::slugify;
use crate::services::validator::{self, FieldErrors, FieldSnapshot, SLUG_TAKEN_MESSAGE};
use anyhow::Context;
use std::sync::Arc;

/// Upper bound on insert attempts when derived slugs keep losing races.
const MAX_SLUG_INSERT_ATTEMPTS: u32 = 3;

/// Error types for tag service operations
#[derive(Debug, thiserror::Error)]
pub enum TagServiceError {
    /// Tag not found
    #[error("Tag not found")]
    NotFound,

    /// One or more field-level rule violations
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl TagServiceError {
    fn slug_taken() -> Self {
        Self::Validation(FieldErrors::single("slug", SLUG_TAKEN_MESSAGE))
    }
}

/// Tag service implementing the record workflow over a repository.
pub struct TagService {
    repo: Arc<dyn TagRepository>,
}

impl TagService {
    /// Create a new tag service
    pub fn new(repo: Arc<dyn TagRepository>) -> Self {
        Self { repo }
    }

    /// List all tags.
    pub async fn index(&self) -> Result<Vec<Tag>, TagServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list tags")
            .map_err(Into::into)
    }

    /// Retrieve a single tag by ID.
    pub async fn read(&self, id: i64) -> Result<Tag, TagServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get tag")?
            .ok_or(TagServiceError::NotFound)
    }

    /// Create a new tag, deriving a unique slug from the name when no slug
    /// is supplied. Manual slugs are checked once; a conflict is a field
    /// error.
    pub async fn create(&self, input: CreateTagInput) -> Result<Tag, TagServiceError> {
        let manual_slug = input
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let name = input.name.clone().unwrap_or_default();

        let slug = match &manual_slug {
            Some(slug) => {
                if self
                    .repo
                    .exists_by_slug(slug)
                    .await
                    .context("Failed to check slug uniqueness")?
                {
                    return Err(TagServiceError::slug_taken());
                }
                slug.clone()
            }
            None => self.resolve_unique_slug(&name).await?,
        };

        let snapshot = FieldSnapshot::from([
            ("name", input.name.clone()),
            ("slug", Some(slug.clone())),
        ]);
        validator::validate(Tag::rules(), &snapshot).map_err(TagServiceError::Validation)?;

        let mut tag = Tag::new(slug, name);

        let mut attempts = 0;
        loop {
            match self.repo.create(&tag).await {
                Ok(created) => {
                    tracing::info!(id = created.id, slug = %created.slug, "tag created");
                    return Ok(created);
                }
                Err(err) if err.downcast_ref::<UniqueViolation>().is_some() => {
                    if manual_slug.is_some() {
                        return Err(TagServiceError::slug_taken());
                    }
                    attempts += 1;
                    if attempts >= MAX_SLUG_INSERT_ATTEMPTS {
                        return Err(TagServiceError::slug_taken());
                    }
                    tracing::warn!(slug = %tag.slug, "slug taken at commit time, regenerating");
                    tag.slug = self.resolve_unique_slug(&tag.name).await?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Update an existing tag. The slug is never re-derived from a changed
    /// name; explicit slug changes are checked for conflicts.
    pub async fn update(&self, id: i64, input: UpdateTagInput) -> Result<Tag, TagServiceError> {
        let mut tag = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get tag")?
            .ok_or(TagServiceError::NotFound)?;

        if let Some(name) = input.name.clone() {
            tag.name = name;
        }
        if let Some(slug) = input.slug.as_deref().map(str::trim) {
            if slug != tag.slug {
                if self
                    .repo
                    .exists_by_slug_excluding(slug, id)
                    .await
                    .context("Failed to check slug uniqueness")?
                {
                    return Err(TagServiceError::slug_taken());
                }
                tag.slug = slug.to_string();
            }
        }

        let snapshot = FieldSnapshot::from([
            ("name", Some(tag.name.clone())),
            ("slug", Some(tag.slug.clone())),
        ]);
        validator::validate(Tag::rules(), &snapshot).map_err(TagServiceError::Validation)?;

        match self.repo.update(&tag).await {
            Ok(updated) => {
                tracing::info!(id = updated.id, slug = %updated.slug, "tag updated");
                Ok(updated)
            }
            Err(err) if err.downcast_ref::<UniqueViolation>().is_some() => {
                Err(TagServiceError::slug_taken())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Delete a tag. A second delete of the same ID reports `NotFound`.
    pub async fn delete(&self, id: i64) -> Result<(), TagServiceError> {
        let tag = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get tag")?
            .ok_or(TagServiceError::NotFound)?;

        self.repo
            .delete(tag.id)
            .await
            .context("Failed to delete tag")?;

        tracing::info!(id, slug = %tag.slug, "tag deleted");
        Ok(())
    }

    async fn resolve_unique_slug(&self, name: &str) -> Result<String, TagServiceError> {
        let base = slugify(name);

        if !self
            .repo
            .exists_by_slug(&base)
            .await
            .context("Failed to check slug uniqueness")?
        {
            return Ok(base);
        }

        let mut suffix: u64 = 2;
        loop {
            let candidate = format!("{}-{}", base, suffix);
            if !self
                .repo
                .exists_by_slug(&candidate)
                .await
                .context("Failed to check slug uniqueness")?
            {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }
}
