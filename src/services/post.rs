//! Post service
//!
//! Implements the record workflow for posts:
//! - Index, read, create, update, delete
//! - Unique slug resolution from the title
//! - Declarative validation with field-level errors
//!
//! Uniqueness is checked against storage before inserting, but the UNIQUE
//! index on the slug column is the final authority: a commit that loses a
//! concurrent race comes back as a `UniqueViolation`, which this service
//! converts into a retry (derived slugs) or a field error (manual slugs).
//! No in-process lock is taken; collisions must be safe across processes,
//! not just threads.

use crate::db::repositories::{PostRepository, UniqueViolation};
use crate::models::{CreatePostInput, Post, UpdatePostInput};
use crate::services::slug::slugify;
use crate::services::validator::{
    self, parse_datetime, FieldErrors, FieldSnapshot, SLUG_TAKEN_MESSAGE,
};
use anyhow::Context;
use std::sync::Arc;

/// Upper bound on insert attempts when derived slugs keep losing races.
const MAX_SLUG_INSERT_ATTEMPTS: u32 = 3;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post not found
    #[error("Post not found")]
    NotFound,

    /// One or more field-level rule violations
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PostServiceError {
    fn slug_taken() -> Self {
        Self::Validation(FieldErrors::single("slug", SLUG_TAKEN_MESSAGE))
    }
}

/// Post service implementing the record workflow over a repository.
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    /// Create a new post service
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// List all posts, newest first.
    pub async fn index(&self) -> Result<Vec<Post>, PostServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list posts")
            .map_err(Into::into)
    }

    /// Retrieve a single post by ID.
    pub async fn read(&self, id: i64) -> Result<Post, PostServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or(PostServiceError::NotFound)
    }

    /// Retrieve a single post by slug.
    pub async fn read_by_slug(&self, slug: &str) -> Result<Post, PostServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to get post")?
            .ok_or(PostServiceError::NotFound)
    }

    /// Create a new post.
    ///
    /// When no slug is supplied one is derived from the title and suffixed
    /// (`-2`, `-3`, …) until free. A manually supplied slug is checked once
    /// and a conflict is reported as a field error instead of being
    /// auto-resolved; choosing a slug by hand means owning it.
    pub async fn create(&self, input: CreatePostInput) -> Result<Post, PostServiceError> {
        let manual_slug = input
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let title = input.title.clone().unwrap_or_default();

        let slug = match &manual_slug {
            Some(slug) => {
                if self
                    .repo
                    .exists_by_slug(slug)
                    .await
                    .context("Failed to check slug uniqueness")?
                {
                    return Err(PostServiceError::slug_taken());
                }
                slug.clone()
            }
            None => self.resolve_unique_slug(&title).await?,
        };

        let snapshot = FieldSnapshot::from([
            ("title", input.title.clone()),
            ("slug", Some(slug.clone())),
            ("published_at", input.published_at.clone()),
        ]);
        validator::validate(Post::rules(), &snapshot).map_err(PostServiceError::Validation)?;

        let published_at = input.published_at.as_deref().and_then(parse_datetime);
        let mut post = Post::new(
            slug,
            title,
            input.body.clone().unwrap_or_default(),
            published_at,
        );

        let mut attempts = 0;
        loop {
            match self.repo.create(&post).await {
                Ok(created) => {
                    tracing::info!(id = created.id, slug = %created.slug, "post created");
                    return Ok(created);
                }
                Err(err) if err.downcast_ref::<UniqueViolation>().is_some() => {
                    if manual_slug.is_some() {
                        return Err(PostServiceError::slug_taken());
                    }
                    attempts += 1;
                    if attempts >= MAX_SLUG_INSERT_ATTEMPTS {
                        return Err(PostServiceError::slug_taken());
                    }
                    tracing::warn!(slug = %post.slug, "slug taken at commit time, regenerating");
                    post.slug = self.resolve_unique_slug(&post.title).await?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Update an existing post.
    ///
    /// Absent input fields leave the stored values untouched. The slug is
    /// never re-derived from a changed title; an explicitly supplied slug is
    /// checked against every other post and conflicts come back as field
    /// errors.
    pub async fn update(&self, id: i64, input: UpdatePostInput) -> Result<Post, PostServiceError> {
        let mut post = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or(PostServiceError::NotFound)?;

        if let Some(title) = input.title.clone() {
            post.title = title;
        }
        if let Some(body) = input.body.clone() {
            post.body = body;
        }
        if let Some(slug) = input.slug.as_deref().map(str::trim) {
            if slug != post.slug {
                if self
                    .repo
                    .exists_by_slug_excluding(slug, id)
                    .await
                    .context("Failed to check slug uniqueness")?
                {
                    return Err(PostServiceError::slug_taken());
                }
                post.slug = slug.to_string();
            }
        }

        let snapshot = FieldSnapshot::from([
            ("title", Some(post.title.clone())),
            ("slug", Some(post.slug.clone())),
            ("published_at", input.published_at.clone()),
        ]);
        validator::validate(Post::rules(), &snapshot).map_err(PostServiceError::Validation)?;

        if let Some(raw) = input.published_at.as_deref() {
            post.published_at = parse_datetime(raw);
        }

        match self.repo.update(&post).await {
            Ok(updated) => {
                tracing::info!(id = updated.id, slug = %updated.slug, "post updated");
                Ok(updated)
            }
            Err(err) if err.downcast_ref::<UniqueViolation>().is_some() => {
                Err(PostServiceError::slug_taken())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Delete a post. A second delete of the same ID reports `NotFound`.
    pub async fn delete(&self, id: i64) -> Result<(), PostServiceError> {
        let post = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or(PostServiceError::NotFound)?;

        self.repo
            .delete(post.id)
            .await
            .context("Failed to delete post")?;

        tracing::info!(id, slug = %post.slug, "post deleted");
        Ok(())
    }

    /// Derive a slug from the title that is free at the moment of check.
    async fn resolve_unique_slug(&self, title: &str) -> Result<String, PostServiceError> {
        let base = slugify(title);

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
