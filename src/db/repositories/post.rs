//! Post repository
//!
//! Database operations for posts.
//!
//! This module provides:
//! - `PostRepository` trait defining the interface for post data access
//! - `SqlxPostRepository` implementing the trait for SQLite and MySQL
//!
//! Inserts and updates surface duplicate slugs as the typed
//! [`UniqueViolation`](super::UniqueViolation) error.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Post;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use super::map_write_err;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post and return it with its assigned ID
    async fn create(&self, post: &Post) -> Result<Post>;

    /// Get post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Get post by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// List all posts, newest first
    async fn list(&self) -> Result<Vec<Post>>;

    /// Count total posts
    async fn count(&self) -> Result<i64>;

    /// Persist changes to an existing post
    async fn update(&self, post: &Post) -> Result<Post>;

    /// Delete a post
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// Check if a slug exists on a different post (for updates)
    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: i64) -> Result<bool>;
}

/// SQLx-based post repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository handle for service injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_post_sqlite(self.pool.as_sqlite().unwrap(), post).await,
            DatabaseDriver::Mysql => create_post_mysql(self.pool.as_mysql().unwrap(), post).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_post_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_post_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_post_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await
            }
            DatabaseDriver::Mysql => {
                get_post_by_slug_mysql(self.pool.as_mysql().unwrap(), slug).await
            }
        }
    }

    async fn list(&self) -> Result<Vec<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_posts_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_posts_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_posts_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_posts_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn update(&self, post: &Post) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_post_sqlite(self.pool.as_sqlite().unwrap(), post).await,
            DatabaseDriver::Mysql => update_post_mysql(self.pool.as_mysql().unwrap(), post).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_post_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_post_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                exists_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await
            }
            DatabaseDriver::Mysql => exists_by_slug_mysql(self.pool.as_mysql().unwrap(), slug).await,
        }
    }

    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                exists_by_slug_excluding_sqlite(self.pool.as_sqlite().unwrap(), slug, exclude_id)
                    .await
            }
            DatabaseDriver::Mysql => {
                exists_by_slug_excluding_mysql(self.pool.as_mysql().unwrap(), slug, exclude_id)
                    .await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(pool: &SqlitePool, post: &Post) -> Result<Post> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO posts (slug, title, body, published_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post.slug)
    .bind(&post.title)
    .bind(&post.body)
    .bind(post.published_at)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| map_write_err(e, "slug", "Failed to create post"))?;

    let id = result.last_insert_rowid();

    Ok(Post {
        id,
        slug: post.slug.clone(),
        title: post.title.clone(),
        body: post.body.clone(),
        published_at: post.published_at,
        created_at: now,
        updated_at: now,
    })
}

async fn get_post_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(
        r#"
        SELECT id, slug, title, body, published_at, created_at, updated_at
        FROM posts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get post by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_post_sqlite(&row))),
        None => Ok(None),
    }
}

async fn get_post_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Post>> {
    let row = sqlx::query(
        r#"
        SELECT id, slug, title, body, published_at, created_at, updated_at
        FROM posts
        WHERE slug = ?
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get post by slug")?;

    match row {
        Some(row) => Ok(Some(row_to_post_sqlite(&row))),
        None => Ok(None),
    }
}

async fn list_posts_sqlite(pool: &SqlitePool) -> Result<Vec<Post>> {
    let rows = sqlx::query(
        r#"
        SELECT id, slug, title, body, published_at, created_at, updated_at
        FROM posts
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list posts")?;

    Ok(rows.iter().map(row_to_post_sqlite).collect())
}

async fn count_posts_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts")
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok(row.get("count"))
}

async fn update_post_sqlite(pool: &SqlitePool, post: &Post) -> Result<Post> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE posts
        SET slug = ?, title = ?, body = ?, published_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&post.slug)
    .bind(&post.title)
    .bind(&post.body)
    .bind(post.published_at)
    .bind(now)
    .bind(post.id)
    .execute(pool)
    .await
    .map_err(|e| map_write_err(e, "slug", "Failed to update post"))?;

    get_post_by_id_sqlite(pool, post.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
}

async fn delete_post_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(())
}

async fn exists_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check post slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn exists_by_slug_excluding_sqlite(
    pool: &SqlitePool,
    slug: &str,
    exclude_id: i64,
) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE slug = ? AND id != ?")
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
        .context("Failed to check post slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        body: row.get("body"),
        published_at: row.get("published_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(pool: &MySqlPool, post: &Post) -> Result<Post> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO posts (slug, title, body, published_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post.slug)
    .bind(&post.title)
    .bind(&post.body)
    .bind(post.published_at)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| map_write_err(e, "slug", "Failed to create post"))?;

    let id = result.last_insert_id() as i64;

    Ok(Post {
        id,
        slug: post.slug.clone(),
        title: post.title.clone(),
        body: post.body.clone(),
        published_at: post.published_at,
        created_at: now,
        updated_at: now,
    })
}

async fn get_post_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(
        r#"
        SELECT id, slug, title, body, published_at, created_at, updated_at
        FROM posts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get post by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_post_mysql(&row))),
        None => Ok(None),
    }
}

async fn get_post_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Post>> {
    let row = sqlx::query(
        r#"
        SELECT id, slug, title, body, published_at, created_at, updated_at
        FROM posts
        WHERE slug = ?
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get post by slug")?;

    match row {
        Some(row) => Ok(Some(row_to_post_mysql(&row))),
        None => Ok(None),
    }
}

async fn list_posts_mysql(pool: &MySqlPool) -> Result<Vec<Post>> {
    let rows = sqlx::query(
        r#"
        SELECT id, slug, title, body, published_at, created_at, updated_at
        FROM posts
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list posts")?;

    Ok(rows.iter().map(row_to_post_mysql).collect())
}

async fn count_posts_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts")
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok(row.get("count"))
}

async fn update_post_mysql(pool: &MySqlPool, post: &Post) -> Result<Post> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE posts
        SET slug = ?, title = ?, body = ?, published_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&post.slug)
    .bind(&post.title)
    .bind(&post.body)
    .bind(post.published_at)
    .bind(now)
    .bind(post.id)
    .execute(pool)
    .await
    .map_err(|e| map_write_err(e, "slug", "Failed to update post"))?;

    get_post_by_id_mysql(pool, post.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
}

async fn delete_post_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(())
}

async fn exists_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check post slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn exists_by_slug_excluding_mysql(
    pool: &MySqlPool,
    slug: &str,
    exclude_id: i64,
) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE slug = ? AND id != ?")
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
        .context("Failed to check post slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Post {
    Post {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        body: row.get("body"),
        published_at: row.get("published_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::super::UniqueViolation;
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxPostRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxPostRepository::new(pool.clone());
        (pool, repo)
    }

    fn test_post(slug: &str, title: &str) -> Post {
        Post::new(
            slug.to_string(),
            title.to_string(),
            format!("Body for {}", title),
            None,
        )
    }

    #[tokio::test]
    async fn test_create_post() {
        let (_pool, repo) = setup_test_repo().await;

        let created = repo
            .create(&test_post("first-post", "First Post"))
            .await
            .expect("Failed to create post");

        assert!(created.id > 0);
        assert_eq!(created.slug, "first-post");
        assert_eq!(created.title, "First Post");
    }

    #[tokio::test]
    async fn test_create_duplicate_slug_is_unique_violation() {
        let (_pool, repo) = setup_test_repo().await;

        repo.create(&test_post("taken", "One"))
            .await
            .expect("First insert should succeed");

        let err = repo
            .create(&test_post("taken", "Two"))
            .await
            .expect_err("Duplicate slug should fail");

        let violation = err
            .downcast_ref::<UniqueViolation>()
            .expect("Error should downcast to UniqueViolation");
        assert_eq!(violation.column, "slug");
    }

    #[tokio::test]
    async fn test_get_post_by_id() {
        let (_pool, repo) = setup_test_repo().await;

        let created = repo
            .create(&test_post("get-by-id", "Get By ID"))
            .await
            .expect("Failed to create post");

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get post")
            .expect("Post not found");

        assert_eq!(found.id, created.id);
        assert_eq!(found.slug, "get-by-id");
    }

    #[tokio::test]
    async fn test_get_post_by_id_not_found() {
        let (_pool, repo) = setup_test_repo().await;

        let found = repo.get_by_id(99999).await.expect("Failed to get post");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_get_post_by_slug() {
        let (_pool, repo) = setup_test_repo().await;

        repo.create(&test_post("unique-slug", "Unique Slug"))
            .await
            .expect("Failed to create post");

        let found = repo
            .get_by_slug("unique-slug")
            .await
            .expect("Failed to get post")
            .expect("Post not found");

        assert_eq!(found.slug, "unique-slug");
    }

    #[tokio::test]
    async fn test_list_and_count_posts() {
        let (_pool, repo) = setup_test_repo().await;

        for i in 1..=3 {
            repo.create(&test_post(&format!("post-{}", i), &format!("Post {}", i)))
                .await
                .expect("Failed to create post");
        }

        let posts = repo.list().await.expect("Failed to list posts");
        assert_eq!(posts.len(), 3);

        let count = repo.count().await.expect("Failed to count posts");
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_update_post() {
        let (_pool, repo) = setup_test_repo().await;

        let mut created = repo
            .create(&test_post("to-update", "To Update"))
            .await
            .expect("Failed to create post");

        created.title = "Updated Title".to_string();
        created.body = "Updated body".to_string();

        let updated = repo.update(&created).await.expect("Failed to update post");

        assert_eq!(updated.title, "Updated Title");
        assert_eq!(updated.body, "Updated body");
        assert_eq!(updated.slug, "to-update");
        assert!(updated.updated_at >= created.created_at);
    }

    #[tokio::test]
    async fn test_update_post_duplicate_slug_is_unique_violation() {
        let (_pool, repo) = setup_test_repo().await;

        repo.create(&test_post("slug-1", "One"))
            .await
            .expect("Failed to create post");
        let mut second = repo
            .create(&test_post("slug-2", "Two"))
            .await
            .expect("Failed to create post");

        second.slug = "slug-1".to_string();
        let err = repo
            .update(&second)
            .await
            .expect_err("Duplicate slug should fail");

        assert!(err.downcast_ref::<UniqueViolation>().is_some());
    }

    #[tokio::test]
    async fn test_delete_post() {
        let (_pool, repo) = setup_test_repo().await;

        let created = repo
            .create(&test_post("to-delete", "To Delete"))
            .await
            .expect("Failed to create post");

        repo.delete(created.id).await.expect("Failed to delete post");

        let found = repo.get_by_id(created.id).await.expect("Failed to get post");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_exists_by_slug() {
        let (_pool, repo) = setup_test_repo().await;

        assert!(!repo.exists_by_slug("x").await.expect("Failed to check"));

        repo.create(&test_post("x", "X"))
            .await
            .expect("Failed to create post");

        assert!(repo.exists_by_slug("x").await.expect("Failed to check"));
    }

    #[tokio::test]
    async fn test_exists_by_slug_excluding() {
        let (_pool, repo) = setup_test_repo().await;

        let first = repo
            .create(&test_post("slug-1", "One"))
            .await
            .expect("Failed to create post");
        let second = repo
            .create(&test_post("slug-2", "Two"))
            .await
            .expect("Failed to create post");

        assert!(repo
            .exists_by_slug_excluding("slug-1", second.id)
            .await
            .expect("Failed to check"));
        assert!(!repo
            .exists_by_slug_excluding("slug-1", first.id)
            .await
            .expect("Failed to check"));
    }

    #[tokio::test]
    async fn test_published_at_round_trip() {
        let (_pool, repo) = setup_test_repo().await;

        let published = Utc::now();
        let mut post = test_post("published", "Published");
        post.published_at = Some(published);

        let created = repo.create(&post).await.expect("Failed to create post");
        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get post")
            .expect("Post not found");

        let stored = found.published_at.expect("published_at should be stored");
        assert_eq!(stored.timestamp(), published.timestamp());
    }
}
