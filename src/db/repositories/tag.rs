//! Tag repository
//!
//! Database operations for tags: the same access pattern as posts, minus
//! the publication timestamp. Duplicate slugs surface as
//! [`UniqueViolation`](super::UniqueViolation).

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Tag;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use super::map_write_err;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Insert a new tag and return it with its assigned ID
    async fn create(&self, tag: &Tag) -> Result<Tag>;

    /// Get tag by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>>;

    /// Get tag by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>>;

    /// List all tags, alphabetically by name
    async fn list(&self) -> Result<Vec<Tag>>;

    /// Persist changes to an existing tag
    async fn update(&self, tag: &Tag) -> Result<Tag>;

    /// Delete a tag
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// Check if a slug exists on a different tag (for updates)
    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: i64) -> Result<bool>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: DynDatabasePool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository handle for service injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, tag: &Tag) -> Result<Tag> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_tag_sqlite(self.pool.as_sqlite().unwrap(), tag).await,
            DatabaseDriver::Mysql => create_tag_mysql(self.pool.as_mysql().unwrap(), tag).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_tag_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_tag_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_tag_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await
            }
            DatabaseDriver::Mysql => get_tag_by_slug_mysql(self.pool.as_mysql().unwrap(), slug).await,
        }
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_tags_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_tags_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn update(&self, tag: &Tag) -> Result<Tag> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_tag_sqlite(self.pool.as_sqlite().unwrap(), tag).await,
            DatabaseDriver::Mysql => update_tag_mysql(self.pool.as_mysql().unwrap(), tag).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_tag_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_tag_mysql(self.pool.as_mysql().unwrap(), id).await,
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

async fn create_tag_sqlite(pool: &SqlitePool, tag: &Tag) -> Result<Tag> {
    let now = Utc::now();

    let result = sqlx::query("INSERT INTO tags (slug, name, created_at) VALUES (?, ?, ?)")
        .bind(&tag.slug)
        .bind(&tag.name)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| map_write_err(e, "slug", "Failed to create tag"))?;

    Ok(Tag {
        id: result.last_insert_rowid(),
        slug: tag.slug.clone(),
        name: tag.name.clone(),
        created_at: now,
    })
}

async fn get_tag_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Tag>> {
    let row = sqlx::query("SELECT id, slug, name, created_at FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get tag by ID")?;

    Ok(row.map(|row| row_to_tag_sqlite(&row)))
}

async fn get_tag_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Tag>> {
    let row = sqlx::query("SELECT id, slug, name, created_at FROM tags WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get tag by slug")?;

    Ok(row.map(|row| row_to_tag_sqlite(&row)))
}

async fn list_tags_sqlite(pool: &SqlitePool) -> Result<Vec<Tag>> {
    let rows = sqlx::query("SELECT id, slug, name, created_at FROM tags ORDER BY name ASC")
        .fetch_all(pool)
        .await
        .context("Failed to list tags")?;

    Ok(rows.iter().map(row_to_tag_sqlite).collect())
}

async fn update_tag_sqlite(pool: &SqlitePool, tag: &Tag) -> Result<Tag> {
    sqlx::query("UPDATE tags SET slug = ?, name = ? WHERE id = ?")
        .bind(&tag.slug)
        .bind(&tag.name)
        .bind(tag.id)
        .execute(pool)
        .await
        .map_err(|e| map_write_err(e, "slug", "Failed to update tag"))?;

    get_tag_by_id_sqlite(pool, tag.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Tag not found after update"))
}

async fn delete_tag_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete tag")?;

    Ok(())
}

async fn exists_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM tags WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check tag slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn exists_by_slug_excluding_sqlite(
    pool: &SqlitePool,
    slug: &str,
    exclude_id: i64,
) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM tags WHERE slug = ? AND id != ?")
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
        .context("Failed to check tag slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

fn row_to_tag_sqlite(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_tag_mysql(pool: &MySqlPool, tag: &Tag) -> Result<Tag> {
    let now = Utc::now();

    let result = sqlx::query("INSERT INTO tags (slug, name, created_at) VALUES (?, ?, ?)")
        .bind(&tag.slug)
        .bind(&tag.name)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| map_write_err(e, "slug", "Failed to create tag"))?;

    Ok(Tag {
        id: result.last_insert_id() as i64,
        slug: tag.slug.clone(),
        name: tag.name.clone(),
        created_at: now,
    })
}

async fn get_tag_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Tag>> {
    let row = sqlx::query("SELECT id, slug, name, created_at FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get tag by ID")?;

    Ok(row.map(|row| row_to_tag_mysql(&row)))
}

async fn get_tag_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Tag>> {
    let row = sqlx::query("SELECT id, slug, name, created_at FROM tags WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get tag by slug")?;

    Ok(row.map(|row| row_to_tag_mysql(&row)))
}

async fn list_tags_mysql(pool: &MySqlPool) -> Result<Vec<Tag>> {
    let rows = sqlx::query("SELECT id, slug, name, created_at FROM tags ORDER BY name ASC")
        .fetch_all(pool)
        .await
        .context("Failed to list tags")?;

    Ok(rows.iter().map(row_to_tag_mysql).collect())
}

async fn update_tag_mysql(pool: &MySqlPool, tag: &Tag) -> Result<Tag> {
    sqlx::query("UPDATE tags SET slug = ?, name = ? WHERE id = ?")
        .bind(&tag.slug)
        .bind(&tag.name)
        .bind(tag.id)
        .execute(pool)
        .await
        .map_err(|e| map_write_err(e, "slug", "Failed to update tag"))?;

    get_tag_by_id_mysql(pool, tag.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Tag not found after update"))
}

async fn delete_tag_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete tag")?;

    Ok(())
}

async fn exists_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM tags WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check tag slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn exists_by_slug_excluding_mysql(
    pool: &MySqlPool,
    slug: &str,
    exclude_id: i64,
) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM tags WHERE slug = ? AND id != ?")
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
        .context("Failed to check tag slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

fn row_to_tag_mysql(row: &sqlx::mysql::MySqlRow) -> Tag {
    Tag {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::super::UniqueViolation;
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxTagRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxTagRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_tag() {
        let repo = setup_test_repo().await;

        let created = repo
            .create(&Tag::new("rust".to_string(), "Rust".to_string()))
            .await
            .expect("Failed to create tag");

        assert!(created.id > 0);

        let by_id = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get tag")
            .expect("Tag not found");
        assert_eq!(by_id.name, "Rust");

        let by_slug = repo
            .get_by_slug("rust")
            .await
            .expect("Failed to get tag")
            .expect("Tag not found");
        assert_eq!(by_slug.id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_tag_slug_is_unique_violation() {
        let repo = setup_test_repo().await;

        repo.create(&Tag::new("dup".to_string(), "One".to_string()))
            .await
            .expect("First insert should succeed");

        let err = repo
            .create(&Tag::new("dup".to_string(), "Two".to_string()))
            .await
            .expect_err("Duplicate slug should fail");

        assert!(err.downcast_ref::<UniqueViolation>().is_some());
    }

    #[tokio::test]
    async fn test_list_tags_sorted_by_name() {
        let repo = setup_test_repo().await;

        for (slug, name) in [("zig", "Zig"), ("ada", "Ada"), ("moon", "Moon")] {
            repo.create(&Tag::new(slug.to_string(), name.to_string()))
                .await
                .expect("Failed to create tag");
        }

        let tags = repo.list().await.expect("Failed to list tags");
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Moon", "Zig"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_tag() {
        let repo = setup_test_repo().await;

        let mut tag = repo
            .create(&Tag::new("old".to_string(), "Old".to_string()))
            .await
            .expect("Failed to create tag");

        tag.name = "New".to_string();
        let updated = repo.update(&tag).await.expect("Failed to update tag");
        assert_eq!(updated.name, "New");
        assert_eq!(updated.slug, "old");

        repo.delete(tag.id).await.expect("Failed to delete tag");
        assert!(repo
            .get_by_id(tag.id)
            .await
            .expect("Failed to get tag")
            .is_none());
    }

    #[tokio::test]
    async fn test_exists_by_slug_excluding() {
        let repo = setup_test_repo().await;

        let first = repo
            .create(&Tag::new("a".to_string(), "A".to_string()))
            .await
            .expect("Failed to create tag");
        let second = repo
            .create(&Tag::new("b".to_string(), "B".to_string()))
            .await
            .expect("Failed to create tag");

        assert!(repo
            .exists_by_slug_excluding("a", second.id)
            .await
            .expect("Failed to check"));
        assert!(!repo
            .exists_by_slug_excluding("a", first.id)
            .await
            .expect("Failed to check"));
    }
}
