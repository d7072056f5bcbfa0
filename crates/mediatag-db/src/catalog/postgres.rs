use async_trait::async_trait;
use mediatag_core::{AppError, MediaAsset};
use sqlx::{PgPool, Postgres};

use super::CatalogStore;

#[derive(Debug, sqlx::FromRow)]
struct MediaAssetRow {
    key: String,
    original_name: String,
    extension: String,
    stored_url: String,
    tags: Vec<String>,
    created_at: i64,
}

impl From<MediaAssetRow> for MediaAsset {
    fn from(row: MediaAssetRow) -> Self {
        MediaAsset {
            key: row.key,
            original_name: row.original_name,
            extension: row.extension,
            stored_url: row.stored_url,
            tags: row.tags,
            created_at: row.created_at,
        }
    }
}

/// Catalog backed by the `media_assets` table
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    #[tracing::instrument(
        skip(self, asset),
        fields(db.table = "media_assets", db.operation = "upsert", key = %asset.key)
    )]
    async fn upsert(&self, asset: &MediaAsset) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO media_assets (key, original_name, extension, stored_url, tags, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (key) DO UPDATE SET
                original_name = EXCLUDED.original_name,
                extension = EXCLUDED.extension,
                stored_url = EXCLUDED.stored_url,
                tags = EXCLUDED.tags,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(&asset.key)
        .bind(&asset.original_name)
        .bind(&asset.extension)
        .bind(&asset.stored_url)
        .bind(&asset.tags)
        .bind(asset.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select"))]
    async fn get(&self, key: &str) -> Result<Option<MediaAsset>, AppError> {
        let row = sqlx::query_as::<Postgres, MediaAssetRow>(
            "SELECT key, original_name, extension, stored_url, tags, created_at FROM media_assets WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MediaAsset::from))
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select"))]
    async fn scan(&self) -> Result<Vec<MediaAsset>, AppError> {
        let rows = sqlx::query_as::<Postgres, MediaAssetRow>(
            "SELECT key, original_name, extension, stored_url, tags, created_at FROM media_assets ORDER BY created_at ASC, key ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MediaAsset::from).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "delete"))]
    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM media_assets WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
