//! PostgreSQL record store.
//!
//! Reads the `content_records` table the content pipeline writes to. Enum
//! columns are stored as their lowercase text form.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, QueryBuilder};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::common::{RecordId, UserId};
use crate::error::{StoreError, StoreResult};
use crate::traits::{RecordFilter, RecordStore};
use crate::types::{ContentRecord, Platform, RecordStatus, SourceType};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS content_records (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    content_group_id UUID,
    source_type TEXT NOT NULL DEFAULT 'social_post',
    platform TEXT NOT NULL DEFAULT 'none',
    status TEXT NOT NULL DEFAULT 'draft',
    published BOOLEAN NOT NULL DEFAULT FALSE,
    published_at TIMESTAMPTZ,
    platform_post_id TEXT,
    platform_post_url TEXT,
    discard BOOLEAN NOT NULL DEFAULT FALSE,
    parent_post_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_USER_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_content_records_user_created
    ON content_records (user_id, created_at DESC)
"#;

const SELECT_COLUMNS: &str = "SELECT id, user_id, content_group_id, source_type, platform, \
     status, published, published_at, platform_post_id, platform_post_url, discard, \
     parent_post_id, created_at FROM content_records";

pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    /// Connect and make sure the table exists.
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(backend)?;

        Self::from_pool(pool).await
    }

    /// Reuse an existing pool.
    pub async fn from_pool(pool: PgPool) -> StoreResult<Self> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        sqlx::query(CREATE_USER_INDEX)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    pub async fn insert(&self, record: &ContentRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO content_records (
                id, user_id, content_group_id, source_type, platform, status, published,
                published_at, platform_post_id, platform_post_url, discard, parent_post_id,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.content_group_id)
        .bind(record.source_type.to_string())
        .bind(record.platform.to_string())
        .bind(record.status.to_string())
        .bind(record.published)
        .bind(record.published_at)
        .bind(&record.platform_post_id)
        .bind(&record.platform_post_url)
        .bind(record.discard)
        .bind(record.parent_post_id)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    #[instrument(skip(self, filter))]
    async fn fetch_records(
        &self,
        user_id: UserId,
        filter: &RecordFilter,
    ) -> StoreResult<Vec<ContentRecord>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_COLUMNS);
        query
            .push(" WHERE discard = FALSE AND user_id = ")
            .push_bind(user_id);

        if let Some(from) = filter.from {
            query.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND created_at < ").push_bind(to);
        }
        if !filter.platforms.is_empty() {
            let platforms: Vec<String> = filter.platforms.iter().map(|p| p.to_string()).collect();
            query.push(" AND platform = ANY(").push_bind(platforms).push(")");
        }
        if !filter.statuses.is_empty() {
            let statuses: Vec<String> = filter.statuses.iter().map(|s| s.to_string()).collect();
            query.push(" AND status = ANY(").push_bind(statuses).push(")");
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows: Vec<RecordRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        debug!(count = rows.len(), "Fetched content records");

        rows.into_iter().map(ContentRecord::try_from).collect()
    }

    async fn discard(&self, user_id: UserId, record_id: RecordId) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE content_records SET discard = TRUE WHERE id = $1 AND user_id = $2")
                .bind(record_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id: record_id });
        }
        Ok(())
    }
}

#[derive(FromRow)]
struct RecordRow {
    id: Uuid,
    user_id: Uuid,
    content_group_id: Option<Uuid>,
    source_type: String,
    platform: String,
    status: String,
    published: bool,
    published_at: Option<DateTime<Utc>>,
    platform_post_id: Option<String>,
    platform_post_url: Option<String>,
    discard: bool,
    parent_post_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<RecordRow> for ContentRecord {
    type Error = StoreError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let invalid = |e: crate::error::ParseError| {
            StoreError::InvalidRecord(format!("record {}: {}", row.id, e))
        };

        Ok(ContentRecord {
            id: row.id.into(),
            user_id: row.user_id.into(),
            content_group_id: row.content_group_id.map(Into::into),
            source_type: row.source_type.parse::<SourceType>().map_err(invalid)?,
            platform: row.platform.parse::<Platform>().map_err(invalid)?,
            status: row.status.parse::<RecordStatus>().map_err(invalid)?,
            published: row.published,
            published_at: row.published_at,
            platform_post_id: row.platform_post_id,
            platform_post_url: row.platform_post_url,
            discard: row.discard,
            parent_post_id: row.parent_post_id.map(Into::into),
            created_at: row.created_at,
        })
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(Box::new(err))
}
