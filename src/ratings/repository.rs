use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Row};
use std::marker::PhantomData;

use crate::error::StoreResult;
use crate::ids::ObjectId;
use crate::ratings::{RatingChanges, RatingFilter, RatingKind, RatingRecord, TargetAggregate};

/// Persistence of rating records for one target kind
#[async_trait]
pub trait RatingStore<K: RatingKind>: Send + Sync {
    /// Persist a new record and return it as stored
    async fn insert(&self, record: RatingRecord<K>) -> StoreResult<RatingRecord<K>>;

    /// All records matching the filter, newest first
    async fn find_many(&self, filter: RatingFilter) -> StoreResult<Vec<RatingRecord<K>>>;

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<RatingRecord<K>>>;

    /// Apply a partial overwrite; `None` when no record has this id
    async fn update_by_id(
        &self,
        id: &ObjectId,
        changes: &RatingChanges,
    ) -> StoreResult<Option<RatingRecord<K>>>;

    /// Delete and return the record; `None` when no record has this id
    async fn delete_by_id(&self, id: &ObjectId) -> StoreResult<Option<RatingRecord<K>>>;
}

/// Write access to the denormalized aggregate fields of one target kind
#[async_trait]
pub trait AggregateStore<K: RatingKind>: Send + Sync {
    /// Overwrite average and count. Returns false when the target does not exist
    async fn write_aggregate(&self, target_id: &ObjectId, aggregate: TargetAggregate)
        -> StoreResult<bool>;
}

impl<'r, K: RatingKind> FromRow<'r, PgRow> for RatingRecord<K> {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let Json(scores): Json<K::Scores> = row.try_get("scores")?;
        let Json(details): Json<K::Details> = row.try_get("details")?;

        Ok(Self {
            id: row.try_get("id")?,
            author_id: row.try_get("author_id")?,
            target_id: row.try_get("target_id")?,
            scores,
            details,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

const RECORD_COLUMNS: &str = "id, author_id, target_id, scores, details, created_at, updated_at";

/// PostgreSQL rating store; scores and details are JSONB documents
pub struct PgRatingStore<K: RatingKind> {
    pool: PgPool,
    kind: PhantomData<K>,
}

impl<K: RatingKind> PgRatingStore<K> {
    /// Create a new PgRatingStore
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            kind: PhantomData,
        }
    }
}

#[async_trait]
impl<K: RatingKind> RatingStore<K> for PgRatingStore<K> {
    async fn insert(&self, record: RatingRecord<K>) -> StoreResult<RatingRecord<K>> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, author_id, target_id, scores, details, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            K::RECORD_TABLE,
            RECORD_COLUMNS
        );

        let stored = sqlx::query_as::<_, RatingRecord<K>>(&sql)
            .bind(&record.id)
            .bind(&record.author_id)
            .bind(&record.target_id)
            .bind(Json(&record.scores))
            .bind(Json(&record.details))
            .bind(record.created_at)
            .bind(record.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(stored)
    }

    async fn find_many(&self, filter: RatingFilter) -> StoreResult<Vec<RatingRecord<K>>> {
        let (condition, value) = match filter {
            RatingFilter::All => ("TRUE", None),
            RatingFilter::Target(id) => ("target_id = $1", Some(id)),
            RatingFilter::Author(id) => ("author_id = $1", Some(id)),
        };

        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY created_at DESC, id DESC",
            RECORD_COLUMNS,
            K::RECORD_TABLE,
            condition
        );

        let mut query = sqlx::query_as::<_, RatingRecord<K>>(&sql);
        if let Some(id) = value {
            query = query.bind(id);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<RatingRecord<K>>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            RECORD_COLUMNS,
            K::RECORD_TABLE
        );

        let record = sqlx::query_as::<_, RatingRecord<K>>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn update_by_id(
        &self,
        id: &ObjectId,
        changes: &RatingChanges,
    ) -> StoreResult<Option<RatingRecord<K>>> {
        // `||` merges top-level keys of the stored document with the patch
        let sql = format!(
            r#"
            UPDATE {}
            SET target_id = COALESCE($2, target_id),
                scores = scores || $3,
                details = details || $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            K::RECORD_TABLE,
            RECORD_COLUMNS
        );

        let record = sqlx::query_as::<_, RatingRecord<K>>(&sql)
            .bind(id)
            .bind(changes.target_id.as_ref())
            .bind(Json(&changes.scores))
            .bind(Json(&changes.details))
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn delete_by_id(&self, id: &ObjectId) -> StoreResult<Option<RatingRecord<K>>> {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 RETURNING {}",
            K::RECORD_TABLE,
            RECORD_COLUMNS
        );

        let record = sqlx::query_as::<_, RatingRecord<K>>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }
}

/// PostgreSQL aggregate writer targeting `K::TARGET_TABLE`
pub struct PgAggregateStore<K: RatingKind> {
    pool: PgPool,
    kind: PhantomData<K>,
}

impl<K: RatingKind> PgAggregateStore<K> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            kind: PhantomData,
        }
    }
}

#[async_trait]
impl<K: RatingKind> AggregateStore<K> for PgAggregateStore<K> {
    async fn write_aggregate(
        &self,
        target_id: &ObjectId,
        aggregate: TargetAggregate,
    ) -> StoreResult<bool> {
        let sql = format!(
            "UPDATE {} SET {} = $1, count = $2, updated_at = NOW() WHERE id = $3",
            K::TARGET_TABLE,
            K::AVERAGE_COLUMN
        );

        let result = sqlx::query(&sql)
            .bind(aggregate.average_score)
            .bind(aggregate.record_count)
            .bind(target_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
