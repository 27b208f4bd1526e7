use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::StoreResult;
use crate::search::SearchHit;

/// Text search over lecturers and campuses
///
/// `full_text_*` is the ranked primary strategy. `pattern_*` takes an already
/// escaped pattern and matches it case-insensitively; it is the fallback.
/// `campus_pattern` restricts lecturers to universities matching the pattern.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn full_text_campuses(&self, query: &str, limit: i64) -> StoreResult<Vec<SearchHit>>;

    async fn full_text_lecturers(
        &self,
        query: &str,
        campus_pattern: Option<&str>,
        limit: i64,
    ) -> StoreResult<Vec<SearchHit>>;

    async fn pattern_campuses(&self, pattern: &str, limit: i64) -> StoreResult<Vec<SearchHit>>;

    async fn pattern_lecturers(
        &self,
        pattern: &str,
        campus_pattern: Option<&str>,
        limit: i64,
    ) -> StoreResult<Vec<SearchHit>>;
}

/// PostgreSQL search using `tsvector` matching with a `~*` fallback
#[derive(Clone)]
pub struct PgSearchIndex {
    pool: PgPool,
}

impl PgSearchIndex {
    /// Create a new PgSearchIndex
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchIndex for PgSearchIndex {
    async fn full_text_campuses(&self, query: &str, limit: i64) -> StoreResult<Vec<SearchHit>> {
        let hits = sqlx::query_as::<_, SearchHit>(
            r#"
            SELECT id, name
            FROM campuses
            WHERE to_tsvector('simple', name || ' ' || address || ' ' || COALESCE(description, ''))
                  @@ websearch_to_tsquery('simple', $1)
            ORDER BY ts_rank(
                to_tsvector('simple', name || ' ' || address || ' ' || COALESCE(description, '')),
                websearch_to_tsquery('simple', $1)
            ) DESC, name
            LIMIT $2
            "#,
        )
        .bind(query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(hits)
    }

    async fn full_text_lecturers(
        &self,
        query: &str,
        campus_pattern: Option<&str>,
        limit: i64,
    ) -> StoreResult<Vec<SearchHit>> {
        // With a campus filter the university column is matched by pattern only
        let hits = sqlx::query_as::<_, SearchHit>(
            r#"
            WITH documents AS (
                SELECT id, name,
                       to_tsvector(
                           'simple',
                           name || ' ' || department || ' ' || array_to_string(courses, ' ')
                           || CASE WHEN $2::text IS NULL THEN ' ' || university ELSE '' END
                       ) AS document
                FROM lecturers
                WHERE $2::text IS NULL OR university ~* $2
            )
            SELECT id, name
            FROM documents
            WHERE document @@ websearch_to_tsquery('simple', $1)
            ORDER BY ts_rank(document, websearch_to_tsquery('simple', $1)) DESC, name
            LIMIT $3
            "#,
        )
        .bind(query)
        .bind(campus_pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(hits)
    }

    async fn pattern_campuses(&self, pattern: &str, limit: i64) -> StoreResult<Vec<SearchHit>> {
        let hits = sqlx::query_as::<_, SearchHit>(
            r#"
            SELECT id, name
            FROM campuses
            WHERE name ~* $1 OR address ~* $1 OR description ~* $1
            ORDER BY name
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(hits)
    }

    async fn pattern_lecturers(
        &self,
        pattern: &str,
        campus_pattern: Option<&str>,
        limit: i64,
    ) -> StoreResult<Vec<SearchHit>> {
        let hits = sqlx::query_as::<_, SearchHit>(
            r#"
            SELECT id, name
            FROM lecturers
            WHERE ($2::text IS NULL OR university ~* $2)
              AND (name ~* $1
                   OR department ~* $1
                   OR EXISTS (SELECT 1 FROM unnest(courses) AS course WHERE course ~* $1))
            ORDER BY name
            LIMIT $3
            "#,
        )
        .bind(pattern)
        .bind(campus_pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(hits)
    }
}
