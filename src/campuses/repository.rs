use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::StoreResult;
use crate::ids::ObjectId;
use crate::campuses::{Campus, UpdateCampus};

/// Persistence of campus entities
#[async_trait]
pub trait CampusStore: Send + Sync {
    async fn insert(&self, campus: Campus) -> StoreResult<Campus>;

    /// All campuses ordered by name
    async fn find_all(&self) -> StoreResult<Vec<Campus>>;

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<Campus>>;

    async fn update_by_id(&self, id: &ObjectId, update: &UpdateCampus)
        -> StoreResult<Option<Campus>>;

    async fn delete_by_id(&self, id: &ObjectId) -> StoreResult<Option<Campus>>;

    /// Ids of every campus, for aggregate reconciliation
    async fn ids(&self) -> StoreResult<Vec<ObjectId>>;
}

const CAMPUS_COLUMNS: &str =
    "id, name, address, description, image_url, overall_rating, count, created_at, updated_at";

/// PostgreSQL campus store
#[derive(Clone)]
pub struct PgCampusStore {
    pool: PgPool,
}

impl PgCampusStore {
    /// Create a new PgCampusStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampusStore for PgCampusStore {
    async fn insert(&self, campus: Campus) -> StoreResult<Campus> {
        let sql = format!(
            r#"
            INSERT INTO campuses (id, name, address, description, image_url, overall_rating, count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            CAMPUS_COLUMNS
        );

        let stored = sqlx::query_as::<_, Campus>(&sql)
            .bind(&campus.id)
            .bind(&campus.name)
            .bind(&campus.address)
            .bind(&campus.description)
            .bind(&campus.image_url)
            .bind(campus.overall_rating)
            .bind(campus.count)
            .bind(campus.created_at)
            .bind(campus.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(stored)
    }

    async fn find_all(&self) -> StoreResult<Vec<Campus>> {
        let sql = format!("SELECT {} FROM campuses ORDER BY name, id", CAMPUS_COLUMNS);

        let campuses = sqlx::query_as::<_, Campus>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(campuses)
    }

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<Campus>> {
        let sql = format!("SELECT {} FROM campuses WHERE id = $1", CAMPUS_COLUMNS);

        let campus = sqlx::query_as::<_, Campus>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(campus)
    }

    async fn update_by_id(
        &self,
        id: &ObjectId,
        update: &UpdateCampus,
    ) -> StoreResult<Option<Campus>> {
        let sql = format!(
            r#"
            UPDATE campuses
            SET name = COALESCE($2, name),
                address = COALESCE($3, address),
                description = COALESCE($4, description),
                image_url = COALESCE($5, image_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CAMPUS_COLUMNS
        );

        let campus = sqlx::query_as::<_, Campus>(&sql)
            .bind(id)
            .bind(update.name.as_deref())
            .bind(update.address.as_deref())
            .bind(update.description.as_deref())
            .bind(update.image_url.as_deref())
            .fetch_optional(&self.pool)
            .await?;

        Ok(campus)
    }

    async fn delete_by_id(&self, id: &ObjectId) -> StoreResult<Option<Campus>> {
        let sql = format!("DELETE FROM campuses WHERE id = $1 RETURNING {}", CAMPUS_COLUMNS);

        let campus = sqlx::query_as::<_, Campus>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(campus)
    }

    async fn ids(&self) -> StoreResult<Vec<ObjectId>> {
        let ids = sqlx::query_scalar::<_, ObjectId>("SELECT id FROM campuses ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }
}
