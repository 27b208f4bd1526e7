use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::StoreResult;
use crate::ids::ObjectId;
use crate::lecturers::{Lecturer, UpdateLecturer};

/// Persistence of lecturer entities
#[async_trait]
pub trait LecturerStore: Send + Sync {
    async fn insert(&self, lecturer: Lecturer) -> StoreResult<Lecturer>;

    /// All lecturers ordered by name
    async fn find_all(&self) -> StoreResult<Vec<Lecturer>>;

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<Lecturer>>;

    async fn update_by_id(
        &self,
        id: &ObjectId,
        update: &UpdateLecturer,
    ) -> StoreResult<Option<Lecturer>>;

    async fn delete_by_id(&self, id: &ObjectId) -> StoreResult<Option<Lecturer>>;

    /// Append a course to the lecturer's list
    async fn push_course(&self, id: &ObjectId, course: &str) -> StoreResult<Option<Lecturer>>;

    /// Remove every occurrence of a course from the lecturer's list
    async fn pull_course(&self, id: &ObjectId, course: &str) -> StoreResult<Option<Lecturer>>;

    /// Ids of every lecturer, for aggregate reconciliation
    async fn ids(&self) -> StoreResult<Vec<ObjectId>>;
}

const LECTURER_COLUMNS: &str =
    "id, name, university, department, courses, rating, count, created_at, updated_at";

/// PostgreSQL lecturer store
#[derive(Clone)]
pub struct PgLecturerStore {
    pool: PgPool,
}

impl PgLecturerStore {
    /// Create a new PgLecturerStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LecturerStore for PgLecturerStore {
    async fn insert(&self, lecturer: Lecturer) -> StoreResult<Lecturer> {
        let sql = format!(
            r#"
            INSERT INTO lecturers (id, name, university, department, courses, rating, count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            LECTURER_COLUMNS
        );

        let stored = sqlx::query_as::<_, Lecturer>(&sql)
            .bind(&lecturer.id)
            .bind(&lecturer.name)
            .bind(&lecturer.university)
            .bind(&lecturer.department)
            .bind(&lecturer.courses)
            .bind(lecturer.rating)
            .bind(lecturer.count)
            .bind(lecturer.created_at)
            .bind(lecturer.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(stored)
    }

    async fn find_all(&self) -> StoreResult<Vec<Lecturer>> {
        let sql = format!("SELECT {} FROM lecturers ORDER BY name, id", LECTURER_COLUMNS);

        let lecturers = sqlx::query_as::<_, Lecturer>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(lecturers)
    }

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<Lecturer>> {
        let sql = format!("SELECT {} FROM lecturers WHERE id = $1", LECTURER_COLUMNS);

        let lecturer = sqlx::query_as::<_, Lecturer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lecturer)
    }

    async fn update_by_id(
        &self,
        id: &ObjectId,
        update: &UpdateLecturer,
    ) -> StoreResult<Option<Lecturer>> {
        let sql = format!(
            r#"
            UPDATE lecturers
            SET name = COALESCE($2, name),
                university = COALESCE($3, university),
                department = COALESCE($4, department),
                courses = COALESCE($5, courses),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LECTURER_COLUMNS
        );

        let lecturer = sqlx::query_as::<_, Lecturer>(&sql)
            .bind(id)
            .bind(update.name.as_deref())
            .bind(update.university.as_deref())
            .bind(update.department.as_deref())
            .bind(update.courses.as_ref())
            .fetch_optional(&self.pool)
            .await?;

        Ok(lecturer)
    }

    async fn delete_by_id(&self, id: &ObjectId) -> StoreResult<Option<Lecturer>> {
        let sql = format!("DELETE FROM lecturers WHERE id = $1 RETURNING {}", LECTURER_COLUMNS);

        let lecturer = sqlx::query_as::<_, Lecturer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lecturer)
    }

    async fn push_course(&self, id: &ObjectId, course: &str) -> StoreResult<Option<Lecturer>> {
        let sql = format!(
            r#"
            UPDATE lecturers
            SET courses = array_append(courses, $2), updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LECTURER_COLUMNS
        );

        let lecturer = sqlx::query_as::<_, Lecturer>(&sql)
            .bind(id)
            .bind(course)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lecturer)
    }

    async fn pull_course(&self, id: &ObjectId, course: &str) -> StoreResult<Option<Lecturer>> {
        let sql = format!(
            r#"
            UPDATE lecturers
            SET courses = array_remove(courses, $2), updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LECTURER_COLUMNS
        );

        let lecturer = sqlx::query_as::<_, Lecturer>(&sql)
            .bind(id)
            .bind(course)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lecturer)
    }

    async fn ids(&self) -> StoreResult<Vec<ObjectId>> {
        let ids = sqlx::query_scalar::<_, ObjectId>("SELECT id FROM lecturers ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }
}
