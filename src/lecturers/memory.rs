use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreResult;
use crate::ids::ObjectId;
use crate::lecturers::{Lecturer, LecturerStore, UpdateLecturer};
use crate::ratings::{AggregateTarget, MemoryTargetStore, TargetAggregate};

pub type MemoryLecturerStore = MemoryTargetStore<Lecturer>;

impl AggregateTarget for Lecturer {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn set_aggregate(&mut self, aggregate: TargetAggregate) {
        self.rating = aggregate.average_score;
        self.count = aggregate.record_count;
        self.updated_at = Utc::now();
    }
}

#[async_trait]
impl LecturerStore for MemoryTargetStore<Lecturer> {
    async fn insert(&self, lecturer: Lecturer) -> StoreResult<Lecturer> {
        Ok(self.put(lecturer).await)
    }

    async fn find_all(&self) -> StoreResult<Vec<Lecturer>> {
        let mut lecturers = self.rows().await;
        lecturers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(lecturers)
    }

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<Lecturer>> {
        Ok(self.snapshot(id).await)
    }

    async fn update_by_id(
        &self,
        id: &ObjectId,
        update: &UpdateLecturer,
    ) -> StoreResult<Option<Lecturer>> {
        Ok(self.modify(id, |lecturer| lecturer.apply(update)).await)
    }

    async fn delete_by_id(&self, id: &ObjectId) -> StoreResult<Option<Lecturer>> {
        Ok(self.take(id).await)
    }

    async fn push_course(&self, id: &ObjectId, course: &str) -> StoreResult<Option<Lecturer>> {
        let updated = self
            .modify(id, |lecturer| {
                lecturer.courses.push(course.to_string());
                lecturer.updated_at = Utc::now();
            })
            .await;
        Ok(updated)
    }

    async fn pull_course(&self, id: &ObjectId, course: &str) -> StoreResult<Option<Lecturer>> {
        let updated = self
            .modify(id, |lecturer| {
                lecturer.courses.retain(|existing| existing != course);
                lecturer.updated_at = Utc::now();
            })
            .await;
        Ok(updated)
    }

    async fn ids(&self) -> StoreResult<Vec<ObjectId>> {
        let mut ids: Vec<ObjectId> = self.rows().await.into_iter().map(|l| l.id).collect();
        ids.sort();
        Ok(ids)
    }
}
