use async_trait::async_trait;
use chrono::Utc;

use crate::campuses::{Campus, CampusStore, UpdateCampus};
use crate::error::StoreResult;
use crate::ids::ObjectId;
use crate::ratings::{AggregateTarget, MemoryTargetStore, TargetAggregate};

pub type MemoryCampusStore = MemoryTargetStore<Campus>;

impl AggregateTarget for Campus {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn set_aggregate(&mut self, aggregate: TargetAggregate) {
        self.overall_rating = aggregate.average_score;
        self.count = aggregate.record_count;
        self.updated_at = Utc::now();
    }
}

#[async_trait]
impl CampusStore for MemoryTargetStore<Campus> {
    async fn insert(&self, campus: Campus) -> StoreResult<Campus> {
        Ok(self.put(campus).await)
    }

    async fn find_all(&self) -> StoreResult<Vec<Campus>> {
        let mut campuses = self.rows().await;
        campuses.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(campuses)
    }

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<Campus>> {
        Ok(self.snapshot(id).await)
    }

    async fn update_by_id(
        &self,
        id: &ObjectId,
        update: &UpdateCampus,
    ) -> StoreResult<Option<Campus>> {
        Ok(self.modify(id, |campus| campus.apply(update)).await)
    }

    async fn delete_by_id(&self, id: &ObjectId) -> StoreResult<Option<Campus>> {
        Ok(self.take(id).await)
    }

    async fn ids(&self) -> StoreResult<Vec<ObjectId>> {
        let mut ids: Vec<ObjectId> = self.rows().await.into_iter().map(|c| c.id).collect();
        ids.sort();
        Ok(ids)
    }
}
