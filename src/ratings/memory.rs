use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::ids::ObjectId;
use crate::ratings::{
    AggregateStore, RatingChanges, RatingFilter, RatingKind, RatingRecord, RatingStore,
    TargetAggregate,
};

/// Overwrite the top-level fields of `current` present in `patch`
pub(crate) fn merge_fields<T>(current: &T, patch: &Map<String, Value>) -> StoreResult<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    if patch.is_empty() {
        return Ok(current.clone());
    }

    let mut document = match serde_json::to_value(current)? {
        Value::Object(fields) => fields,
        _ => {
            return Err(StoreError::Query(
                "stored document is not an object".to_string(),
            ))
        }
    };

    for (key, value) in patch {
        document.insert(key.clone(), value.clone());
    }

    Ok(serde_json::from_value(Value::Object(document))?)
}

/// In-process rating store used for embedding and tests
pub struct MemoryRatingStore<K: RatingKind> {
    records: RwLock<Vec<RatingRecord<K>>>,
    fail_reads: AtomicBool,
}

impl<K: RatingKind> Default for MemoryRatingStore<K> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            fail_reads: AtomicBool::new(false),
        }
    }
}

impl<K: RatingKind> MemoryRatingStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `find_many` fail until switched off again
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl<K: RatingKind> RatingStore<K> for MemoryRatingStore<K> {
    async fn insert(&self, record: RatingRecord<K>) -> StoreResult<RatingRecord<K>> {
        let mut records = self.records.write().await;
        records.push(record.clone());
        Ok(record)
    }

    async fn find_many(&self, filter: RatingFilter) -> StoreResult<Vec<RatingRecord<K>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "{} store is not accepting reads",
                K::RECORD_TABLE
            )));
        }

        let records = self.records.read().await;
        let mut matching: Vec<RatingRecord<K>> = records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(matching)
    }

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<RatingRecord<K>>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| &record.id == id).cloned())
    }

    async fn update_by_id(
        &self,
        id: &ObjectId,
        changes: &RatingChanges,
    ) -> StoreResult<Option<RatingRecord<K>>> {
        let mut records = self.records.write().await;

        let Some(record) = records.iter_mut().find(|record| &record.id == id) else {
            return Ok(None);
        };

        // Build the merged record first so a bad patch leaves the stored one intact
        let scores = merge_fields(&record.scores, &changes.scores)?;
        let details = merge_fields(&record.details, &changes.details)?;

        if let Some(target_id) = &changes.target_id {
            record.target_id = target_id.clone();
        }
        record.scores = scores;
        record.details = details;
        record.updated_at = Utc::now();

        Ok(Some(record.clone()))
    }

    async fn delete_by_id(&self, id: &ObjectId) -> StoreResult<Option<RatingRecord<K>>> {
        let mut records = self.records.write().await;

        let position = records.iter().position(|record| &record.id == id);
        Ok(position.map(|index| records.remove(index)))
    }
}

/// A target row carrying a denormalized aggregate
pub trait AggregateTarget: Clone + Send + Sync + 'static {
    fn id(&self) -> &ObjectId;

    fn set_aggregate(&mut self, aggregate: TargetAggregate);
}

/// In-process table of rated targets
///
/// Backs the lecturer and campus catalogs when no database is configured.
/// Aggregate writes can be made to fail for exercising the best-effort refresh.
pub struct MemoryTargetStore<T: AggregateTarget> {
    rows: RwLock<Vec<T>>,
    fail_aggregate_writes: AtomicBool,
}

impl<T: AggregateTarget> Default for MemoryTargetStore<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            fail_aggregate_writes: AtomicBool::new(false),
        }
    }
}

impl<T: AggregateTarget> MemoryTargetStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_aggregate_writes(&self, fail: bool) {
        self.fail_aggregate_writes.store(fail, Ordering::SeqCst);
    }

    /// Current state of one row
    pub async fn snapshot(&self, id: &ObjectId) -> Option<T> {
        let rows = self.rows.read().await;
        rows.iter().find(|row| row.id() == id).cloned()
    }

    pub(crate) async fn put(&self, row: T) -> T {
        let mut rows = self.rows.write().await;
        rows.push(row.clone());
        row
    }

    pub(crate) async fn rows(&self) -> Vec<T> {
        self.rows.read().await.clone()
    }

    /// Mutate one row in place and return its new state
    pub(crate) async fn modify<F>(&self, id: &ObjectId, change: F) -> Option<T>
    where
        F: FnOnce(&mut T),
    {
        let mut rows = self.rows.write().await;
        let row = rows.iter_mut().find(|row| row.id() == id)?;
        change(row);
        Some(row.clone())
    }

    pub(crate) async fn take(&self, id: &ObjectId) -> Option<T> {
        let mut rows = self.rows.write().await;
        let position = rows.iter().position(|row| row.id() == id)?;
        Some(rows.remove(position))
    }
}

#[async_trait]
impl<K: RatingKind, T: AggregateTarget> AggregateStore<K> for MemoryTargetStore<T> {
    async fn write_aggregate(
        &self,
        target_id: &ObjectId,
        aggregate: TargetAggregate,
    ) -> StoreResult<bool> {
        if self.fail_aggregate_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "{} aggregate writes are disabled",
                K::TARGET_TABLE
            )));
        }

        let updated = self
            .modify(target_id, |row| row.set_aggregate(aggregate))
            .await;
        Ok(updated.is_some())
    }
}
