use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::ids::ObjectId;
use crate::ratings::{
    AggregateStore, NewRating, RatingAggregator, RatingChanges, RatingFilter, RatingKind,
    RatingRecord, RatingStore, RatingUpdate, ReconcileReport,
};

/// Parse a caller-supplied id, failing with `InvalidReference`
pub(crate) fn parse_reference(what: &'static str, value: &str) -> ServiceResult<ObjectId> {
    ObjectId::parse_str(value).map_err(|_| ServiceError::InvalidReference {
        what,
        value: value.to_string(),
    })
}

/// Service layer for rating records of one target kind
///
/// Every write is one record mutation followed by an aggregate refresh of the
/// affected target(s).
#[derive(Clone)]
pub struct RatingService<K: RatingKind> {
    records: Arc<dyn RatingStore<K>>,
    aggregator: RatingAggregator<K>,
}

impl<K: RatingKind> RatingService<K> {
    /// Create a new RatingService
    pub fn new(records: Arc<dyn RatingStore<K>>, targets: Arc<dyn AggregateStore<K>>) -> Self {
        let aggregator = RatingAggregator::new(records.clone(), targets);
        Self {
            records,
            aggregator,
        }
    }

    pub fn aggregator(&self) -> &RatingAggregator<K> {
        &self.aggregator
    }

    fn not_found(id: &ObjectId) -> ServiceError {
        ServiceError::NotFound {
            resource: K::RECORD,
            id: id.to_string(),
        }
    }

    /// Create a new rating
    ///
    /// This method:
    /// 1. Requires an authenticated author
    /// 2. Checks the target and author references are well formed
    /// 3. Validates scores and details
    /// 4. Persists the rating
    /// 5. Refreshes the target's aggregate
    pub async fn create(
        &self,
        input: NewRating<K>,
        author_id: Option<&str>,
    ) -> ServiceResult<RatingRecord<K>> {
        // 1. Authentication precondition
        let author_id = match author_id.map(str::trim) {
            Some(author) if !author.is_empty() => author,
            _ => {
                return Err(ServiceError::Unauthenticated {
                    action: "create a rating",
                })
            }
        };

        // 2. Reference shapes
        let target_id = parse_reference(K::TARGET, &input.target_id)?;
        let author_id = parse_reference("author", author_id)?;

        // 3. Score bounds and details
        input.scores.validate()?;
        input.details.validate()?;

        // 4. Persist
        let now = Utc::now();
        let record = self
            .records
            .insert(RatingRecord {
                id: ObjectId::new(),
                author_id,
                target_id,
                scores: input.scores,
                details: input.details,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(
            "Created {} rating {} for {}",
            K::TARGET,
            record.id,
            record.target_id
        );

        // 5. Aggregate refresh
        self.aggregator.refresh(&record.target_id).await;

        Ok(record)
    }

    /// All ratings of this kind, newest first
    pub async fn find_all(&self) -> ServiceResult<Vec<RatingRecord<K>>> {
        tracing::debug!("Fetching all {} ratings", K::TARGET);
        Ok(self.records.find_many(RatingFilter::All).await?)
    }

    /// One rating by id
    pub async fn find_one(&self, id: &str) -> ServiceResult<RatingRecord<K>> {
        let id = parse_reference("rating", id)?;

        self.records
            .find_by_id(&id)
            .await?
            .ok_or_else(|| Self::not_found(&id))
    }

    /// All ratings of one target
    pub async fn find_by_target(&self, target_id: &str) -> ServiceResult<Vec<RatingRecord<K>>> {
        let target_id = parse_reference(K::TARGET, target_id)?;
        Ok(self.records.find_many(RatingFilter::Target(target_id)).await?)
    }

    /// All ratings submitted by one author
    pub async fn find_by_author(&self, author_id: &str) -> ServiceResult<Vec<RatingRecord<K>>> {
        let author_id = parse_reference("author", author_id)?;
        Ok(self.records.find_many(RatingFilter::Author(author_id)).await?)
    }

    /// Partially update a rating
    ///
    /// This method:
    /// 1. Checks the rating id (and new target id, if any) are well formed
    /// 2. Validates the patched fields
    /// 3. Applies the partial overwrite
    /// 4. Refreshes the record's target, and the previous target when the
    ///    rating was moved to another one
    pub async fn update(&self, id: &str, update: RatingUpdate<K>) -> ServiceResult<RatingRecord<K>> {
        // 1. Reference shapes
        let id = parse_reference("rating", id)?;
        let new_target = update
            .target_id
            .as_deref()
            .map(|target| parse_reference(K::TARGET, target))
            .transpose()?;

        // 2. Patched fields
        update.scores.validate()?;
        update.details.validate()?;

        let changes = RatingChanges::from_patches(new_target, &update.scores, &update.details)
            .map_err(StoreError::from)?;

        // Only a retargeting update needs the previous target
        let previous_target = match changes.target_id {
            Some(_) => self.records.find_by_id(&id).await?.map(|r| r.target_id),
            None => None,
        };

        // 3. Overwrite
        let updated = self
            .records
            .update_by_id(&id, &changes)
            .await?
            .ok_or_else(|| Self::not_found(&id))?;

        tracing::info!("Updated {} rating {}", K::TARGET, updated.id);

        // 4. Aggregate refresh
        self.aggregator.refresh(&updated.target_id).await;
        if let Some(previous) = previous_target.filter(|p| p != &updated.target_id) {
            tracing::debug!(
                "{} rating {} moved from {} to {}",
                K::TARGET,
                updated.id,
                previous,
                updated.target_id
            );
            self.aggregator.refresh(&previous).await;
        }

        Ok(updated)
    }

    /// Delete a rating and return it
    pub async fn remove(&self, id: &str) -> ServiceResult<RatingRecord<K>> {
        let id = parse_reference("rating", id)?;

        let deleted = self
            .records
            .delete_by_id(&id)
            .await?
            .ok_or_else(|| Self::not_found(&id))?;

        tracing::info!("Deleted {} rating {}", K::TARGET, deleted.id);

        self.aggregator.refresh(&deleted.target_id).await;

        Ok(deleted)
    }

    /// Recompute the aggregates of the given targets
    pub async fn reconcile<I>(&self, target_ids: I) -> ReconcileReport
    where
        I: IntoIterator<Item = ObjectId>,
    {
        self.aggregator.reconcile(target_ids).await
    }
}
