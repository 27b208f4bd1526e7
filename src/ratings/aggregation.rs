use std::sync::Arc;
use thiserror::Error;

use crate::error::StoreError;
use crate::ids::ObjectId;
use crate::ratings::{
    AggregateStore, CategoryScores, RatingFilter, RatingKind, RatingRecord, RatingStore,
    TargetAggregate, TargetLocks,
};

/// `numerator / denominator` rounded half away from zero to 2 decimal places
///
/// Computed in integers so ties like 109 / 40 = 2.725 round up. 0 when the
/// denominator is 0.
pub fn round_ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let (numerator, denominator) = if denominator < 0 {
        (-numerator, -denominator)
    } else {
        (numerator, denominator)
    };
    let hundredths = (numerator * 200 + denominator * numerator.signum()) / (2 * denominator);
    hundredths as f64 / 100.0
}

/// Pure summary of a target's current rating set
///
/// Average of the per-record averages, rounded to 2 decimals; 0 when empty.
/// Every record of a kind has the same number of categories, so this is the
/// integer score total over the number of scored categories, rounded exactly.
pub fn summarize<K: RatingKind>(records: &[RatingRecord<K>]) -> TargetAggregate {
    if records.is_empty() {
        return TargetAggregate::EMPTY;
    }

    let (total, cells) = records
        .iter()
        .map(|record| record.scores.values())
        .fold((0i64, 0i64), |(total, cells), values| {
            let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
            (total + sum, cells + values.len() as i64)
        });

    TargetAggregate {
        average_score: round_ratio(total, cells),
        record_count: records.len() as i32,
    }
}

/// The recompute-and-write step failed; the aggregate may be stale
///
/// Internal only: `RatingAggregator::refresh` logs and discards it.
#[derive(Debug, Error)]
#[error("failed to refresh {target} aggregate {target_id}: {source}")]
pub struct AggregationWriteFailure {
    pub target: &'static str,
    pub target_id: ObjectId,
    #[source]
    pub source: StoreError,
}

/// Outcome of `RatingAggregator::reconcile`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub refreshed: usize,
    pub failed: usize,
}

/// Maintains a target's denormalized average and count from its rating records
#[derive(Clone)]
pub struct RatingAggregator<K: RatingKind> {
    records: Arc<dyn RatingStore<K>>,
    targets: Arc<dyn AggregateStore<K>>,
    locks: TargetLocks,
}

impl<K: RatingKind> RatingAggregator<K> {
    /// Create a new RatingAggregator
    pub fn new(records: Arc<dyn RatingStore<K>>, targets: Arc<dyn AggregateStore<K>>) -> Self {
        Self {
            records,
            targets,
            locks: TargetLocks::new(),
        }
    }

    /// Recalculate and persist the aggregate of one target
    ///
    /// Runs under the target's lock so concurrent recomputations in this
    /// process cannot overwrite a fresh result with a stale one. A target that
    /// no longer exists is not an error.
    pub async fn recompute(
        &self,
        target_id: &ObjectId,
    ) -> Result<TargetAggregate, AggregationWriteFailure> {
        let lock = self.locks.lock_for(target_id);
        let _guard = lock.lock().await;

        let failure = |source: StoreError| AggregationWriteFailure {
            target: K::TARGET,
            target_id: target_id.clone(),
            source,
        };

        let records = self
            .records
            .find_many(RatingFilter::Target(target_id.clone()))
            .await
            .map_err(failure)?;

        let aggregate = summarize(&records);

        let found = self
            .targets
            .write_aggregate(target_id, aggregate)
            .await
            .map_err(failure)?;

        if found {
            tracing::debug!(
                "{} {} aggregate now {:.2} over {} ratings",
                K::TARGET,
                target_id,
                aggregate.average_score,
                aggregate.record_count
            );
        } else {
            tracing::debug!(
                "{} {} no longer exists, skipping aggregate write",
                K::TARGET,
                target_id
            );
        }

        Ok(aggregate)
    }

    /// Best-effort recompute invoked after every rating mutation
    ///
    /// Never fails: the primary write already succeeded, so a failure here is
    /// logged and the aggregate stays stale until the next write to the target.
    pub async fn refresh(&self, target_id: &ObjectId) {
        if let Err(failure) = self.recompute(target_id).await {
            tracing::error!("{}", failure);
        }
    }

    /// Recompute every given target, counting successes and failures
    pub async fn reconcile<I>(&self, target_ids: I) -> ReconcileReport
    where
        I: IntoIterator<Item = ObjectId>,
    {
        let mut report = ReconcileReport::default();

        for target_id in target_ids {
            match self.recompute(&target_id).await {
                Ok(_) => report.refreshed += 1,
                Err(failure) => {
                    tracing::error!("{}", failure);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "Reconciled {} {} aggregates ({} failed)",
            report.refreshed,
            K::TARGET,
            report.failed
        );
        report
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::lecturers::{LecturerDetails, LecturerKind, LecturerScores};
    use chrono::Utc;
    use proptest::prelude::*;

    fn records_from(scores: &[(i16, i16)]) -> Vec<RatingRecord<LecturerKind>> {
        let target_id = ObjectId::new();
        scores
            .iter()
            .map(|&(difficulty, quality)| RatingRecord {
                id: ObjectId::new(),
                author_id: ObjectId::new(),
                target_id: target_id.clone(),
                scores: LecturerScores { difficulty, quality },
                details: LecturerDetails {
                    course: "MATH200".to_string(),
                    credit_hr: 4,
                    grade: "B".to_string(),
                    textbook: true,
                    comment: None,
                },
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .collect()
    }

    /// The count always equals the number of records
    #[test]
    fn prop_count_matches_record_set() {
        proptest!(|(scores in prop::collection::vec((1i16..=5, 1i16..=5), 0..50))| {
            let aggregate = summarize(&records_from(&scores));
            prop_assert_eq!(aggregate.record_count as usize, scores.len());
        });
    }

    /// A non-empty average stays within the score bounds
    #[test]
    fn prop_average_within_bounds() {
        proptest!(|(scores in prop::collection::vec((1i16..=5, 1i16..=5), 1..50))| {
            let aggregate = summarize(&records_from(&scores));
            prop_assert!(aggregate.average_score >= 1.0 && aggregate.average_score <= 5.0);
        });
    }

    /// The average has at most two decimals and is independent of record order
    #[test]
    fn prop_average_is_rounded_and_order_independent() {
        proptest!(|(scores in prop::collection::vec((1i16..=5, 1i16..=5), 1..30))| {
            let forward = summarize(&records_from(&scores));
            let mut reversed_scores = scores.clone();
            reversed_scores.reverse();
            let reversed = summarize(&records_from(&reversed_scores));

            let hundredths = forward.average_score * 100.0;
            prop_assert!((hundredths - hundredths.round()).abs() < 1e-9);
            prop_assert!((forward.average_score - reversed.average_score).abs() < 1e-9);
        });
    }

    /// Summarizing the same set twice yields the same aggregate
    #[test]
    fn prop_summarize_is_idempotent() {
        proptest!(|(scores in prop::collection::vec((1i16..=5, 1i16..=5), 0..30))| {
            let records = records_from(&scores);
            prop_assert_eq!(summarize(&records), summarize(&records));
        });
    }
}
