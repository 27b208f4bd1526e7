use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;
use validator::Validate;

use crate::ids::ObjectId;

/// Category scores of one rating
///
/// Every category is unweighted; the per-record average is the plain mean of
/// all categories.
pub trait CategoryScores {
    /// Score of every category, in declaration order
    fn values(&self) -> Vec<i16>;
}

/// Descriptor of a rated target kind (lecturer, campus)
///
/// Carries the typed score/detail shapes and where the records and the
/// denormalized aggregate live.
pub trait RatingKind: Debug + Clone + Copy + Default + Send + Sync + 'static {
    type Scores: CategoryScores
        + Validate
        + Debug
        + Clone
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + Unpin
        + 'static;
    type ScoresPatch: Validate + Debug + Clone + Default + Serialize + DeserializeOwned + Send + Sync;
    type Details: Validate
        + Debug
        + Clone
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + Unpin
        + 'static;
    type DetailsPatch: Validate + Debug + Clone + Default + Serialize + DeserializeOwned + Send + Sync;

    /// Target name used in messages, e.g. "Lecturer"
    const TARGET: &'static str;
    /// Record name used in messages, e.g. "Lecturer rating"
    const RECORD: &'static str;
    /// Table holding the rating records
    const RECORD_TABLE: &'static str;
    /// Table holding the rated targets
    const TARGET_TABLE: &'static str;
    /// Column of the target table carrying the denormalized average
    const AVERAGE_COLUMN: &'static str;
}

/// One submitted rating, tied to one author and one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct RatingRecord<K: RatingKind> {
    pub id: ObjectId,
    pub author_id: ObjectId,
    pub target_id: ObjectId,
    pub scores: K::Scores,
    pub details: K::Details,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a rating; ids arrive unchecked from the caller
#[derive(Debug, Clone, Deserialize)]
#[serde(bound = "")]
pub struct NewRating<K: RatingKind> {
    pub target_id: String,
    pub scores: K::Scores,
    pub details: K::Details,
}

/// Partial update of a rating. Absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(bound = "")]
pub struct RatingUpdate<K: RatingKind> {
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub scores: K::ScoresPatch,
    #[serde(default)]
    pub details: K::DetailsPatch,
}

/// Store-level form of a validated `RatingUpdate`
///
/// `scores` and `details` hold only the fields to overwrite; stores merge them
/// key by key into the stored documents.
#[derive(Debug, Clone, Default)]
pub struct RatingChanges {
    pub target_id: Option<ObjectId>,
    pub scores: Map<String, Value>,
    pub details: Map<String, Value>,
}

impl RatingChanges {
    /// Convert typed patches into field maps
    ///
    /// Patch types skip absent fields when serializing, so an explicit `null`
    /// left in the map clears a nullable field.
    pub fn from_patches<S: Serialize, D: Serialize>(
        target_id: Option<ObjectId>,
        scores: &S,
        details: &D,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            target_id,
            scores: into_fields(scores)?,
            details: into_fields(details)?,
        })
    }
}

fn into_fields<T: Serialize>(patch: &T) -> Result<Map<String, Value>, serde_json::Error> {
    Ok(match serde_json::to_value(patch)? {
        Value::Object(fields) => fields,
        _ => Map::new(),
    })
}

/// Deserialize a nullable patch field so that `null` becomes `Some(None)`
///
/// Pair with `#[serde(default)]` so an absent field stays `None`.
pub(crate) fn nullable_patch<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Filter for `RatingStore::find_many`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingFilter {
    All,
    Target(ObjectId),
    Author(ObjectId),
}

impl RatingFilter {
    pub fn matches<K: RatingKind>(&self, record: &RatingRecord<K>) -> bool {
        match self {
            RatingFilter::All => true,
            RatingFilter::Target(id) => &record.target_id == id,
            RatingFilter::Author(id) => &record.author_id == id,
        }
    }
}

/// Denormalized summary of a target's ratings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetAggregate {
    pub average_score: f64,
    pub record_count: i32,
}

impl TargetAggregate {
    pub const EMPTY: TargetAggregate = TargetAggregate {
        average_score: 0.0,
        record_count: 0,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lecturers::{LecturerDetailsPatch, LecturerScoresPatch};
    use serde_json::json;

    #[test]
    fn test_changes_keep_only_present_fields() {
        let scores = LecturerScoresPatch {
            quality: Some(2),
            ..Default::default()
        };
        let details = LecturerDetailsPatch {
            textbook: Some(false),
            ..Default::default()
        };

        let changes = RatingChanges::from_patches(None, &scores, &details).unwrap();

        assert_eq!(changes.scores.len(), 1);
        assert_eq!(changes.scores["quality"], json!(2));
        assert_eq!(changes.details.len(), 1);
        assert_eq!(changes.details["textbook"], json!(false));
    }

    #[test]
    fn test_empty_patches_make_empty_changes() {
        let changes = RatingChanges::from_patches(
            None,
            &LecturerScoresPatch::default(),
            &LecturerDetailsPatch::default(),
        )
        .unwrap();
        assert!(changes.target_id.is_none());
        assert!(changes.scores.is_empty());
        assert!(changes.details.is_empty());

        let retarget = RatingChanges::from_patches(
            Some(ObjectId::new()),
            &LecturerScoresPatch::default(),
            &LecturerDetailsPatch::default(),
        )
        .unwrap();
        assert!(retarget.target_id.is_some());
        assert!(retarget.scores.is_empty());
    }

    #[test]
    fn test_null_comment_clears_and_absent_comment_keeps() {
        let clear: LecturerDetailsPatch =
            serde_json::from_value(json!({ "comment": null })).unwrap();
        assert_eq!(clear.comment, Some(None));

        let keep: LecturerDetailsPatch = serde_json::from_value(json!({ "grade": "C" })).unwrap();
        assert_eq!(keep.comment, None);

        let changes =
            RatingChanges::from_patches(None, &LecturerScoresPatch::default(), &clear).unwrap();
        assert_eq!(changes.details.len(), 1);
        assert_eq!(changes.details["comment"], Value::Null);

        let changes =
            RatingChanges::from_patches(None, &LecturerScoresPatch::default(), &keep).unwrap();
        assert!(!changes.details.contains_key("comment"));
    }

    #[test]
    fn test_update_deserializes_with_missing_sections() {
        let update: RatingUpdate<crate::lecturers::LecturerKind> =
            serde_json::from_value(json!({ "scores": { "difficulty": 4 } })).unwrap();

        assert_eq!(update.target_id, None);
        assert_eq!(update.scores.difficulty, Some(4));
        assert_eq!(update.scores.quality, None);
        assert_eq!(update.details.course, None);
    }
}
