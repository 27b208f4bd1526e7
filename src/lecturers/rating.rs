use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ratings::models::nullable_patch;
use crate::ratings::{CategoryScores, RatingKind, RatingRecord, RatingService};

/// Lecturer ratings: two score categories plus course details
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LecturerKind;

impl RatingKind for LecturerKind {
    type Scores = LecturerScores;
    type ScoresPatch = LecturerScoresPatch;
    type Details = LecturerDetails;
    type DetailsPatch = LecturerDetailsPatch;

    const TARGET: &'static str = "Lecturer";
    const RECORD: &'static str = "Lecturer rating";
    const RECORD_TABLE: &'static str = "lecturer_ratings";
    const TARGET_TABLE: &'static str = "lecturers";
    const AVERAGE_COLUMN: &'static str = "rating";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LecturerScores {
    #[validate(range(min = 1, max = 5, message = "Difficulty must be between 1 and 5"))]
    pub difficulty: i16,
    #[validate(range(min = 1, max = 5, message = "Quality must be between 1 and 5"))]
    pub quality: i16,
}

impl CategoryScores for LecturerScores {
    fn values(&self) -> Vec<i16> {
        vec![self.difficulty, self.quality]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LecturerScoresPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Difficulty must be between 1 and 5"))]
    pub difficulty: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Quality must be between 1 and 5"))]
    pub quality: Option<i16>,
}

/// Course context of a lecturer rating; never aggregated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LecturerDetails {
    #[validate(length(min = 1, message = "Course must not be empty"))]
    pub course: String,
    #[validate(range(min = 1, max = 5, message = "Credit hours must be between 1 and 5"))]
    pub credit_hr: i16,
    #[validate(length(min = 1, message = "Grade must not be empty"))]
    pub grade: String,
    #[serde(default)]
    pub textbook: bool,
    #[validate(length(max = 1000, message = "Comment must not exceed 1000 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LecturerDetailsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Course must not be empty"))]
    pub course: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Credit hours must be between 1 and 5"))]
    pub credit_hr: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Grade must not be empty"))]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textbook: Option<bool>,
    /// `Some(None)` clears the stored comment
    #[serde(
        default,
        deserialize_with = "nullable_patch",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(max = 1000, message = "Comment must not exceed 1000 characters"))]
    pub comment: Option<Option<String>>,
}

pub type LecturerRating = RatingRecord<LecturerKind>;
pub type LecturerRatingService = RatingService<LecturerKind>;
