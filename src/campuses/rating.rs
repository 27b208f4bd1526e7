use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ratings::models::nullable_patch;
use crate::ratings::{CategoryScores, RatingKind, RatingRecord, RatingService};

/// Campus ratings: ten unweighted categories and an optional comment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CampusKind;

impl RatingKind for CampusKind {
    type Scores = CampusScores;
    type ScoresPatch = CampusScoresPatch;
    type Details = CampusDetails;
    type DetailsPatch = CampusDetailsPatch;

    const TARGET: &'static str = "Campus";
    const RECORD: &'static str = "Campus rating";
    const RECORD_TABLE: &'static str = "campus_ratings";
    const TARGET_TABLE: &'static str = "campuses";
    const AVERAGE_COLUMN: &'static str = "overall_rating";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CampusScores {
    #[validate(range(min = 1, max = 5, message = "Reputation must be between 1 and 5"))]
    pub reputation: i16,
    #[validate(range(min = 1, max = 5, message = "Social must be between 1 and 5"))]
    pub social: i16,
    #[validate(range(min = 1, max = 5, message = "Clubs must be between 1 and 5"))]
    pub clubs: i16,
    #[validate(range(min = 1, max = 5, message = "Opportunities must be between 1 and 5"))]
    pub opportunities: i16,
    #[validate(range(min = 1, max = 5, message = "Location must be between 1 and 5"))]
    pub location: i16,
    #[validate(range(min = 1, max = 5, message = "Happiness must be between 1 and 5"))]
    pub happiness: i16,
    #[validate(range(min = 1, max = 5, message = "Facilities must be between 1 and 5"))]
    pub facilities: i16,
    #[validate(range(min = 1, max = 5, message = "Safety must be between 1 and 5"))]
    pub safety: i16,
    #[validate(range(min = 1, max = 5, message = "Internet must be between 1 and 5"))]
    pub internet: i16,
    #[validate(range(min = 1, max = 5, message = "Food must be between 1 and 5"))]
    pub food: i16,
}

impl CategoryScores for CampusScores {
    fn values(&self) -> Vec<i16> {
        vec![
            self.reputation,
            self.social,
            self.clubs,
            self.opportunities,
            self.location,
            self.happiness,
            self.facilities,
            self.safety,
            self.internet,
            self.food,
        ]
    }
}

#[cfg(test)]
impl CampusScores {
    /// Every category set to the same score
    pub fn uniform(score: i16) -> Self {
        Self {
            reputation: score,
            social: score,
            clubs: score,
            opportunities: score,
            location: score,
            happiness: score,
            facilities: score,
            safety: score,
            internet: score,
            food: score,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CampusScoresPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Reputation must be between 1 and 5"))]
    pub reputation: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Social must be between 1 and 5"))]
    pub social: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Clubs must be between 1 and 5"))]
    pub clubs: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Opportunities must be between 1 and 5"))]
    pub opportunities: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Location must be between 1 and 5"))]
    pub location: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Happiness must be between 1 and 5"))]
    pub happiness: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Facilities must be between 1 and 5"))]
    pub facilities: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Safety must be between 1 and 5"))]
    pub safety: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Internet must be between 1 and 5"))]
    pub internet: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Food must be between 1 and 5"))]
    pub food: Option<i16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CampusDetails {
    #[validate(length(max = 1000, message = "Comment must not exceed 1000 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CampusDetailsPatch {
    /// `Some(None)` clears the stored comment
    #[serde(
        default,
        deserialize_with = "nullable_patch",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(max = 1000, message = "Comment must not exceed 1000 characters"))]
    pub comment: Option<Option<String>>,
}

pub type CampusRating = RatingRecord<CampusKind>;
pub type CampusRatingService = RatingService<CampusKind>;
