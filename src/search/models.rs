use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::ids::ObjectId;

/// Search parameters; blank values count as absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub lecturer_name: Option<String>,
    pub campus_name: Option<String>,
}

impl SearchQuery {
    fn present(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Trimmed lecturer and campus terms, dropping blank ones
    pub fn terms(&self) -> (Option<String>, Option<String>) {
        (
            Self::present(&self.lecturer_name),
            Self::present(&self.campus_name),
        )
    }
}

/// One matching lecturer or campus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SearchHit {
    pub id: ObjectId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Campus,
    Lecturer,
}

/// The query echoed back in a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchTerms {
    Single(String),
    LecturerAtCampus {
        lecturer_name: String,
        campus_name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    #[serde(rename = "type")]
    pub kind: SearchKind,
    pub query: SearchTerms,
    pub results: Vec<SearchHit>,
    pub count: usize,
}

impl SearchResponse {
    pub fn new(kind: SearchKind, query: SearchTerms, results: Vec<SearchHit>) -> Self {
        Self {
            kind,
            query,
            count: results.len(),
            results,
        }
    }
}
