use std::sync::Arc;

use crate::error::{ServiceError, ServiceResult};
use crate::search::{SearchHit, SearchIndex, SearchKind, SearchQuery, SearchResponse, SearchTerms};

pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

pub const MISSING_SEARCH_TERMS: &str =
    "At least one search parameter (lecturerName or campusName) is required";

/// Lecturer and campus lookup by name
#[derive(Clone)]
pub struct SearchService {
    index: Arc<dyn SearchIndex>,
    limit: i64,
}

impl SearchService {
    /// Create a new SearchService returning at most `limit` hits
    pub fn new(index: Arc<dyn SearchIndex>, limit: i64) -> Self {
        Self { index, limit }
    }

    /// Search campuses, lecturers, or lecturers at a campus
    ///
    /// This method:
    /// 1. Rejects a query with no usable term
    /// 2. Picks the target from the terms present
    /// 3. Runs the full-text strategy, falling back to pattern matching on failure
    pub async fn search(&self, query: SearchQuery) -> ServiceResult<SearchResponse> {
        let response = match query.terms() {
            (None, None) => {
                return Err(ServiceError::Validation(MISSING_SEARCH_TERMS.to_string()));
            }
            (None, Some(campus_name)) => {
                let results = self.campuses(&campus_name).await?;
                SearchResponse::new(SearchKind::Campus, SearchTerms::Single(campus_name), results)
            }
            (Some(lecturer_name), None) => {
                let results = self.lecturers(&lecturer_name, None).await?;
                SearchResponse::new(
                    SearchKind::Lecturer,
                    SearchTerms::Single(lecturer_name),
                    results,
                )
            }
            (Some(lecturer_name), Some(campus_name)) => {
                let results = self.lecturers(&lecturer_name, Some(&campus_name)).await?;
                SearchResponse::new(
                    SearchKind::Lecturer,
                    SearchTerms::LecturerAtCampus {
                        lecturer_name,
                        campus_name,
                    },
                    results,
                )
            }
        };

        tracing::debug!("Search returned {} results", response.count);
        Ok(response)
    }

    async fn campuses(&self, campus_name: &str) -> ServiceResult<Vec<SearchHit>> {
        match self.index.full_text_campuses(campus_name, self.limit).await {
            Ok(hits) => Ok(hits),
            Err(e) => {
                tracing::warn!("Full-text campus search failed, using pattern match: {}", e);
                let pattern = regex::escape(campus_name);
                Ok(self.index.pattern_campuses(&pattern, self.limit).await?)
            }
        }
    }

    async fn lecturers(
        &self,
        lecturer_name: &str,
        campus_name: Option<&str>,
    ) -> ServiceResult<Vec<SearchHit>> {
        let campus_pattern = campus_name.map(regex::escape);

        match self
            .index
            .full_text_lecturers(lecturer_name, campus_pattern.as_deref(), self.limit)
            .await
        {
            Ok(hits) => Ok(hits),
            Err(e) => {
                tracing::warn!("Full-text lecturer search failed, using pattern match: {}", e);
                let pattern = regex::escape(lecturer_name);
                let hits = self
                    .index
                    .pattern_lecturers(&pattern, campus_pattern.as_deref(), self.limit)
                    .await?;
                Ok(hits)
            }
        }
    }
}
