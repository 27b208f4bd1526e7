use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::campuses::{Campus, MemoryCampusStore};
use crate::error::{StoreError, StoreResult};
use crate::lecturers::{Lecturer, MemoryLecturerStore};
use crate::search::{SearchHit, SearchIndex};

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

/// Every query word appears as a word of the document
fn matches_all_words(query: &str, fields: &[&str]) -> bool {
    let document: HashSet<String> = fields.iter().flat_map(|field| words(field)).collect();
    let mut terms = words(query).peekable();
    terms.peek().is_some() && terms.all(|term| document.contains(&term))
}

fn case_insensitive(pattern: &str) -> StoreResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| StoreError::Query(e.to_string()))
}

fn campus_fields(campus: &Campus) -> Vec<&str> {
    let mut fields = vec![campus.name.as_str(), campus.address.as_str()];
    fields.extend(campus.description.as_deref());
    fields
}

fn hits<T>(rows: Vec<T>, limit: i64, hit: impl Fn(T) -> SearchHit) -> Vec<SearchHit> {
    let mut found: Vec<SearchHit> = rows.into_iter().map(hit).collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    found.truncate(usize::try_from(limit).unwrap_or(0));
    found
}

fn lecturer_hit(lecturer: Lecturer) -> SearchHit {
    SearchHit {
        id: lecturer.id,
        name: lecturer.name,
    }
}

fn campus_hit(campus: Campus) -> SearchHit {
    SearchHit {
        id: campus.id,
        name: campus.name,
    }
}

/// Search over the in-memory catalogs
///
/// Full-text matching is whole-word and can be switched off to exercise the
/// pattern fallback.
pub struct MemorySearchIndex {
    lecturers: Arc<MemoryLecturerStore>,
    campuses: Arc<MemoryCampusStore>,
    full_text: AtomicBool,
}

impl MemorySearchIndex {
    pub fn new(lecturers: Arc<MemoryLecturerStore>, campuses: Arc<MemoryCampusStore>) -> Self {
        Self {
            lecturers,
            campuses,
            full_text: AtomicBool::new(true),
        }
    }

    pub fn set_full_text_available(&self, available: bool) {
        self.full_text.store(available, Ordering::SeqCst);
    }

    fn ensure_full_text(&self) -> StoreResult<()> {
        if self.full_text.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable(
                "full-text search is not configured".to_string(),
            ))
        }
    }

    async fn lecturers_at(&self, campus_pattern: Option<&str>) -> StoreResult<Vec<Lecturer>> {
        let campus = campus_pattern.map(case_insensitive).transpose()?;
        let lecturers = self.lecturers.rows().await;

        Ok(lecturers
            .into_iter()
            .filter(|l| campus.as_ref().map_or(true, |re| re.is_match(&l.university)))
            .collect())
    }
}

#[async_trait]
impl SearchIndex for MemorySearchIndex {
    async fn full_text_campuses(&self, query: &str, limit: i64) -> StoreResult<Vec<SearchHit>> {
        self.ensure_full_text()?;

        let matching: Vec<Campus> = self
            .campuses
            .rows()
            .await
            .into_iter()
            .filter(|campus| matches_all_words(query, &campus_fields(campus)))
            .collect();

        Ok(hits(matching, limit, campus_hit))
    }

    async fn full_text_lecturers(
        &self,
        query: &str,
        campus_pattern: Option<&str>,
        limit: i64,
    ) -> StoreResult<Vec<SearchHit>> {
        self.ensure_full_text()?;

        let matching: Vec<Lecturer> = self
            .lecturers_at(campus_pattern)
            .await?
            .into_iter()
            .filter(|l| {
                let mut fields = vec![l.name.as_str(), l.department.as_str()];
                fields.extend(l.courses.iter().map(String::as_str));
                if campus_pattern.is_none() {
                    fields.push(l.university.as_str());
                }
                matches_all_words(query, &fields)
            })
            .collect();

        Ok(hits(matching, limit, lecturer_hit))
    }

    async fn pattern_campuses(&self, pattern: &str, limit: i64) -> StoreResult<Vec<SearchHit>> {
        let re = case_insensitive(pattern)?;

        let matching: Vec<Campus> = self
            .campuses
            .rows()
            .await
            .into_iter()
            .filter(|campus| campus_fields(campus).iter().any(|f| re.is_match(f)))
            .collect();

        Ok(hits(matching, limit, campus_hit))
    }

    async fn pattern_lecturers(
        &self,
        pattern: &str,
        campus_pattern: Option<&str>,
        limit: i64,
    ) -> StoreResult<Vec<SearchHit>> {
        let re = case_insensitive(pattern)?;

        let matching: Vec<Lecturer> = self
            .lecturers_at(campus_pattern)
            .await?
            .into_iter()
            .filter(|l| {
                re.is_match(&l.name)
                    || re.is_match(&l.department)
                    || l.courses.iter().any(|course| re.is_match(course))
            })
            .collect();

        Ok(hits(matching, limit, lecturer_hit))
    }
}
