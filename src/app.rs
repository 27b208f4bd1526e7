use std::sync::Arc;

use crate::campuses::{
    CampusKind, CampusRatingService, CampusService, MemoryCampusStore, PgCampusStore,
};
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::lecturers::{
    LecturerKind, LecturerRatingService, LecturerService, MemoryLecturerStore, PgLecturerStore,
};
use crate::ratings::{MemoryRatingStore, PgAggregateStore, PgRatingStore, ReconcileReport};
use crate::search::{MemorySearchIndex, PgSearchIndex, SearchService, DEFAULT_SEARCH_LIMIT};
use crate::error::ServiceResult;

/// Every service of the platform, wired to one backend
#[derive(Clone)]
pub struct AppState {
    pub lecturers: LecturerService,
    pub campuses: CampusService,
    pub lecturer_ratings: LecturerRatingService,
    pub campus_ratings: CampusRatingService,
    pub search: SearchService,
}

impl AppState {
    /// Services backed by PostgreSQL
    pub fn postgres(pool: DbPool, config: &AppConfig) -> Self {
        Self {
            lecturers: LecturerService::new(Arc::new(PgLecturerStore::new(pool.clone()))),
            campuses: CampusService::new(Arc::new(PgCampusStore::new(pool.clone()))),
            lecturer_ratings: LecturerRatingService::new(
                Arc::new(PgRatingStore::<LecturerKind>::new(pool.clone())),
                Arc::new(PgAggregateStore::<LecturerKind>::new(pool.clone())),
            ),
            campus_ratings: CampusRatingService::new(
                Arc::new(PgRatingStore::<CampusKind>::new(pool.clone())),
                Arc::new(PgAggregateStore::<CampusKind>::new(pool.clone())),
            ),
            search: SearchService::new(Arc::new(PgSearchIndex::new(pool)), config.search_limit),
        }
    }

    /// Services backed by in-process stores
    pub fn in_memory() -> Self {
        let lecturers = Arc::new(MemoryLecturerStore::new());
        let campuses = Arc::new(MemoryCampusStore::new());

        Self {
            lecturers: LecturerService::new(lecturers.clone()),
            campuses: CampusService::new(campuses.clone()),
            lecturer_ratings: LecturerRatingService::new(
                Arc::new(MemoryRatingStore::<LecturerKind>::new()),
                lecturers.clone(),
            ),
            campus_ratings: CampusRatingService::new(
                Arc::new(MemoryRatingStore::<CampusKind>::new()),
                campuses.clone(),
            ),
            search: SearchService::new(
                Arc::new(MemorySearchIndex::new(lecturers, campuses)),
                DEFAULT_SEARCH_LIMIT,
            ),
        }
    }

    /// Recompute the aggregate of every lecturer
    pub async fn reconcile_lecturers(&self) -> ServiceResult<ReconcileReport> {
        let ids = self.lecturers.ids().await?;
        Ok(self.lecturer_ratings.reconcile(ids).await)
    }

    /// Recompute the aggregate of every campus
    pub async fn reconcile_campuses(&self) -> ServiceResult<ReconcileReport> {
        let ids = self.campuses.ids().await?;
        Ok(self.campus_ratings.reconcile(ids).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campuses::{CampusDetails, CampusScores, CreateCampus};
    use crate::lecturers::{CreateLecturer, LecturerDetails, LecturerScores};
    use crate::ratings::NewRating;
    use crate::search::SearchQuery;

    #[tokio::test]
    async fn test_in_memory_state_shares_catalogs_between_services() {
        let state = AppState::in_memory();

        let lecturer = state
            .lecturers
            .create(CreateLecturer {
                name: "Ama Mensah".to_string(),
                university: "University of Ghana".to_string(),
                department: "Computer Science".to_string(),
                courses: vec![],
            })
            .await
            .unwrap();

        state
            .lecturer_ratings
            .create(
                NewRating {
                    target_id: lecturer.id.to_string(),
                    scores: LecturerScores {
                        difficulty: 2,
                        quality: 5,
                    },
                    details: LecturerDetails {
                        course: "DCIT205".to_string(),
                        credit_hr: 3,
                        grade: "A".to_string(),
                        textbook: true,
                        comment: None,
                    },
                },
                Some("65f1c0ffee0000000000a001"),
            )
            .await
            .unwrap();

        let rated = state.lecturers.find_one(lecturer.id.as_str()).await.unwrap();
        assert_eq!((rated.rating, rated.count), (3.5, 1));

        let found = state
            .search
            .search(SearchQuery {
                lecturer_name: Some("mensah".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.count, 1);
    }

    #[tokio::test]
    async fn test_reconcile_every_target() {
        let state = AppState::in_memory();

        for name in ["University of Ghana", "University of Cape Coast"] {
            let campus = state
                .campuses
                .create(CreateCampus {
                    name: name.to_string(),
                    address: "Ghana".to_string(),
                    description: None,
                    image_url: None,
                })
                .await
                .unwrap();

            state
                .campus_ratings
                .create(
                    NewRating {
                        target_id: campus.id.to_string(),
                        scores: CampusScores::uniform(4),
                        details: CampusDetails::default(),
                    },
                    Some("65f1c0ffee0000000000a001"),
                )
                .await
                .unwrap();
        }

        let report = state.reconcile_campuses().await.unwrap();
        assert_eq!(report, ReconcileReport { refreshed: 2, failed: 0 });

        let report = state.reconcile_lecturers().await.unwrap();
        assert_eq!(report, ReconcileReport::default());
    }
}
