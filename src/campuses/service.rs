use std::sync::Arc;
use validator::Validate;

use crate::campuses::{Campus, CampusStore, CreateCampus, UpdateCampus};
use crate::error::{ServiceError, ServiceResult};
use crate::ids::ObjectId;
use crate::ratings::parse_reference;

/// Catalog operations on campuses
#[derive(Clone)]
pub struct CampusService {
    store: Arc<dyn CampusStore>,
}

impl CampusService {
    /// Create a new CampusService
    pub fn new(store: Arc<dyn CampusStore>) -> Self {
        Self { store }
    }

    fn not_found(id: &ObjectId) -> ServiceError {
        ServiceError::NotFound {
            resource: "Campus",
            id: id.to_string(),
        }
    }

    /// Create a campus with an empty rating aggregate
    pub async fn create(&self, input: CreateCampus) -> ServiceResult<Campus> {
        input.validate()?;

        let campus = self.store.insert(Campus::new(input)).await?;

        tracing::info!("Created campus {} ({})", campus.id, campus.name);
        Ok(campus)
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<Campus>> {
        tracing::debug!("Fetching all campuses");
        Ok(self.store.find_all().await?)
    }

    pub async fn find_one(&self, id: &str) -> ServiceResult<Campus> {
        let id = parse_reference("Campus", id)?;

        self.store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| Self::not_found(&id))
    }

    pub async fn update(&self, id: &str, input: UpdateCampus) -> ServiceResult<Campus> {
        let id = parse_reference("Campus", id)?;
        input.validate()?;

        let campus = self
            .store
            .update_by_id(&id, &input)
            .await?
            .ok_or_else(|| Self::not_found(&id))?;

        tracing::info!("Updated campus {}", campus.id);
        Ok(campus)
    }

    /// Delete a campus. Its ratings are kept and no longer aggregated anywhere
    pub async fn remove(&self, id: &str) -> ServiceResult<Campus> {
        let id = parse_reference("Campus", id)?;

        let campus = self
            .store
            .delete_by_id(&id)
            .await?
            .ok_or_else(|| Self::not_found(&id))?;

        tracing::info!("Deleted campus {}", campus.id);
        Ok(campus)
    }

    /// Ids of every campus
    pub async fn ids(&self) -> ServiceResult<Vec<ObjectId>> {
        Ok(self.store.ids().await?)
    }
}
