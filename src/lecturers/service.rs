use std::sync::Arc;
use validator::Validate;

use crate::error::{ServiceError, ServiceResult};
use crate::ids::ObjectId;
use crate::lecturers::{CreateLecturer, Lecturer, LecturerStore, UpdateLecturer};
use crate::ratings::parse_reference;

/// Catalog operations on lecturers
///
/// Never writes `rating` or `count`; those belong to the rating aggregator.
#[derive(Clone)]
pub struct LecturerService {
    store: Arc<dyn LecturerStore>,
}

impl LecturerService {
    /// Create a new LecturerService
    pub fn new(store: Arc<dyn LecturerStore>) -> Self {
        Self { store }
    }

    fn not_found(id: &ObjectId) -> ServiceError {
        ServiceError::NotFound {
            resource: "Lecturer",
            id: id.to_string(),
        }
    }

    fn course_name(course: &str) -> ServiceResult<&str> {
        let course = course.trim();
        if course.is_empty() {
            return Err(ServiceError::Validation(
                "Course name must not be empty".to_string(),
            ));
        }
        Ok(course)
    }

    /// Create a lecturer with an empty rating aggregate
    pub async fn create(&self, input: CreateLecturer) -> ServiceResult<Lecturer> {
        input.validate()?;

        let lecturer = self.store.insert(Lecturer::new(input)).await?;

        tracing::info!("Created lecturer {} ({})", lecturer.id, lecturer.name);
        Ok(lecturer)
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<Lecturer>> {
        tracing::debug!("Fetching all lecturers");
        Ok(self.store.find_all().await?)
    }

    pub async fn find_one(&self, id: &str) -> ServiceResult<Lecturer> {
        let id = parse_reference("Lecturer", id)?;

        self.store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| Self::not_found(&id))
    }

    pub async fn update(&self, id: &str, input: UpdateLecturer) -> ServiceResult<Lecturer> {
        let id = parse_reference("Lecturer", id)?;
        input.validate()?;

        let lecturer = self
            .store
            .update_by_id(&id, &input)
            .await?
            .ok_or_else(|| Self::not_found(&id))?;

        tracing::info!("Updated lecturer {}", lecturer.id);
        Ok(lecturer)
    }

    /// Delete a lecturer. Its ratings are kept and no longer aggregated anywhere
    pub async fn remove(&self, id: &str) -> ServiceResult<Lecturer> {
        let id = parse_reference("Lecturer", id)?;

        let lecturer = self
            .store
            .delete_by_id(&id)
            .await?
            .ok_or_else(|| Self::not_found(&id))?;

        tracing::info!("Deleted lecturer {}", lecturer.id);
        Ok(lecturer)
    }

    /// Append a course to the lecturer's list
    pub async fn add_course(&self, id: &str, course: &str) -> ServiceResult<Lecturer> {
        let id = parse_reference("Lecturer", id)?;
        let course = Self::course_name(course)?;

        let lecturer = self
            .store
            .push_course(&id, course)
            .await?
            .ok_or_else(|| Self::not_found(&id))?;

        tracing::info!("Added course {} to lecturer {}", course, lecturer.id);
        Ok(lecturer)
    }

    /// Remove every occurrence of a course from the lecturer's list
    pub async fn remove_course(&self, id: &str, course: &str) -> ServiceResult<Lecturer> {
        let id = parse_reference("Lecturer", id)?;
        let course = Self::course_name(course)?;

        let lecturer = self
            .store
            .pull_course(&id, course)
            .await?
            .ok_or_else(|| Self::not_found(&id))?;

        tracing::info!("Removed course {} from lecturer {}", course, lecturer.id);
        Ok(lecturer)
    }

    /// Ids of every lecturer
    pub async fn ids(&self) -> ServiceResult<Vec<ObjectId>> {
        Ok(self.store.ids().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lecturers::MemoryLecturerStore;

    fn service() -> LecturerService {
        LecturerService::new(Arc::new(MemoryLecturerStore::new()))
    }

    fn new_lecturer(name: &str) -> CreateLecturer {
        CreateLecturer {
            name: name.to_string(),
            university: "University of Ghana".to_string(),
            department: "Computer Science".to_string(),
            courses: vec!["DCIT101".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_starts_with_empty_aggregate() {
        let service = service();

        let lecturer = service.create(new_lecturer("Ama Mensah")).await.unwrap();

        assert_eq!(lecturer.rating, 0.0);
        assert_eq!(lecturer.count, 0);
        assert_eq!(lecturer.courses, vec!["DCIT101".to_string()]);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let service = service();

        let result = service.create(new_lecturer("")).await;

        match result {
            Err(ServiceError::Validation(_)) => (),
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_find_all_orders_by_name() {
        let service = service();
        service.create(new_lecturer("Kofi Boateng")).await.unwrap();
        service.create(new_lecturer("Abena Owusu")).await.unwrap();

        let names: Vec<String> = service
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();

        assert_eq!(names, vec!["Abena Owusu", "Kofi Boateng"]);
    }

    #[tokio::test]
    async fn test_find_one_errors() {
        let service = service();

        match service.find_one("not-an-id").await {
            Err(ServiceError::InvalidReference { what: "Lecturer", .. }) => (),
            other => panic!("Expected InvalidReference, got {:?}", other),
        }

        match service.find_one(ObjectId::new().as_str()).await {
            Err(ServiceError::NotFound { resource: "Lecturer", .. }) => (),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_keeps_omitted_fields() {
        let service = service();
        let lecturer = service.create(new_lecturer("Yaw Asante")).await.unwrap();

        let updated = service
            .update(
                lecturer.id.as_str(),
                UpdateLecturer {
                    department: Some("Mathematics".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.department, "Mathematics");
        assert_eq!(updated.name, "Yaw Asante");
        assert_eq!(updated.university, lecturer.university);
    }

    #[tokio::test]
    async fn test_add_and_remove_course() {
        let service = service();
        let lecturer = service.create(new_lecturer("Efua Darko")).await.unwrap();
        let id = lecturer.id.as_str();

        service.add_course(id, "DCIT201").await.unwrap();
        let with_duplicate = service.add_course(id, "DCIT101").await.unwrap();
        assert_eq!(
            with_duplicate.courses,
            vec!["DCIT101", "DCIT201", "DCIT101"]
        );

        let pulled = service.remove_course(id, "DCIT101").await.unwrap();
        assert_eq!(pulled.courses, vec!["DCIT201"]);
    }

    #[tokio::test]
    async fn test_add_course_rejects_blank_name() {
        let service = service();
        let lecturer = service.create(new_lecturer("Kwame Nti")).await.unwrap();

        match service.add_course(lecturer.id.as_str(), "   ").await {
            Err(ServiceError::Validation(_)) => (),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remove_returns_deleted_lecturer() {
        let service = service();
        let lecturer = service.create(new_lecturer("Akua Sarpong")).await.unwrap();

        let removed = service.remove(lecturer.id.as_str()).await.unwrap();
        assert_eq!(removed.id, lecturer.id);

        match service.remove(lecturer.id.as_str()).await {
            Err(ServiceError::NotFound { .. }) => (),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}
