use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::ids::ObjectId;

/// A rated lecturer. `rating` and `count` are maintained by the aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Lecturer {
    pub id: ObjectId,
    pub name: String,
    pub university: String,
    pub department: String,
    pub courses: Vec<String>,
    pub rating: f64,
    pub count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a new lecturer
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLecturer {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 200, message = "University must be between 1 and 200 characters"))]
    pub university: String,
    #[validate(length(min = 1, max = 200, message = "Department must be between 1 and 200 characters"))]
    pub department: String,
    #[serde(default)]
    pub courses: Vec<String>,
}

/// Request DTO for updating a lecturer; aggregate fields are not writable here
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLecturer {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 200, message = "University must be between 1 and 200 characters"))]
    pub university: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Department must be between 1 and 200 characters"))]
    pub department: Option<String>,
    pub courses: Option<Vec<String>>,
}

impl Lecturer {
    /// A fresh lecturer with an empty aggregate
    pub fn new(input: CreateLecturer) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            name: input.name,
            university: input.university,
            department: input.department,
            courses: input.courses,
            rating: 0.0,
            count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the present fields of an update
    pub fn apply(&mut self, update: &UpdateLecturer) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(university) = &update.university {
            self.university = university.clone();
        }
        if let Some(department) = &update.department {
            self.department = department.clone();
        }
        if let Some(courses) = &update.courses {
            self.courses = courses.clone();
        }
        self.updated_at = Utc::now();
    }
}
