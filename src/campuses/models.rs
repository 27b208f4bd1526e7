use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::ids::ObjectId;

/// A rated campus. `overall_rating` and `count` are maintained by the aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Campus {
    pub id: ObjectId,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub overall_rating: f64,
    pub count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a new campus
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCampus {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 300, message = "Address must be between 1 and 300 characters"))]
    pub address: String,
    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    pub description: Option<String>,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
}

/// Request DTO for updating a campus; aggregate fields are not writable here
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCampus {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 300, message = "Address must be between 1 and 300 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    pub description: Option<String>,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
}

impl Campus {
    /// A fresh campus with an empty aggregate
    pub fn new(input: CreateCampus) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            name: input.name,
            address: input.address,
            description: input.description,
            image_url: input.image_url,
            overall_rating: 0.0,
            count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the present fields of an update
    pub fn apply(&mut self, update: &UpdateCampus) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(address) = &update.address {
            self.address = address.clone();
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(image_url) = &update.image_url {
            self.image_url = Some(image_url.clone());
        }
        self.updated_at = Utc::now();
    }
}
