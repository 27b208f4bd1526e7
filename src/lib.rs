//! Lecturer and campus ratings with denormalized averages kept in step with
//! every rating write.

pub mod app;
pub mod campuses;
pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod lecturers;
pub mod ratings;
pub mod search;

pub use app::AppState;
pub use error::{ServiceError, ServiceResult, StoreError, StoreResult};
pub use ids::ObjectId;
