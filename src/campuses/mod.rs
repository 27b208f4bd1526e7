pub mod models;
pub mod rating;
pub mod repository;
pub mod memory;
pub mod service;
pub mod seed;

pub use models::*;
pub use rating::*;
pub use repository::*;
pub use memory::*;
pub use service::*;
pub use seed::*;
