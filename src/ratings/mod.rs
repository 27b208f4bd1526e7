pub mod models;
pub mod repository;
pub mod memory;
pub mod locks;
pub mod aggregation;
pub mod service;

pub use models::*;
pub use repository::*;
pub use memory::*;
pub use locks::*;
pub use aggregation::*;
pub use service::*;
