pub mod models;
pub mod repository;
pub mod memory;
pub mod service;

pub use models::*;
pub use repository::*;
pub use memory::*;
pub use service::*;
