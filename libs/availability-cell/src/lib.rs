pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

// Re-export the pieces other cells build on
pub use models::{AvailabilityConfig, BookableSlot, Doctor, TimeRange};
pub use services::slots;
