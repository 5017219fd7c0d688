// src/biography/mod.rs
pub mod models;
pub mod resolver;
pub mod store;

// Re-export key biography types for convenience
pub use models::SpeakerRecord;
pub use resolver::{SpeakerLookup, SpeakerResolver};
pub use store::BiographyStore;
