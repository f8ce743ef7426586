pub(crate) mod clone;
pub(crate) mod credentials;
pub(crate) mod status;

// Public API - curated exports only
pub mod api;

// Re-export commonly used items
pub use api::*;
