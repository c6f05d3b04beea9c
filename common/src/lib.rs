// Re-export commonly used items
pub mod constants;
pub mod error;
pub mod patch;

// Convenience re-exports
pub use error::CommonError;
pub use patch::{MetadataPatch, PatchVerb};
