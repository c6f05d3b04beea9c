pub mod accessors;
pub mod config;
pub mod error;
pub mod kube;

// Re-exports for convenience
pub use config::Config;
pub use error::{PodHelperError, PodHelperResult};
