//! Shared types for the Campus course platform
//!
//! Domain models, the unified error system, and utility functions used
//! across the campus-cloud service.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
