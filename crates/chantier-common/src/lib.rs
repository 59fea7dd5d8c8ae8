//! chantier-common: Shared records, errors, configuration and bid import
//! used across the Chantier crates.

pub mod error;
pub mod entities;
pub mod analysis_config;
pub mod import;

// Re-export commonly used types
pub use analysis_config::{AnalysisConfig, AnalysisSection, WeightsConfig};
pub use entities::{BidRecord, BidStatus};
pub use error::{ChantierError, Result};
