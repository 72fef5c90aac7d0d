pub mod analyze;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod git;
pub mod insights;
pub mod model;
pub mod report;
pub mod util;

pub use error::{InsightsError, Result};
