//! Admissions workflow engine for the ISM schools.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

pub use config::AppConfig;
pub use error::AppError;
