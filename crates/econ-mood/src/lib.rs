pub mod config;
pub mod data;
pub mod error;
pub mod feedback;
pub mod metadata;
pub mod questions;
pub mod scoring;
pub mod series;
pub mod telemetry;

pub use error::AppError;
