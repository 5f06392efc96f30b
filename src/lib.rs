pub mod aggregation;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod repositories;
pub mod summary;

pub use aggregation::{aggregate, top_n};
pub use config::Config;
pub use error::{AppError, Result};
pub use pipeline::{run, ArtifactPaths, RunOutcome};
