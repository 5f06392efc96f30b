use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Fetch error from {source_name}: {message}")]
    Fetch {
        source_name: String,
        message: String,
    },

    #[error("Malformed reading (id {id}): {reason}")]
    MalformedInput { id: i64, reason: String },

    #[error("Render error in {artifact}{}: {message}", page_suffix(.page))]
    Render {
        artifact: String,
        page: Option<usize>,
        message: String,
    },

    #[error("Export error for {table} summary ({}): {source}", .path.display())]
    ExportWrite {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Cannot create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("DB error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn page_suffix(page: &Option<usize>) -> String {
    match page {
        Some(n) => format!(" (page {})", n),
        None => String::new(),
    }
}

impl AppError {
    pub fn fetch(source_name: impl Into<String>, message: impl ToString) -> Self {
        AppError::Fetch {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub fn malformed(id: i64, reason: impl Into<String>) -> Self {
        AppError::MalformedInput {
            id,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
