use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Duplicate table id in catalog: {0}")]
    DuplicateTableId(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CanvasError>;
