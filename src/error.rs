use thiserror::Error;

pub type Result<T> = std::result::Result<T, GridError>;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("Column already exists: {0}")]
    DuplicateColumn(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column cannot be resized: {0}")]
    ColumnNotResizable(String),

    #[error("Column is already being dragged: {0}")]
    DragInProgress(String),

    #[error("No active drag for column: {0}")]
    NoActiveDrag(String),

    #[error("Column is already being resized: {0}")]
    ResizeInProgress(String),

    #[error("No active resize for column: {0}")]
    NoActiveResize(String),

    #[error("Invalid width {width} for column {column}")]
    InvalidWidth { column: String, width: f64 },

    #[error("Invalid configuration snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Configuration snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Other(String),
}
