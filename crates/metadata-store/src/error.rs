use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetadataStoreError>;

#[derive(Error, Debug)]
pub enum MetadataStoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Malformed row: {0}")]
    MalformedRow(String),
}
