use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Metadata store error: {0}")]
    MetadataStore(#[from] catalog_metadata_store::MetadataStoreError),

    #[error("Vector store error: {0}")]
    VectorStore(#[from] catalog_vector_store::VectorStoreError),

    #[error("Graph error: {0}")]
    Graph(#[from] catalog_graph::GraphError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
