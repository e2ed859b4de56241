use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Missing artifact: {0}")]
    MissingArtifact(String),

    #[error("Metadata store error: {0}")]
    MetadataStore(#[from] catalog_metadata_store::MetadataStoreError),

    #[error("Vector store error: {0}")]
    VectorStore(#[from] catalog_vector_store::VectorStoreError),

    #[error("Graph error: {0}")]
    Graph(#[from] catalog_graph::GraphError),
}
