//! # Catalog Ingest
//!
//! Single-pass batch pipeline that turns one catalog snapshot into the three
//! immutable query artifacts: the relational store, the vector index, and
//! the relationship graph, plus a JSON build manifest describing them.
//!
//! The pipeline runs once per snapshot; nothing is updated incrementally.

mod artifacts;
mod error;
mod pipeline;

pub use artifacts::ArtifactPaths;
pub use error::{IngestError, Result};
pub use pipeline::{BuildManifest, IngestPipeline, ManifestFiles};
