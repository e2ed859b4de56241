//! # Catalog Vector Store
//!
//! Multi-facet embedding generation and similarity search for catalog
//! entries.
//!
//! ## Architecture
//!
//! ```text
//! AlgorithmRecord + DocRecord
//!     │
//!     ├──> Facet texts (summary / properties / usage / full)
//!     │      └─> TextEncoder (external collaborator)
//!     │            └─> Vector[D]
//!     │
//!     └──> Vector Index (flat inner product over normalized vectors)
//!            ├─ batch build, then frozen
//!            ├─ top-k nearest neighbor query
//!            └─ JSON blob persistence
//! ```
//!
//! The encoder is injected wherever vectors are produced; the crate never
//! owns a process-wide model handle.

mod encoder;
mod error;
mod facets;
mod index;

pub use encoder::{OllamaEncoder, TextEncoder};
pub use error::{Result, VectorStoreError};
pub use facets::{facet_texts, EmbeddingGenerator};
pub use index::{l2_normalize, VectorIndex, VectorIndexBuilder};
