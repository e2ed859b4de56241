//! # Catalog Graph
//!
//! Relationship derivation and graph storage for the algorithm catalog.
//!
//! ## Architecture
//!
//! ```text
//! AlgorithmRecord[]
//!     │
//!     ├──> Relationship Builder
//!     │      ├─ see_also cross-references
//!     │      ├─ calls_child invocations
//!     │      ├─ replaced_by deprecation chains
//!     │      ├─ workspace_flow producer → consumer
//!     │      └─ same_category co-membership
//!     │
//!     └──> Algorithm Graph (petgraph)
//!            ├─ Nodes: catalog entries with metadata attributes
//!            ├─ Edges: typed, weighted relationships
//!            └─ JSON blob persistence
//! ```

mod builder;
mod error;
mod graph;
mod types;

pub use builder::{relationship_statistics, RelationshipBuilder};
pub use error::{GraphError, Result};
pub use graph::AlgorithmGraph;
pub use types::{EdgeAttrs, NodeAttrs, RelationKind, Relationship};
