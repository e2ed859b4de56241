use crate::error::GraphError;
use catalog_model::{AlgorithmId, AlgorithmRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Type of relationship between two catalog entries.
///
/// One tag per derivation signal; a pair of entries may be linked by several
/// kinds at once, but never twice by the same kind in the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Explicit cross-reference in the entry's metadata.
    SeeAlso,

    /// One entry's execution invokes another.
    CallsChild,

    /// Deprecation chain, from deprecated entry to its replacement.
    ReplacedBy,

    /// An output of one entry is type-compatible with an input of another.
    WorkspaceFlow,

    /// Co-membership in a small category.
    SameCategory,
}

impl RelationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SeeAlso => "see_also",
            Self::CallsChild => "calls_child",
            Self::ReplacedBy => "replaced_by",
            Self::WorkspaceFlow => "workspace_flow",
            Self::SameCategory => "same_category",
        }
    }

    /// Default edge weight for this kind.
    #[must_use]
    pub const fn default_weight(self) -> f32 {
        match self {
            Self::SeeAlso => 0.8,
            Self::CallsChild => 0.9,
            Self::ReplacedBy => 1.0,
            Self::WorkspaceFlow => 0.6,
            Self::SameCategory => 0.3,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "see_also" => Ok(Self::SeeAlso),
            "calls_child" => Ok(Self::CallsChild),
            "replaced_by" => Ok(Self::ReplacedBy),
            "workspace_flow" => Ok(Self::WorkspaceFlow),
            "same_category" => Ok(Self::SameCategory),
            other => Err(GraphError::UnknownKind(other.to_string())),
        }
    }
}

/// Directed, typed edge between two catalog identities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: AlgorithmId,
    pub to: AlgorithmId,
    pub kind: RelationKind,

    /// Strength/confidence in `[0, 1]`.
    pub weight: f32,

    /// Provenance of the edge, e.g. which category or workspace type produced it.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Node attributes carried into the graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAttrs {
    pub id: AlgorithmId,
    pub name: String,
    pub version: u32,
    pub summary: String,
    pub category: String,
    pub categories: Vec<String>,
    pub deprecated: bool,
    pub language: String,
}

impl NodeAttrs {
    pub fn from_record(record: &AlgorithmRecord) -> Self {
        Self {
            id: record.id(),
            name: record.name.clone(),
            version: record.version,
            summary: record.summary.clone(),
            category: record.category.clone(),
            categories: record.categories.clone(),
            deprecated: record.deprecated,
            language: record.language.clone(),
        }
    }
}

/// Edge attributes carried into the graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeAttrs {
    pub kind: RelationKind,
    pub weight: f32,
    pub metadata: BTreeMap<String, String>,
}
