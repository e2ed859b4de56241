use crate::identity::AlgorithmId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Most usage examples kept per documentation record.
pub const MAX_USAGE_EXAMPLES: usize = 5;

/// Most reference strings kept per documentation record.
pub const MAX_REFERENCES: usize = 10;

/// Data-flow direction of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
    InOut,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Output => "Output",
            Self::InOut => "InOut",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Input" => Some(Self::Input),
            "Output" => Some(Self::Output),
            "InOut" => Some(Self::InOut),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared parameter of a catalog algorithm.
///
/// Names are unique within the owning algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub name: String,

    /// Declared type tag, e.g. a workspace or scalar type name.
    #[serde(rename = "type")]
    pub type_name: String,

    pub direction: Direction,

    #[serde(default)]
    pub optional: bool,

    #[serde(default)]
    pub default_value: Option<String>,

    #[serde(default)]
    pub description: String,
}

/// One catalog entry, uniquely identified by `(name, version)`.
///
/// Records are immutable once extracted for a catalog snapshot; ingestion and
/// query both treat them read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmRecord {
    pub name: String,
    pub version: u32,

    #[serde(default)]
    pub summary: String,

    /// Primary category label.
    #[serde(default)]
    pub category: String,

    /// All category memberships, including the primary.
    #[serde(default)]
    pub categories: Vec<String>,

    /// Names of explicitly cross-referenced algorithms.
    #[serde(default)]
    pub see_also: Vec<String>,

    #[serde(default)]
    pub deprecated: bool,

    /// Replacement algorithm name for deprecated entries.
    #[serde(default)]
    pub deprecated_by: Option<String>,

    #[serde(default)]
    pub properties: Vec<PropertyRecord>,

    /// Names of algorithms this one invokes during execution.
    #[serde(default)]
    pub child_algorithms: Vec<String>,

    /// Source-language tag of the implementation.
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "unknown".to_string()
}

impl AlgorithmRecord {
    pub fn id(&self) -> AlgorithmId {
        AlgorithmId::new(&self.name, self.version)
    }
}

/// Long-form documentation, one-to-one with an algorithm by `(name, version)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocRecord {
    pub algorithm_name: String,
    pub version: u32,

    #[serde(default)]
    pub full_description: String,

    /// Ordered usage snippets; the store keeps at most [`MAX_USAGE_EXAMPLES`].
    #[serde(default)]
    pub usage_examples: Vec<String>,

    /// Ordered reference strings; the store keeps at most [`MAX_REFERENCES`].
    #[serde(default)]
    pub references: Vec<String>,
}

impl DocRecord {
    pub fn id(&self) -> AlgorithmId {
        AlgorithmId::new(&self.algorithm_name, self.version)
    }
}
