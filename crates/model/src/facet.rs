use serde::{Deserialize, Serialize};
use std::fmt;

/// Independent text view of an algorithm used for one embedding vector.
///
/// `Summary` and `Full` exist for every entry; `Properties` and `Usage` only
/// when the underlying text is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingFacet {
    Summary,
    Properties,
    Usage,
    Full,
}

impl EmbeddingFacet {
    pub const ALL: [Self; 4] = [Self::Summary, Self::Properties, Self::Usage, Self::Full];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Properties => "properties",
            Self::Usage => "usage",
            Self::Full => "full",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|facet| facet.as_str() == s)
    }
}

impl fmt::Display for EmbeddingFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
