use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical identity of a catalog entry: `"{name}-v{version}"`.
///
/// The string form is what graph nodes and relationship endpoints are keyed
/// by. Version comparisons parse the numeric suffix; the raw string orders
/// lexicographically, which only bare-name resolution in graph search relies
/// on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlgorithmId(String);

impl AlgorithmId {
    pub fn new(name: &str, version: u32) -> Self {
        Self(format!("{name}-v{version}"))
    }

    /// Wrap an already-formatted id string without validation.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split back into `(name, version)`. Returns `None` when the string does
    /// not follow the `"{name}-v{version}"` scheme.
    pub fn parse(&self) -> Option<(&str, u32)> {
        let (name, version) = self.0.rsplit_once("-v")?;
        let version = version.parse::<u32>().ok()?;
        if name.is_empty() {
            return None;
        }
        Some((name, version))
    }

    pub fn name(&self) -> Option<&str> {
        self.parse().map(|(name, _)| name)
    }

    pub fn version(&self) -> Option<u32> {
        self.parse().map(|(_, version)| version)
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AlgorithmId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_and_parses() {
        let id = AlgorithmId::new("Rebin", 2);
        assert_eq!(id.as_str(), "Rebin-v2");
        assert_eq!(id.parse(), Some(("Rebin", 2)));
    }

    #[test]
    fn parses_names_containing_dashes() {
        let id = AlgorithmId::from_raw("Load-Nexus-v10");
        assert_eq!(id.parse(), Some(("Load-Nexus", 10)));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert_eq!(AlgorithmId::from_raw("Rebin").parse(), None);
        assert_eq!(AlgorithmId::from_raw("Rebin-vtwo").parse(), None);
        assert_eq!(AlgorithmId::from_raw("-v3").parse(), None);
    }

    #[test]
    fn version_comparison_is_numeric_after_parse() {
        let v2 = AlgorithmId::new("Rebin", 2);
        let v10 = AlgorithmId::new("Rebin", 10);
        // The raw strings order the wrong way round; parsed versions do not.
        assert!(v10.as_str() < v2.as_str());
        assert!(v10.version().unwrap() > v2.version().unwrap());
    }
}
