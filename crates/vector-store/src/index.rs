use crate::error::{Result, VectorStoreError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Scale a vector to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Accumulates vectors for a batch build.
///
/// Internal ids are insertion order; the caller records the
/// `(id, entity, facet)` mapping elsewhere in the same pass, so an id with no
/// mapping cannot exist by construction.
pub struct VectorIndexBuilder {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndexBuilder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    /// Normalize and append a vector, returning its internal id.
    pub fn add(&mut self, mut vector: Vec<f32>) -> Result<usize> {
        if vector.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        l2_normalize(&mut vector);
        self.vectors.push(vector);
        Ok(self.vectors.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Finish the batch; the resulting index is immutable.
    pub fn freeze(self) -> VectorIndex {
        log::info!(
            "Vector index frozen: {} vectors of dimension {}",
            self.vectors.len(),
            self.dimension
        );
        VectorIndex {
            dimension: self.dimension,
            vectors: self.vectors,
        }
    }
}

/// Frozen similarity index over L2-normalized vectors.
///
/// Exhaustive inner-product scan; with unit vectors the score is cosine
/// similarity. Catalog snapshots are a few thousand vectors, well inside
/// brute-force territory.
#[derive(Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Top-k nearest neighbors as `(internal id, similarity)` pairs, ordered
    /// by descending similarity. Ties keep insertion order (stable sort).
    ///
    /// The query is normalized here; a query of the wrong dimension is a hard
    /// error, never padded or truncated.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut query = query.to_vec();
        l2_normalize(&mut query);

        let mut scores: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, vector)| (id, dot(&query, vector)))
            .collect();

        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scores.truncate(k);

        Ok(scores)
    }

    /// Persist the index as a JSON blob.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        log::info!(
            "Vector index saved to {} ({} vectors)",
            path.as_ref().display(),
            self.vectors.len()
        );
        Ok(())
    }

    /// Load an index blob written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let index: Self = serde_json::from_reader(BufReader::new(file))?;
        log::info!(
            "Vector index loaded: {} vectors of dimension {}",
            index.vectors.len(),
            index.dimension
        );
        Ok(index)
    }
}
