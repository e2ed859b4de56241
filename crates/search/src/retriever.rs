use crate::error::{Result, SearchError};
use catalog_graph::{AlgorithmGraph, EdgeAttrs, NodeAttrs};
use catalog_metadata_store::{AlgorithmEntry, MetadataStore};
use catalog_model::{AlgorithmId, EmbeddingFacet};
use catalog_vector_store::{TextEncoder, VectorIndex};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Predecessors/successors returned per graph lookup.
const NEIGHBOR_CAP: usize = 5;

/// One retrieval hit: the denormalized record, its similarity score, and the
/// facet that matched.
#[derive(Debug, Clone)]
pub struct ScoredAlgorithm {
    pub entry: AlgorithmEntry,
    pub score: f32,
    pub matched_facet: EmbeddingFacet,
}

/// Graph neighborhood of one algorithm. `algorithm` is `None` when the
/// requested name resolved to nothing; that is an empty result, not an error.
#[derive(Debug, Clone, Default)]
pub struct GraphNeighborhood {
    pub algorithm: Option<AlgorithmId>,
    pub upstream: Vec<NodeAttrs>,
    pub downstream: Vec<NodeAttrs>,
    pub edges: Vec<(AlgorithmId, AlgorithmId, EdgeAttrs)>,
}

/// Boost constants for [`Retriever::hybrid_search`].
///
/// Heuristics with no derivation behind them; kept configurable rather than
/// baked in.
#[derive(Debug, Clone, Copy)]
pub struct HybridWeights {
    /// Multiplier on degree centrality (`degree / (nodes - 1)`).
    pub centrality: f32,
    /// Flat bonus per co-occurring, directly connected candidate.
    pub cooccurrence: f32,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            centrality: 0.1,
            cooccurrence: 0.05,
        }
    }
}

/// Search strategy selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Vector,
    Hybrid,
    Graph,
}

/// Result of the mode dispatcher: ranked hits for vector/hybrid queries, a
/// neighborhood for graph queries.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Ranked(Vec<ScoredAlgorithm>),
    Neighborhood(GraphNeighborhood),
}

/// Query-time orchestrator over the three snapshot artifacts.
///
/// All three backing stores are opened once at construction and treated as
/// immutable for the instance's lifetime. The SQLite connection is not
/// `Sync`, so relational reads are serialized behind a mutex; the index and
/// graph are plain shared data.
pub struct Retriever {
    store: Mutex<MetadataStore>,
    index: VectorIndex,
    graph: AlgorithmGraph,
    encoder: Box<dyn TextEncoder>,
    weights: HybridWeights,
}

impl Retriever {
    /// Open the retriever over artifacts built by the ingest pipeline.
    ///
    /// A missing or malformed artifact aborts construction; the retriever
    /// never operates in a partially loaded state.
    pub fn open(
        db_path: impl AsRef<Path>,
        index_path: impl AsRef<Path>,
        graph_path: impl AsRef<Path>,
        encoder: Box<dyn TextEncoder>,
    ) -> Result<Self> {
        for path in [db_path.as_ref(), index_path.as_ref(), graph_path.as_ref()] {
            if !path.exists() {
                return Err(SearchError::MissingArtifact(path.display().to_string()));
            }
        }

        let store = MetadataStore::open(db_path.as_ref())?;
        // SQLite opens lazily; touch the schema so a corrupt store fails
        // here rather than on the first query.
        store.algorithm_count()?;
        let index = VectorIndex::load(index_path.as_ref())?;
        let graph = AlgorithmGraph::load(graph_path.as_ref())?;

        log::info!(
            "Retriever ready: {} vectors, {} nodes, {} edges",
            index.len(),
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self {
            store: Mutex::new(store),
            index,
            graph,
            encoder,
            weights: HybridWeights::default(),
        })
    }

    pub fn with_weights(mut self, weights: HybridWeights) -> Self {
        self.weights = weights;
        self
    }

    fn store(&self) -> MutexGuard<'_, MetadataStore> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Dispatch a query by [`SearchMode`].
    pub fn search(&self, query: &str, top_k: usize, mode: SearchMode) -> Result<SearchOutcome> {
        match mode {
            SearchMode::Vector => Ok(SearchOutcome::Ranked(self.vector_search(query, top_k, None)?)),
            SearchMode::Hybrid => Ok(SearchOutcome::Ranked(self.hybrid_search(query, top_k)?)),
            SearchMode::Graph => Ok(SearchOutcome::Neighborhood(self.graph_search(query))),
        }
    }

    /// Similarity search over the facet index.
    ///
    /// Oversamples the index (`top_k * 2`, or `* 4` under a facet filter,
    /// since filtering discards hits), resolves each hit back to its entry,
    /// and deduplicates by entity keeping the highest-similarity facet.
    /// Results stay in index candidate order: strictly descending score with
    /// stable ties, never re-sorted.
    pub fn vector_search(
        &self,
        query: &str,
        top_k: usize,
        facet_filter: Option<EmbeddingFacet>,
    ) -> Result<Vec<ScoredAlgorithm>> {
        let query_vector = self.encoder.encode(query)?;
        let pool = if facet_filter.is_some() { top_k * 4 } else { top_k * 2 };
        let neighbors = self.index.search(&query_vector, pool)?;

        let store = self.store();
        let mut results = Vec::new();
        let mut seen = HashSet::new();

        for (vector_id, score) in neighbors {
            let Some((algorithm_id, facet)) = store.embedding_target(vector_id)? else {
                log::debug!("no embedding mapping for vector {vector_id}");
                continue;
            };

            if facet_filter.is_some_and(|filter| facet != filter) {
                continue;
            }

            // The same entity surfaces under several facets; keep the first
            // (highest-similarity) occurrence only.
            if !seen.insert(algorithm_id) {
                continue;
            }

            let Some(entry) = store.get_algorithm(algorithm_id)? else {
                log::debug!("embedding mapping points at missing algorithm {algorithm_id}");
                continue;
            };

            results.push(ScoredAlgorithm {
                entry,
                score,
                matched_facet: facet,
            });

            if results.len() >= top_k {
                break;
            }
        }

        Ok(results)
    }

    /// Vector search re-ranked with graph signals.
    ///
    /// Candidates central to the relationship graph, and candidates directly
    /// connected to other candidates in the same result set, float upward on
    /// the premise that well-connected, mutually-referencing entries are more
    /// likely to be the right answer.
    pub fn hybrid_search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredAlgorithm>> {
        let mut candidates = self.vector_search(query, top_k * 2, None)?;

        let ids: Vec<AlgorithmId> = candidates
            .iter()
            .map(|candidate| candidate.entry.record.id())
            .collect();
        let total_nodes = self.graph.node_count();

        for (i, candidate) in candidates.iter_mut().enumerate() {
            let id = &ids[i];
            if !self.graph.contains(id) {
                continue;
            }

            if total_nodes > 1 {
                if let Some(degree) = self.graph.degree(id) {
                    let centrality = degree as f32 / (total_nodes - 1) as f32;
                    candidate.score += centrality * self.weights.centrality;
                }
            }

            // Pairwise scan over the candidate set, not the whole graph.
            for (j, other) in ids.iter().enumerate() {
                if i != j && self.graph.has_edge(id, other) {
                    candidate.score += self.weights.cooccurrence;
                }
            }
        }

        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        candidates.truncate(top_k);
        Ok(candidates)
    }

    /// Neighborhood lookup by id or bare name.
    ///
    /// A bare name resolves to the lexicographically maximal `"{name}-v*"`
    /// node id, the documented proxy for "latest version" under the identity
    /// scheme. Unknown names yield an empty neighborhood.
    pub fn graph_search(&self, name_or_id: &str) -> GraphNeighborhood {
        let node_id = if name_or_id.contains("-v") {
            AlgorithmId::from_raw(name_or_id)
        } else {
            let prefix = format!("{name_or_id}-v");
            match self
                .graph
                .node_ids()
                .filter(|id| id.as_str().starts_with(&prefix))
                .max()
            {
                Some(id) => id.clone(),
                None => return GraphNeighborhood::default(),
            }
        };

        if !self.graph.contains(&node_id) {
            return GraphNeighborhood::default();
        }

        GraphNeighborhood {
            upstream: self
                .graph
                .predecessors(&node_id)
                .into_iter()
                .take(NEIGHBOR_CAP)
                .cloned()
                .collect(),
            downstream: self
                .graph
                .successors(&node_id)
                .into_iter()
                .take(NEIGHBOR_CAP)
                .cloned()
                .collect(),
            edges: self.graph.outgoing_edges(&node_id),
            algorithm: Some(node_id),
        }
    }

    /// Full denormalized record by integer identity.
    pub fn get_algorithm(&self, id: i64) -> Result<Option<AlgorithmEntry>> {
        Ok(self.store().get_algorithm(id)?)
    }

    /// Integer identity for `(name, version)`.
    pub fn algorithm_id(&self, name: &str, version: u32) -> Result<Option<i64>> {
        Ok(self.store().algorithm_id(name, version)?)
    }
}
