use crate::error::Result;
use crate::types::{EdgeAttrs, NodeAttrs, Relationship};
use catalog_model::{AlgorithmId, AlgorithmRecord};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction::{Incoming, Outgoing};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Directed, attributed relationship graph over one catalog snapshot.
///
/// Nodes are catalog entries keyed by [`AlgorithmId`]; edges carry the
/// relationship kind, weight, and metadata. Parallel edges of different kinds
/// between the same pair are allowed.
pub struct AlgorithmGraph {
    graph: DiGraph<NodeAttrs, EdgeAttrs>,
    index: HashMap<AlgorithmId, NodeIndex>,
}

impl AlgorithmGraph {
    /// Materialize records as nodes and relationships as edges.
    ///
    /// The builder may reference entries that never made it into the
    /// snapshot; edges with an unknown endpoint are dropped here.
    pub fn materialize(records: &[AlgorithmRecord], relationships: &[Relationship]) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::with_capacity(records.len());

        for record in records {
            let attrs = NodeAttrs::from_record(record);
            let id = attrs.id.clone();
            let node = graph.add_node(attrs);
            index.insert(id, node);
        }

        let mut dropped = 0usize;
        for rel in relationships {
            match (index.get(&rel.from), index.get(&rel.to)) {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(
                        from,
                        to,
                        EdgeAttrs {
                            kind: rel.kind,
                            weight: rel.weight,
                            metadata: rel.metadata.clone(),
                        },
                    );
                }
                _ => {
                    log::debug!("dropping edge with unknown endpoint: {} -> {}", rel.from, rel.to);
                    dropped += 1;
                }
            }
        }
        if dropped > 0 {
            log::warn!("dropped {dropped} relationships with endpoints outside the snapshot");
        }

        log::info!(
            "Graph built: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Self { graph, index }
    }

    pub fn contains(&self, id: &AlgorithmId) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &AlgorithmId) -> Option<&NodeAttrs> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    /// Distinct nodes with an edge into `id`, in discovery order.
    pub fn predecessors(&self, id: &AlgorithmId) -> Vec<&NodeAttrs> {
        self.neighbors(id, Incoming)
    }

    /// Distinct nodes reachable by one edge out of `id`, in discovery order.
    pub fn successors(&self, id: &AlgorithmId) -> Vec<&NodeAttrs> {
        self.neighbors(id, Outgoing)
    }

    fn neighbors(&self, id: &AlgorithmId, direction: petgraph::Direction) -> Vec<&NodeAttrs> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        // Parallel edges repeat neighbors; keep the first occurrence only.
        let mut seen = HashSet::new();
        self.graph
            .neighbors_directed(idx, direction)
            .filter(|n| seen.insert(*n))
            .map(|n| &self.graph[n])
            .collect()
    }

    /// Total edge count touching the node (in + out, parallel edges counted).
    pub fn degree(&self, id: &AlgorithmId) -> Option<usize> {
        let &idx = self.index.get(id)?;
        Some(
            self.graph.edges_directed(idx, Incoming).count()
                + self.graph.edges_directed(idx, Outgoing).count(),
        )
    }

    /// Whether any directed edge `from -> to` exists, of any kind.
    pub fn has_edge(&self, from: &AlgorithmId, to: &AlgorithmId) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Outgoing edges of a node with their attributes.
    pub fn outgoing_edges(&self, id: &AlgorithmId) -> Vec<(AlgorithmId, AlgorithmId, EdgeAttrs)> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, Outgoing)
            .map(|edge| {
                (
                    self.graph[edge.source()].id.clone(),
                    self.graph[edge.target()].id.clone(),
                    edge.weight().clone(),
                )
            })
            .collect()
    }

    /// Every edge in the graph as `(from, to, attrs)`.
    pub fn edges(&self) -> impl Iterator<Item = (&AlgorithmId, &AlgorithmId, &EdgeAttrs)> {
        self.graph.edge_references().map(|edge| {
            (
                &self.graph[edge.source()].id,
                &self.graph[edge.target()].id,
                edge.weight(),
            )
        })
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &AlgorithmId> {
        self.graph.node_weights().map(|attrs| &attrs.id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Serialize the whole graph to a JSON blob on disk.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer(BufWriter::new(file), &self.graph)?;
        log::info!("Graph saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Load a graph blob written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let graph: DiGraph<NodeAttrs, EdgeAttrs> = serde_json::from_reader(BufReader::new(file))?;

        let index = graph
            .node_indices()
            .map(|idx| (graph[idx].id.clone(), idx))
            .collect();

        Ok(Self { graph, index })
    }
}
