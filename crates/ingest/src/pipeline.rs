use crate::artifacts::ArtifactPaths;
use crate::error::Result;
use catalog_graph::{relationship_statistics, AlgorithmGraph, RelationshipBuilder};
use catalog_metadata_store::MetadataStore;
use catalog_model::{AlgorithmId, AlgorithmRecord, DocRecord};
use catalog_vector_store::{EmbeddingGenerator, TextEncoder, VectorIndexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Artifact locations recorded in the build manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestFiles {
    pub database: String,
    pub vector_index: String,
    pub graph: String,
}

/// Summary of one completed snapshot build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildManifest {
    pub catalog_version: String,
    pub algorithm_count: usize,
    pub relationship_count: usize,
    pub embedding_count: usize,
    pub files: ManifestFiles,
}

/// Builds every artifact for one catalog snapshot in a single pass.
///
/// The encoder is the only external collaborator; it is passed in explicitly
/// and shared by ingestion and, later, the retriever.
pub struct IngestPipeline<'a> {
    catalog_version: String,
    paths: ArtifactPaths,
    encoder: &'a dyn TextEncoder,
}

impl<'a> IngestPipeline<'a> {
    pub fn new(
        catalog_version: impl Into<String>,
        output_dir: impl AsRef<Path>,
        encoder: &'a dyn TextEncoder,
    ) -> Result<Self> {
        let catalog_version = catalog_version.into();
        std::fs::create_dir_all(output_dir.as_ref())?;
        Ok(Self {
            paths: ArtifactPaths::new(output_dir, &catalog_version),
            catalog_version,
            encoder,
        })
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Run the full build: relational store, relationships, embeddings +
    /// vector index, graph, manifest.
    pub fn run(&self, records: &[AlgorithmRecord], docs: &[DocRecord]) -> Result<BuildManifest> {
        log::info!(
            "Building catalog v{}: {} records, {} docs",
            self.catalog_version,
            records.len(),
            docs.len()
        );

        let doc_lookup: HashMap<AlgorithmId, &DocRecord> =
            docs.iter().map(|doc| (doc.id(), doc)).collect();

        // 1. Relational store.
        let mut store = MetadataStore::create(&self.paths.db_path)?;
        for record in records {
            store.insert_algorithm(record)?;
        }
        for doc in docs {
            store.insert_documentation(doc)?;
        }

        // 2. Relationships, into the store.
        let relationships = RelationshipBuilder::new(records).build();
        for (kind, count) in relationship_statistics(&relationships) {
            log::info!("  {}: {count}", kind.as_str());
        }
        for rel in &relationships {
            store.insert_relationship(rel)?;
        }

        // 3. Embeddings and the vector index. The mapping row is written in
        // the same step as the vector, so every internal id resolves.
        let generator = EmbeddingGenerator::new(self.encoder);
        let mut builder = VectorIndexBuilder::new(self.encoder.dimension());
        for record in records {
            let Some(algorithm_id) = store.algorithm_id(&record.name, record.version)? else {
                log::warn!("record missing from store, skipping embeddings: {}", record.id());
                continue;
            };
            let doc = doc_lookup.get(&record.id()).copied();
            for (facet, vector) in generator.generate(record, doc)? {
                let vector_id = builder.add(vector)?;
                store.insert_embedding_row(vector_id, algorithm_id, facet)?;
            }
        }
        let index = builder.freeze();
        index.save(&self.paths.index_path)?;

        // 4. Relationship graph.
        let graph = AlgorithmGraph::materialize(records, &relationships);
        graph.save(&self.paths.graph_path)?;

        // 5. Manifest.
        let manifest = BuildManifest {
            catalog_version: self.catalog_version.clone(),
            algorithm_count: store.algorithm_count()?,
            relationship_count: store.relationship_count()?,
            embedding_count: store.embedding_count()?,
            files: ManifestFiles {
                database: self.paths.db_path.display().to_string(),
                vector_index: self.paths.index_path.display().to_string(),
                graph: self.paths.graph_path.display().to_string(),
            },
        };
        let file = File::create(&self.paths.manifest_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &manifest)?;

        log::info!(
            "Catalog v{} built: {} algorithms, {} relationships, {} vectors",
            self.catalog_version,
            manifest.algorithm_count,
            manifest.relationship_count,
            manifest.embedding_count
        );

        Ok(manifest)
    }
}
