use catalog_ingest::{ArtifactPaths, IngestPipeline};
use catalog_model::{AlgorithmRecord, Direction, DocRecord, EmbeddingFacet, PropertyRecord};
use catalog_search::{build_context, HybridWeights, Retriever, SearchMode, SearchOutcome};
use catalog_vector_store::{Result as VectorResult, TextEncoder, VectorStoreError};
use tempfile::TempDir;

const KEYWORDS: [&str; 4] = ["rebin", "load", "save", "fit"];

/// Keyword-axis encoder: texts mentioning the same keyword land on the same
/// axis, which makes similarity fully predictable in tests.
struct KeywordEncoder;

impl TextEncoder for KeywordEncoder {
    fn dimension(&self) -> usize {
        KEYWORDS.len() + 1
    }

    fn encode(&self, text: &str) -> VectorResult<Vec<f32>> {
        let lower = text.to_lowercase();
        let mut vector = vec![0.0f32; self.dimension()];
        for (axis, keyword) in KEYWORDS.iter().enumerate() {
            vector[axis] = lower.matches(keyword).count() as f32;
        }
        // Fallback axis so no text encodes to the zero vector.
        vector[KEYWORDS.len()] = 0.1;
        Ok(vector)
    }
}

/// Encoder whose dimension disagrees with the built index.
struct WrongDimensionEncoder;

impl TextEncoder for WrongDimensionEncoder {
    fn dimension(&self) -> usize {
        3
    }

    fn encode(&self, _text: &str) -> VectorResult<Vec<f32>> {
        Ok(vec![1.0, 0.0, 0.0])
    }
}

fn record(name: &str, version: u32, summary: &str) -> AlgorithmRecord {
    AlgorithmRecord {
        name: name.to_string(),
        version,
        summary: summary.to_string(),
        category: "Transforms".to_string(),
        categories: vec!["Transforms".to_string()],
        see_also: Vec::new(),
        deprecated: false,
        deprecated_by: None,
        properties: Vec::new(),
        child_algorithms: Vec::new(),
        language: "cpp".to_string(),
    }
}

fn snapshot() -> (Vec<AlgorithmRecord>, Vec<DocRecord>) {
    let mut load = record("Load", 1, "load data from disk");
    load.properties = vec![PropertyRecord {
        name: "OutputWorkspace".to_string(),
        type_name: "MatrixWorkspace".to_string(),
        direction: Direction::Output,
        optional: false,
        default_value: None,
        description: "load result".to_string(),
    }];

    let mut rebin_v1 = record("Rebin", 1, "rebin data onto a new grid");
    rebin_v1.see_also = vec!["Load".to_string()];
    rebin_v1.properties = vec![PropertyRecord {
        name: "InputWorkspace".to_string(),
        type_name: "MatrixWorkspace".to_string(),
        direction: Direction::Input,
        optional: false,
        default_value: None,
        description: "rebin input".to_string(),
    }];

    let mut rebin_v2 = rebin_v1.clone();
    rebin_v2.version = 2;

    let save = record("Save", 1, "save results to disk");

    let docs = vec![DocRecord {
        algorithm_name: "Rebin".to_string(),
        version: 2,
        full_description: "Rebins a workspace.".to_string(),
        usage_examples: vec!["out = Rebin(ws)".to_string()],
        references: Vec::new(),
    }];

    (vec![load, rebin_v1, rebin_v2, save], docs)
}

fn build_fixture(dir: &TempDir) -> ArtifactPaths {
    let encoder = KeywordEncoder;
    let pipeline = IngestPipeline::new("test", dir.path(), &encoder).unwrap();
    let (records, docs) = snapshot();
    pipeline.run(&records, &docs).unwrap();
    pipeline.paths().clone()
}

fn open_retriever(paths: &ArtifactPaths) -> Retriever {
    Retriever::open(
        &paths.db_path,
        &paths.index_path,
        &paths.graph_path,
        Box::new(KeywordEncoder),
    )
    .unwrap()
}

#[test]
fn vector_search_deduplicates_entities_and_caps_results() {
    let dir = TempDir::new().unwrap();
    let paths = build_fixture(&dir);
    let retriever = open_retriever(&paths);

    // "rebin" matches several facets of both Rebin versions.
    let results = retriever.vector_search("rebin the data", 3, None).unwrap();

    assert!(!results.is_empty());
    assert!(results.len() <= 3);
    let mut ids: Vec<i64> = results.iter().map(|r| r.entry.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), results.len(), "no entity may appear twice");

    // Scores arrive in non-increasing index order.
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert!(results[0].entry.record.name.contains("Rebin"));
}

#[test]
fn facet_filter_restricts_matches() {
    let dir = TempDir::new().unwrap();
    let paths = build_fixture(&dir);
    let retriever = open_retriever(&paths);

    let results = retriever
        .vector_search("rebin", 5, Some(EmbeddingFacet::Summary))
        .unwrap();

    assert!(!results.is_empty());
    for result in &results {
        assert_eq!(result.matched_facet, EmbeddingFacet::Summary);
    }
}

#[test]
fn hybrid_scores_are_monotonically_non_increasing() {
    let dir = TempDir::new().unwrap();
    let paths = build_fixture(&dir);
    let retriever = open_retriever(&paths);

    let results = retriever.hybrid_search("load and rebin data", 4).unwrap();
    assert!(!results.is_empty());
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn zeroed_hybrid_weights_reduce_to_vector_ranking() {
    let dir = TempDir::new().unwrap();
    let paths = build_fixture(&dir);

    let plain = open_retriever(&paths);
    let zeroed = open_retriever(&paths).with_weights(HybridWeights {
        centrality: 0.0,
        cooccurrence: 0.0,
    });

    let vector: Vec<i64> = plain
        .vector_search("load and rebin data", 3, None)
        .unwrap()
        .iter()
        .map(|r| r.entry.id)
        .collect();
    let hybrid: Vec<i64> = zeroed
        .hybrid_search("load and rebin data", 3)
        .unwrap()
        .iter()
        .map(|r| r.entry.id)
        .collect();

    assert_eq!(vector, hybrid);
}

#[test]
fn graph_boosts_only_raise_scores() {
    let dir = TempDir::new().unwrap();
    let paths = build_fixture(&dir);
    let retriever = open_retriever(&paths);

    let vector = retriever.vector_search("rebin the data", 4, None).unwrap();
    let hybrid = retriever.hybrid_search("rebin the data", 2).unwrap();

    for hit in &hybrid {
        let base = vector
            .iter()
            .find(|v| v.entry.id == hit.entry.id)
            .map(|v| v.score)
            .unwrap();
        assert!(hit.score >= base);
    }
}

#[test]
fn graph_search_resolves_bare_names_to_latest_id() {
    let dir = TempDir::new().unwrap();
    let paths = build_fixture(&dir);
    let retriever = open_retriever(&paths);

    let neighborhood = retriever.graph_search("Rebin");
    assert_eq!(
        neighborhood.algorithm.as_ref().map(|id| id.as_str()),
        Some("Rebin-v2")
    );
    assert!(neighborhood.upstream.len() <= 5);
    assert!(neighborhood.downstream.len() <= 5);

    // Load -> Rebin workspace_flow edges exist for both versions; v2 must
    // see Load upstream.
    assert!(neighborhood.upstream.iter().any(|n| n.name == "Load"));
}

#[test]
fn graph_search_of_unknown_name_is_empty_not_an_error() {
    let dir = TempDir::new().unwrap();
    let paths = build_fixture(&dir);
    let retriever = open_retriever(&paths);

    let neighborhood = retriever.graph_search("DoesNotExist");
    assert!(neighborhood.algorithm.is_none());
    assert!(neighborhood.upstream.is_empty());
    assert!(neighborhood.downstream.is_empty());
    assert!(neighborhood.edges.is_empty());
}

#[test]
fn get_algorithm_joins_properties_and_documentation() {
    let dir = TempDir::new().unwrap();
    let paths = build_fixture(&dir);
    let retriever = open_retriever(&paths);

    let id = retriever.algorithm_id("Rebin", 2).unwrap().unwrap();
    let entry = retriever.get_algorithm(id).unwrap().unwrap();

    assert_eq!(entry.record.name, "Rebin");
    assert_eq!(entry.record.properties.len(), 1);
    assert!(entry.documentation.is_some());

    assert!(retriever.get_algorithm(99_999).unwrap().is_none());
}

#[test]
fn search_dispatcher_covers_every_mode() {
    let dir = TempDir::new().unwrap();
    let paths = build_fixture(&dir);
    let retriever = open_retriever(&paths);

    assert!(matches!(
        retriever.search("rebin", 3, SearchMode::Vector).unwrap(),
        SearchOutcome::Ranked(_)
    ));
    assert!(matches!(
        retriever.search("rebin", 3, SearchMode::Hybrid).unwrap(),
        SearchOutcome::Ranked(_)
    ));
    assert!(matches!(
        retriever.search("Rebin", 3, SearchMode::Graph).unwrap(),
        SearchOutcome::Neighborhood(_)
    ));
}

#[test]
fn missing_artifact_aborts_construction() {
    let dir = TempDir::new().unwrap();
    let paths = build_fixture(&dir);

    std::fs::remove_file(&paths.graph_path).unwrap();
    let result = Retriever::open(
        &paths.db_path,
        &paths.index_path,
        &paths.graph_path,
        Box::new(KeywordEncoder),
    );
    assert!(result.is_err());
}

#[test]
fn malformed_artifact_aborts_construction() {
    let dir = TempDir::new().unwrap();
    let paths = build_fixture(&dir);

    std::fs::write(&paths.index_path, b"not an index").unwrap();
    let result = Retriever::open(
        &paths.db_path,
        &paths.index_path,
        &paths.graph_path,
        Box::new(KeywordEncoder),
    );
    assert!(result.is_err());
}

#[test]
fn corrupt_store_aborts_construction() {
    let dir = TempDir::new().unwrap();
    let paths = build_fixture(&dir);

    std::fs::write(&paths.db_path, b"not a database").unwrap();
    let result = Retriever::open(
        &paths.db_path,
        &paths.index_path,
        &paths.graph_path,
        Box::new(KeywordEncoder),
    );
    assert!(result.is_err());
}

#[test]
fn query_dimension_mismatch_surfaces_immediately() {
    let dir = TempDir::new().unwrap();
    let paths = build_fixture(&dir);

    let retriever = Retriever::open(
        &paths.db_path,
        &paths.index_path,
        &paths.graph_path,
        Box::new(WrongDimensionEncoder),
    )
    .unwrap();

    let err = retriever.vector_search("rebin", 3, None).unwrap_err();
    assert!(matches!(
        err,
        catalog_search::SearchError::VectorStore(VectorStoreError::InvalidDimension { .. })
    ));
}

#[test]
fn empty_results_build_an_empty_context() {
    let dir = TempDir::new().unwrap();
    let encoder = KeywordEncoder;
    let pipeline = IngestPipeline::new("empty", dir.path(), &encoder).unwrap();
    pipeline.run(&[], &[]).unwrap();
    let paths = pipeline.paths();

    let retriever = open_retriever(paths);
    let results = retriever.vector_search("anything", 5, None).unwrap();
    assert!(results.is_empty());
    assert_eq!(build_context(&results, 4000), "");
}
