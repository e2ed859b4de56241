use crate::{EncoderArgs, Mode, SnapshotArgs};
use anyhow::{bail, Context, Result};
use catalog_ingest::{ArtifactPaths, IngestPipeline};
use catalog_model::{AlgorithmRecord, DocRecord, EmbeddingFacet};
use catalog_search::{
    build_context, build_workflow_context, GraphNeighborhood, Retriever, SearchMode, SearchOutcome,
};
use catalog_vector_store::{OllamaEncoder, TextEncoder};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn make_encoder(args: &EncoderArgs) -> Result<Box<dyn TextEncoder>> {
    let encoder = OllamaEncoder::new(
        args.encoder_url.as_str(),
        args.encoder_model.as_str(),
        args.dimension,
    )?;
    Ok(Box::new(encoder))
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))
}

fn search_mode(mode: Mode) -> SearchMode {
    match mode {
        Mode::Vector => SearchMode::Vector,
        Mode::Hybrid => SearchMode::Hybrid,
        Mode::Graph => SearchMode::Graph,
    }
}

fn open_retriever(snapshot: &SnapshotArgs, encoder_args: &EncoderArgs) -> Result<Retriever> {
    let paths = ArtifactPaths::new(&snapshot.database_dir, &snapshot.catalog_version);
    let retriever = Retriever::open(
        &paths.db_path,
        &paths.index_path,
        &paths.graph_path,
        make_encoder(encoder_args)?,
    )?;
    Ok(retriever)
}

pub(crate) fn ingest(
    algorithms: &Path,
    docs: Option<&Path>,
    catalog_version: &str,
    output_dir: &Path,
    encoder_args: &EncoderArgs,
) -> Result<()> {
    let records: Vec<AlgorithmRecord> = load_json(algorithms)?;
    let docs: Vec<DocRecord> = match docs {
        Some(path) => load_json(path)?,
        None => Vec::new(),
    };
    log::info!("Loaded {} records and {} docs", records.len(), docs.len());

    let encoder = make_encoder(encoder_args)?;
    let pipeline = IngestPipeline::new(catalog_version, output_dir, encoder.as_ref())?;
    let manifest = pipeline.run(&records, &docs)?;

    println!(
        "Built catalog v{}: {} algorithms, {} relationships, {} vectors",
        manifest.catalog_version,
        manifest.algorithm_count,
        manifest.relationship_count,
        manifest.embedding_count
    );
    println!("  database:     {}", manifest.files.database);
    println!("  vector index: {}", manifest.files.vector_index);
    println!("  graph:        {}", manifest.files.graph);
    Ok(())
}

pub(crate) fn query(
    query: &str,
    top_k: usize,
    mode: Mode,
    facet: Option<&str>,
    max_chars: usize,
    snapshot: &SnapshotArgs,
    encoder_args: &EncoderArgs,
) -> Result<()> {
    let facet = match facet {
        Some(raw) => match EmbeddingFacet::parse(raw) {
            Some(facet) => Some(facet),
            None => bail!("unknown facet: {raw} (expected summary|properties|usage|full)"),
        },
        None => None,
    };
    if facet.is_some() && !matches!(mode, Mode::Vector) {
        bail!("--facet only applies to --mode vector");
    }

    let retriever = open_retriever(snapshot, encoder_args)?;
    let outcome = match facet {
        // A facet filter narrows vector search specifically; the dispatcher
        // covers every unfiltered mode.
        Some(facet) => SearchOutcome::Ranked(retriever.vector_search(query, top_k, Some(facet))?),
        None => retriever.search(query, top_k, search_mode(mode))?,
    };

    match outcome {
        SearchOutcome::Ranked(results) => {
            if results.is_empty() {
                println!("No matches.");
            } else {
                println!("{}", build_context(&results, max_chars));
            }
        }
        SearchOutcome::Neighborhood(neighborhood) => {
            print_neighborhood(&retriever, &neighborhood)?;
        }
    }
    Ok(())
}

pub(crate) fn related(
    name: &str,
    snapshot: &SnapshotArgs,
    encoder_args: &EncoderArgs,
) -> Result<()> {
    let retriever = open_retriever(snapshot, encoder_args)?;
    let neighborhood = retriever.graph_search(name);
    print_neighborhood(&retriever, &neighborhood)
}

fn print_neighborhood(retriever: &Retriever, neighborhood: &GraphNeighborhood) -> Result<()> {
    let Some(id) = &neighborhood.algorithm else {
        println!("No matching algorithm in the graph.");
        return Ok(());
    };

    let mut entry = None;
    if let Some((name, version)) = id.parse() {
        if let Some(db_id) = retriever.algorithm_id(name, version)? {
            entry = retriever.get_algorithm(db_id)?;
        }
    }

    match entry {
        Some(entry) => println!("{}", build_workflow_context(&entry, neighborhood)),
        None => {
            println!("# {id}");
            for node in &neighborhood.upstream {
                println!("before: {}: {}", node.name, node.summary);
            }
            for node in &neighborhood.downstream {
                println!("after: {}: {}", node.name, node.summary);
            }
        }
    }

    if !neighborhood.edges.is_empty() {
        println!("\nEdges:");
        for (from, to, attrs) in &neighborhood.edges {
            println!("  {from} -[{} ({:.2})]-> {to}", attrs.kind, attrs.weight);
        }
    }
    Ok(())
}
