mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog-rag", version, about = "Hybrid search over an algorithm catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Settings for the external embeddings endpoint.
#[derive(Args, Debug)]
struct EncoderArgs {
    /// Base URL of an Ollama-compatible embeddings endpoint
    #[arg(long, default_value = "http://localhost:11434")]
    encoder_url: String,

    /// Embedding model served by the endpoint
    #[arg(long, default_value = "nomic-embed-text")]
    encoder_model: String,

    /// Output dimension of the embedding model
    #[arg(long, default_value_t = 768)]
    dimension: usize,
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    /// Catalog version the artifacts were built for, e.g. 6.10
    #[arg(long)]
    catalog_version: String,

    /// Directory holding the built artifacts
    #[arg(long, default_value = "database")]
    database_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Vector,
    Hybrid,
    Graph,
}

#[derive(Subcommand)]
enum Command {
    /// Build all snapshot artifacts from extracted JSON records
    Ingest {
        /// JSON file with the extracted algorithm records
        #[arg(long)]
        algorithms: PathBuf,

        /// Optional JSON file with documentation records
        #[arg(long)]
        docs: Option<PathBuf>,

        /// Catalog version to stamp the artifacts with, e.g. 6.10
        #[arg(long)]
        catalog_version: String,

        /// Output directory for the artifacts
        #[arg(long, default_value = "database")]
        output_dir: PathBuf,

        #[command(flatten)]
        encoder: EncoderArgs,
    },

    /// Search the catalog and print the assembled context
    Query {
        /// Natural-language query
        query: String,

        #[arg(long, default_value_t = 5)]
        top_k: usize,

        #[arg(long, value_enum, default_value = "hybrid")]
        mode: Mode,

        /// Restrict vector search to one facet (summary|properties|usage|full)
        #[arg(long)]
        facet: Option<String>,

        /// Character budget for the assembled context
        #[arg(long, default_value_t = 4000)]
        max_chars: usize,

        #[command(flatten)]
        snapshot: SnapshotArgs,

        #[command(flatten)]
        encoder: EncoderArgs,
    },

    /// Show the graph neighborhood of an algorithm
    Related {
        /// Algorithm name, with or without a -vN suffix
        name: String,

        #[command(flatten)]
        snapshot: SnapshotArgs,

        #[command(flatten)]
        encoder: EncoderArgs,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Ingest {
            algorithms,
            docs,
            catalog_version,
            output_dir,
            encoder,
        } => commands::ingest(&algorithms, docs.as_deref(), &catalog_version, &output_dir, &encoder),
        Command::Query {
            query,
            top_k,
            mode,
            facet,
            max_chars,
            snapshot,
            encoder,
        } => commands::query(&query, top_k, mode, facet.as_deref(), max_chars, &snapshot, &encoder),
        Command::Related {
            name,
            snapshot,
            encoder,
        } => commands::related(&name, &snapshot, &encoder),
    }
}
