use anyhow::Result;
use clap::{Parser, Subcommand};
use index_core::{MapperKind, PipelineConfig};
use indexer::{query_index, run_job};
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query a map/combine/reduce inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a directory of plain-text documents
    Build {
        /// Input path (file or directory); each file is one document
        #[arg(long)]
        input: String,
        /// Output directory for part files
        #[arg(long)]
        output: String,
        /// Number of reducer partitions
        #[arg(long, default_value_t = 1)]
        reducers: usize,
        /// Mapper variant: `counting` or `presence`
        #[arg(long, default_value = "counting")]
        mapper: String,
        /// Disable the combiner stage
        #[arg(long, default_value_t = false)]
        no_combiner: bool,
    },
    /// Find documents containing every term of a query
    Query {
        /// Index directory holding part files
        #[arg(long)]
        index: String,
        /// Free-text query; tokenized like document text
        query: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, reducers, mapper, no_combiner } => {
            let mapper: MapperKind = mapper.parse()?;
            let config = PipelineConfig::new(input, output, reducers, mapper, !no_combiner)?;
            let stats = run_job(&config)?;
            tracing::info!(shards = stats.shards, terms = stats.terms, "index build complete");
            Ok(())
        }
        Commands::Query { index, query } => {
            let report = query_index(Path::new(&index), &query)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
