pub mod attribute;
pub mod cli;
pub mod column;
pub mod data;
pub mod emd;
pub mod error;
pub mod graph;
pub mod histogram;
pub mod ingest;
pub mod io_utils;
pub mod pipeline;
pub mod ranks;
pub mod report;
pub mod solver;
pub mod threshold;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info, warn};

use crate::{
    cli::{Cli, Commands},
    ingest::Table,
    pipeline::{Discovery, DiscoveryConfig},
    ranks::RankIndex,
};

pub use data::ColumnKey;
pub use error::DiscoveryError;
pub use pipeline::DiscoveryOutcome;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("attr_discovery", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Ranks(args) => handle_ranks(&args),
        Commands::Discover(args) => handle_discover(&args),
    }
}

fn handle_ranks(args: &cli::RanksArgs) -> Result<()> {
    info!("Building rank index from corpus at {:?}", args.input);
    let tables = ingest::load_tables(&args.input, args.delimiter)?;
    let index = corpus_rank_index(&tables);
    index
        .save(&args.ranks)
        .with_context(|| format!("Writing rank index to {:?}", args.ranks))?;
    info!(
        "Rank index over {} distinct value(s) from {} table(s) written to {:?}",
        index.len(),
        tables.len(),
        args.ranks
    );
    Ok(())
}

fn handle_discover(args: &cli::DiscoverArgs) -> Result<()> {
    let tables = ingest::load_tables(&args.input, args.delimiter)?;
    info!("Loaded {} table(s) from {:?}", tables.len(), args.input);

    let index = match &args.ranks {
        Some(path) => {
            RankIndex::load(path).with_context(|| format!("Loading rank index from {path:?}"))?
        }
        None => corpus_rank_index(&tables),
    };

    let config = DiscoveryConfig {
        quantiles: args.quantiles,
        threshold1: args.threshold1,
        threshold2: args.threshold2,
        policy: args.policy,
        binning: args.binning,
        on_solver_failure: args.on_solver_failure,
    };
    let mut discovery = Discovery::new(config)?;
    for table in &tables {
        discovery.add_table(table, &index)?;
    }
    info!("Matching {} column(s)", discovery.column_count());

    let outcome = discovery.find_matches(&index)?;
    if !outcome.failed_clusters.is_empty() {
        warn!(
            "{} cluster(s) were omitted after solver failures",
            outcome.failed_clusters.len()
        );
    }

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Creating output directory {:?}", args.output))?;
    let distribution_path = args.output.join("distribution_clusters.json");
    report::write_report(&distribution_path, &outcome.distribution_clusters)?;
    let attribute_path = args.output.join("attribute_clusters.json");
    report::write_report(&attribute_path, &outcome.attribute_clusters)?;
    info!(
        "Wrote {} distribution cluster(s) to {:?} and {} attribute cluster(s) to {:?}",
        outcome.distribution_clusters.len(),
        distribution_path,
        outcome.attribute_clusters.len(),
        attribute_path
    );
    Ok(())
}

/// Builds the rank index from the union of every value in the corpus.
fn corpus_rank_index(tables: &[Table]) -> RankIndex {
    let values = tables
        .iter()
        .flat_map(|table| table.columns.iter())
        .flat_map(|column| column.values.iter());
    let index = RankIndex::build(values);
    info!("Built rank index over {} distinct value(s)", index.len());
    index
}
