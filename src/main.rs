//! PokePipeline CLI - fetch pokemon from PokeAPI and load them into SQLite.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pokepipeline::db::{
    create_connection_pool, get_connection, get_database_stats, initialize_database,
};
use pokepipeline::integrations::PokeApiClient;
use pokepipeline::repositories::{
    EvolutionRepository, PokemonRepository, SqliteEvolutionRepository, SqlitePokemonRepository,
};
use pokepipeline::services::{PipelineService, RunRequest, RunSummary};
use pokepipeline::PokemonSource;

#[derive(Parser)]
#[command(name = "pokepipeline")]
#[command(version)]
#[command(about = "Fetch pokemon from PokeAPI and load them into a local SQLite database")]
struct Cli {
    /// How many pokemon to fetch from the listing
    #[arg(short, long, default_value = "20")]
    limit: u32,

    /// Listing offset to start from
    #[arg(short, long, default_value = "0")]
    offset: u32,

    /// Path to the SQLite database file
    #[arg(short, long, default_value = "pokemon.db")]
    db: PathBuf,

    /// Skip the evolution-chain pass
    #[arg(long)]
    skip_evolutions: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "pokepipeline=debug"
    } else {
        "pokepipeline=warn"
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match run(&cli).await {
        Ok(summary) => {
            report(&cli, &summary);
            // A run with individually failed records is still a completed
            // run; only a run that could not start is an error.
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("pokepipeline: {err}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let pool = Arc::new(create_connection_pool(&cli.db)?);

    // Initialize schema (idempotent); schema problems abort before any
    // record is fetched.
    {
        let conn = get_connection(&pool)?;
        initialize_database(&conn)?;
    }

    let source: Arc<dyn PokemonSource> = Arc::new(PokeApiClient::new());
    let pokemon_repo: Arc<dyn PokemonRepository> =
        Arc::new(SqlitePokemonRepository::new(pool.clone()));
    let evolution_repo: Arc<dyn EvolutionRepository> =
        Arc::new(SqliteEvolutionRepository::new(pool.clone()));

    let pipeline = PipelineService::new(source, pokemon_repo, evolution_repo);

    let summary = pipeline
        .run(&RunRequest {
            limit: cli.limit,
            offset: cli.offset,
            skip_evolutions: cli.skip_evolutions,
            show_progress: true,
        })
        .await?;

    // Final row counts for the report.
    let conn = get_connection(&pool)?;
    let stats = get_database_stats(&conn)?;
    println!(
        "Database {}: {} pokemon, {} types, {} abilities, {} stats, {} evolution edges",
        cli.db.display(),
        stats.pokemon_count,
        stats.type_count,
        stats.ability_count,
        stats.stat_count,
        stats.evolution_count,
    );

    Ok(summary)
}

fn report(cli: &Cli, summary: &RunSummary) {
    println!(
        "Run complete: {} of {} records loaded, {} failed",
        summary.succeeded, summary.requested, summary.failed.len()
    );
    if !cli.skip_evolutions {
        println!("Evolution edges written: {}", summary.evolution_edges);
    }
    for failure in &summary.failed {
        println!("  failed {}: {}", failure.identifier, failure.reason);
    }
}
