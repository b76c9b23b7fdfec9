// src/lib.rs
// PokePipeline - PokeAPI -> SQLite ETL
//
// Architecture:
// - Explicit: store handles are passed in, no process-wide singletons
// - Layered: db / domain / repositories / services / integrations
// - Idempotent: every load can be re-run without duplicating rows

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod db;
pub mod domain;
pub mod error;
pub mod integrations;
pub mod repositories;
pub mod services;

// ============================================================================
// PUBLIC API - Domain rows
// ============================================================================

pub use domain::{
    AbilitySlot, ChainEdge, EvolutionEdge, LookupKind, NormalizedPokemon, Pokemon, StatValue,
    TypeSlot,
};

// ============================================================================
// PUBLIC API - Error types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{
    create_connection_pool, get_database_stats, initialize_database, ConnectionPool, DatabaseStats,
};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    EvolutionRepository, PokemonRepository, SqliteEvolutionRepository, SqlitePokemonRepository,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{PipelineService, RecordFailure, RunRequest, RunSummary};

// ============================================================================
// PUBLIC API - Integrations
// ============================================================================

pub use integrations::{PokeApiClient, PokemonSource};
