// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO cross-repository calls
// - Explicit SQL only

pub mod evolution_repository;
pub mod pokemon_repository;

pub use evolution_repository::{EvolutionRepository, SqliteEvolutionRepository};
pub use pokemon_repository::{PokemonRepository, SqlitePokemonRepository};

#[cfg(test)]
pub use pokemon_repository::MockPokemonRepository;
