// src/integrations/pokeapi/mod.rs
pub mod client;
pub mod models;

pub use client::{PokeApiClient, PokemonSource};

#[cfg(test)]
pub use client::MockPokemonSource;
