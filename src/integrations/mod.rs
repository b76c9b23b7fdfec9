// src/integrations/mod.rs
//
// External integrations
//
// Infrastructure boundary: clients here return raw DTOs that the service
// layer maps into domain rows. No domain mutation happens in this module.

pub mod pokeapi;

pub use pokeapi::{PokeApiClient, PokemonSource};
