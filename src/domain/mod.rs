// src/domain/mod.rs
//
// Domain Root - typed rows of the relational schema
//
// These are plain data carriers: validation happens at the normalization
// boundary (services::normalizer), persistence in the repositories.

pub mod evolution;
pub mod pokemon;

pub use evolution::{ChainEdge, EvolutionEdge};
pub use pokemon::{AbilitySlot, LookupKind, NormalizedPokemon, Pokemon, StatValue, TypeSlot};
