use serde::{Deserialize, Serialize};

/// Directed evolution edge between two pokemon already present in the store.
///
/// Keyed by the (from, to) pair; `details` is a free-form summary of the
/// evolution trigger (e.g. `trigger=level-up;min_level=16`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionEdge {
    pub from_pokemon_id: i64,
    pub to_pokemon_id: i64,
    pub details: Option<String>,
}

/// Name-level edge produced by flattening an evolution chain, before the
/// species names are resolved against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEdge {
    pub from_name: String,
    pub to_name: String,
    pub details: Option<String>,
}
