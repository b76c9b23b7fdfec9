// src/integrations/pokeapi/models.rs
//
// Raw DTOs for the PokeAPI endpoints this pipeline consumes.
//
// Every field of the detail record is optional: presence is validated at the
// normalization boundary (services::normalizer), which can then name the
// missing field instead of surfacing a generic decode error.

use serde::Deserialize;

/// `{count, results: [{name, url}]}` from the paged listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonListResponse {
    pub count: i64,
    #[serde(default)]
    pub results: Vec<ListEntry>,
}

/// One entry of the listing: the name plus the URL of the detail resource.
#[derive(Debug, Clone, Deserialize)]
pub struct ListEntry {
    pub name: String,
    pub url: String,
}

/// `{name, url}` reference nested inside other resources.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResourceRef {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// The nested per-pokemon detail record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPokemon {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub height: Option<i64>,
    pub weight: Option<i64>,
    pub base_experience: Option<i64>,
    pub species: Option<ResourceRef>,
    pub types: Vec<RawTypeEntry>,
    pub abilities: Vec<RawAbilityEntry>,
    pub stats: Vec<RawStatEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTypeEntry {
    pub slot: Option<i64>,
    #[serde(rename = "type")]
    pub type_ref: Option<ResourceRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAbilityEntry {
    pub slot: Option<i64>,
    pub is_hidden: Option<bool>,
    pub ability: Option<ResourceRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStatEntry {
    pub base_stat: Option<i64>,
    pub effort: Option<i64>,
    pub stat: Option<ResourceRef>,
}

/// Species detail: only the evolution chain reference is consumed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSpecies {
    pub evolution_chain: Option<ResourceRef>,
}

/// Evolution chain resource: a tree of chain links rooted at `chain`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEvolutionChain {
    pub chain: Option<ChainLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChainLink {
    pub species: Option<ResourceRef>,
    pub evolves_to: Vec<ChainLink>,
    pub evolution_details: Vec<RawEvolutionDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEvolutionDetail {
    pub trigger: Option<ResourceRef>,
    pub min_level: Option<i64>,
    pub item: Option<ResourceRef>,
}
