// src/services/normalizer.rs
//
// Record normalization: raw PokeAPI DTOs -> typed domain rows.
//
// Pure functions of their input; nothing here touches the store. Presence
// of required fields is validated here so that a malformed record fails
// with the offending field named, not with a generic decode error.

use crate::domain::{
    AbilitySlot, ChainEdge, NormalizedPokemon, Pokemon, StatValue, TypeSlot,
};
use crate::error::{AppError, AppResult};
use crate::integrations::pokeapi::models::{
    ChainLink, RawEvolutionChain, RawEvolutionDetail, RawPokemon,
};

/// Convert one raw detail record into its normalized row bundle.
///
/// Fails with `AppError::MalformedRecord` if `id` or `name` is absent, or if
/// a nested collection element lacks its inner name. Empty collections are
/// valid and yield zero association rows. Input ordering and verbatim slot
/// values are preserved.
pub fn normalize_record(raw: &RawPokemon) -> AppResult<NormalizedPokemon> {
    let id = raw.id.ok_or_else(|| AppError::malformed("id"))?;
    let name = raw
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::malformed("name"))?;

    let mut types = Vec::with_capacity(raw.types.len());
    for (index, entry) in raw.types.iter().enumerate() {
        let type_name = entry
            .type_ref
            .as_ref()
            .and_then(|r| r.name.clone())
            .ok_or_else(|| AppError::malformed(format!("types[{}].type.name", index)))?;
        types.push(TypeSlot {
            name: type_name,
            slot: entry.slot,
        });
    }

    let mut abilities = Vec::with_capacity(raw.abilities.len());
    for (index, entry) in raw.abilities.iter().enumerate() {
        let ability_name = entry
            .ability
            .as_ref()
            .and_then(|r| r.name.clone())
            .ok_or_else(|| AppError::malformed(format!("abilities[{}].ability.name", index)))?;
        abilities.push(AbilitySlot {
            name: ability_name,
            slot: entry.slot,
            is_hidden: entry.is_hidden.unwrap_or(false),
        });
    }

    let mut stats = Vec::with_capacity(raw.stats.len());
    for (index, entry) in raw.stats.iter().enumerate() {
        let stat_name = entry
            .stat
            .as_ref()
            .and_then(|r| r.name.clone())
            .ok_or_else(|| AppError::malformed(format!("stats[{}].stat.name", index)))?;
        stats.push(StatValue {
            name: stat_name,
            base_stat: entry.base_stat,
            effort: entry.effort,
        });
    }

    Ok(NormalizedPokemon {
        pokemon: Pokemon {
            id,
            name,
            height: raw.height,
            weight: raw.weight,
            base_experience: raw.base_experience,
            species_url: raw.species.as_ref().and_then(|s| s.url.clone()),
        },
        types,
        abilities,
        stats,
    })
}

/// Flatten a nested evolution chain into name-level edges, depth-first.
///
/// Nodes without a species name are skipped rather than treated as errors;
/// the chain endpoints are outside this pipeline's record contract.
pub fn flatten_evolution_chain(chain: &RawEvolutionChain) -> Vec<ChainEdge> {
    let mut edges = Vec::new();
    if let Some(root) = &chain.chain {
        walk_chain(root, &mut edges);
    }
    edges
}

fn walk_chain(node: &ChainLink, edges: &mut Vec<ChainEdge>) {
    let Some(from_name) = node.species.as_ref().and_then(|s| s.name.clone()) else {
        return;
    };

    for evolution in &node.evolves_to {
        if let Some(to_name) = evolution.species.as_ref().and_then(|s| s.name.clone()) {
            edges.push(ChainEdge {
                from_name: from_name.clone(),
                to_name,
                details: summarize_details(&evolution.evolution_details),
            });
        }
        walk_chain(evolution, edges);
    }
}

/// Summarize evolution triggers as `trigger=…;min_level=…;item=…`, multiple
/// triggers joined with `|`. Returns None when the source lists no details.
fn summarize_details(details: &[RawEvolutionDetail]) -> Option<String> {
    if details.is_empty() {
        return None;
    }

    let parts: Vec<String> = details
        .iter()
        .map(|detail| {
            let trigger = detail
                .trigger
                .as_ref()
                .and_then(|t| t.name.as_deref())
                .unwrap_or("unknown");
            let mut summary = format!("trigger={}", trigger);
            if let Some(level) = detail.min_level {
                summary.push_str(&format!(";min_level={}", level));
            }
            if let Some(item) = detail.item.as_ref().and_then(|i| i.name.as_deref()) {
                summary.push_str(&format!(";item={}", item));
            }
            summary
        })
        .collect();

    Some(parts.join("|"))
}
