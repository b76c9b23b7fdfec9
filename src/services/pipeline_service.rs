// src/services/pipeline_service.rs
//
// Pipeline orchestration: fetch -> normalize -> write, one record at a time.
//
// Per-record errors are converted into skip-and-report outcomes; only the
// listing fetch and schema problems abort a run. No record is retried here
// (the HTTP client retries transient transport failures internally).

use std::collections::HashSet;
use std::sync::Arc;

use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::domain::EvolutionEdge;
use crate::error::AppResult;
use crate::integrations::pokeapi::models::ListEntry;
use crate::integrations::pokeapi::PokemonSource;
use crate::repositories::{EvolutionRepository, PokemonRepository};
use crate::services::normalizer;

/// Parameters for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub limit: u32,
    pub offset: u32,
    pub skip_evolutions: bool,
    pub show_progress: bool,
}

impl Default for RunRequest {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            skip_evolutions: false,
            show_progress: false,
        }
    }
}

/// One record that could not be loaded, with the reason it failed.
///
/// The identifier is the detail record's id when the detail arrived, and the
/// listed name otherwise (the id is unknown until the detail is fetched).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub identifier: String,
    pub reason: String,
}

/// Outcome of a pipeline run. A run with failures is still a completed run;
/// the caller decides what to do with the report.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub requested: usize,
    pub succeeded: usize,
    pub failed: Vec<RecordFailure>,
    pub evolution_edges: usize,
}

pub struct PipelineService {
    source: Arc<dyn PokemonSource>,
    pokemon_repo: Arc<dyn PokemonRepository>,
    evolution_repo: Arc<dyn EvolutionRepository>,
}

impl PipelineService {
    pub fn new(
        source: Arc<dyn PokemonSource>,
        pokemon_repo: Arc<dyn PokemonRepository>,
        evolution_repo: Arc<dyn EvolutionRepository>,
    ) -> Self {
        Self {
            source,
            pokemon_repo,
            evolution_repo,
        }
    }

    /// Run the full pipeline: listing fetch, sequential record loop, then
    /// the evolution pass over everything that loaded.
    ///
    /// A listing failure is fatal and propagates; per-record failures are
    /// recorded in the summary and the loop continues.
    pub async fn run(&self, request: &RunRequest) -> AppResult<RunSummary> {
        let listing = self.source.fetch_list(request.limit, request.offset).await?;
        info!(
            total = listing.count,
            fetched = listing.results.len(),
            "fetched pokemon listing"
        );

        let mut summary = RunSummary {
            requested: listing.results.len(),
            ..Default::default()
        };

        let bar = if request.show_progress {
            ProgressBar::new(listing.results.len() as u64).with_message("Loading pokemon")
        } else {
            ProgressBar::hidden()
        };

        // Records that made it into the store, for the evolution pass.
        let mut loaded: Vec<(i64, Option<String>)> = Vec::new();

        for entry in &listing.results {
            match self.load_one(entry).await {
                Ok(record) => {
                    debug!(id = record.0, pokemon = %entry.name, "record loaded");
                    summary.succeeded += 1;
                    loaded.push(record);
                }
                Err(failure) => {
                    warn!(
                        identifier = %failure.identifier,
                        reason = %failure.reason,
                        "record failed"
                    );
                    summary.failed.push(failure);
                }
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        if !request.skip_evolutions {
            summary.evolution_edges = self
                .load_evolutions(&loaded, request.show_progress)
                .await?;
        }

        Ok(summary)
    }

    /// Fetch, normalize and persist one record. All three phases map their
    /// errors onto the record's failure report.
    async fn load_one(&self, entry: &ListEntry) -> Result<(i64, Option<String>), RecordFailure> {
        let raw = self
            .source
            .fetch_detail(&entry.url)
            .await
            .map_err(|e| RecordFailure {
                identifier: entry.name.clone(),
                reason: e.to_string(),
            })?;

        let identifier = raw
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| entry.name.clone());

        let record = normalizer::normalize_record(&raw).map_err(|e| RecordFailure {
            identifier: identifier.clone(),
            reason: e.to_string(),
        })?;

        self.pokemon_repo
            .upsert(&record)
            .map_err(|e| RecordFailure {
                identifier,
                reason: e.to_string(),
            })?;

        Ok((record.pokemon.id, record.pokemon.species_url))
    }

    /// Second pass: follow species -> evolution chain for every loaded
    /// record and upsert the edges whose endpoints are both in the store.
    ///
    /// Failures here degrade the run (missing edges) instead of failing it,
    /// so every problem is logged and skipped.
    async fn load_evolutions(
        &self,
        loaded: &[(i64, Option<String>)],
        show_progress: bool,
    ) -> AppResult<usize> {
        let bar = if show_progress {
            ProgressBar::new(loaded.len() as u64).with_message("Resolving evolution chains")
        } else {
            ProgressBar::hidden()
        };

        // One chain covers a whole evolution family; fetch each only once.
        let mut seen_chains: HashSet<String> = HashSet::new();
        let mut edges_written = 0;

        for (id, species_url) in loaded {
            match self
                .load_evolutions_for(*id, species_url.as_deref(), &mut seen_chains)
                .await
            {
                Ok(written) => edges_written += written,
                Err(err) => {
                    warn!(pokemon_id = id, error = %err, "evolution pass failed for record");
                }
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        Ok(edges_written)
    }

    async fn load_evolutions_for(
        &self,
        pokemon_id: i64,
        species_url: Option<&str>,
        seen_chains: &mut HashSet<String>,
    ) -> AppResult<usize> {
        let Some(species_url) = species_url else {
            return Ok(0);
        };

        let species = self.source.fetch_species(species_url).await?;
        let Some(chain_url) = species.evolution_chain.and_then(|c| c.url) else {
            debug!(pokemon_id, "species has no evolution chain");
            return Ok(0);
        };

        if seen_chains.contains(&chain_url) {
            return Ok(0);
        }

        let chain = self.source.fetch_evolution_chain(&chain_url).await?;
        // Mark the chain only after a successful fetch: a transient failure
        // for one family member must not hide the chain from the rest of
        // the run.
        seen_chains.insert(chain_url);

        let mut written = 0;

        for edge in normalizer::flatten_evolution_chain(&chain) {
            // Both endpoints must already be in the store; a later run with
            // a larger limit picks up the rest of the family.
            let from_id = self.pokemon_repo.id_by_name(&edge.from_name)?;
            let to_id = self.pokemon_repo.id_by_name(&edge.to_name)?;
            let (Some(from_id), Some(to_id)) = (from_id, to_id) else {
                continue;
            };

            self.evolution_repo.upsert_edge(&EvolutionEdge {
                from_pokemon_id: from_id,
                to_pokemon_id: to_id,
                details: edge.details,
            })?;
            written += 1;
        }

        Ok(written)
    }
}
