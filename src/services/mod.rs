// src/services/mod.rs
//
// Service layer: orchestration and the pure normalization step.

pub mod normalizer;
pub mod pipeline_service;

pub use normalizer::{flatten_evolution_chain, normalize_record};
pub use pipeline_service::{PipelineService, RecordFailure, RunRequest, RunSummary};
