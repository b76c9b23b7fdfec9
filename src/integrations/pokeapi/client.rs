// src/integrations/pokeapi/client.rs
//
// PokeAPI REST integration
//
// ARCHITECTURE:
// - Plain GET client for the public PokeAPI
// - Handles timeouts, rate limiting, bounded retries
// - Returns raw DTOs (NO domain mutation); services map them
//
// CRITICAL RULES:
// - This is INFRASTRUCTURE, not DOMAIN
// - Never creates or modifies domain entities directly
// - Handles all external API concerns

use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

use super::models::{PokemonListResponse, RawEvolutionChain, RawPokemon, RawSpecies};

/// Public PokeAPI base URL.
const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Seam between the orchestrator and the HTTP transport.
///
/// The pipeline consumes only parsed DTOs; everything about transport,
/// retries and throttling stays behind this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PokemonSource: Send + Sync {
    /// Fetch one page of the pokemon listing.
    async fn fetch_list(&self, limit: u32, offset: u32) -> AppResult<PokemonListResponse>;

    /// Fetch the nested detail record behind a listing entry's URL.
    async fn fetch_detail(&self, url: &str) -> AppResult<RawPokemon>;

    /// Fetch a species resource (for its evolution chain reference).
    async fn fetch_species(&self, url: &str) -> AppResult<RawSpecies>;

    /// Fetch an evolution chain resource.
    async fn fetch_evolution_chain(&self, url: &str) -> AppResult<RawEvolutionChain>;
}

/// Rate limiter state
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    /// How long the caller must sleep before the next request. Advances the
    /// reservation so a single-threaded caller never needs to re-check.
    fn reserve(&mut self) -> Duration {
        let elapsed = self.last_request.elapsed();
        let wait = self.min_interval.saturating_sub(elapsed);
        self.last_request = Instant::now() + wait;
        wait
    }
}

/// PokeAPI client
pub struct PokeApiClient {
    base_url: String,
    http_client: Client,
    rate_limiter: Mutex<RateLimiter>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl PokeApiClient {
    /// Create a client against the public PokeAPI.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (local mirrors, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
            // PokeAPI asks clients to be polite; 4 requests/second is plenty
            // for a sequential pipeline.
            rate_limiter: Mutex::new(RateLimiter::new(Duration::from_millis(250))),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }

    async fn throttle(&self) {
        let wait = {
            let mut limiter = self.rate_limiter.lock().expect("rate limiter poisoned");
            limiter.reserve()
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    /// GET `url` and decode the JSON body, retrying transient failures with
    /// linear backoff.
    async fn get_json<T>(&self, url: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let mut last_error = AppError::SourceUnavailable(format!("no attempt made for {}", url));

        for attempt in 0..self.max_retries {
            self.throttle().await;

            match self.try_get(url).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(url, attempt, error = %err, "request failed");
                    last_error = err;
                    tokio::time::sleep(self.retry_backoff * (attempt + 1)).await;
                }
            }
        }

        Err(last_error)
    }

    async fn try_get<T>(&self, url: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http_client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::SourceUnavailable(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::SourceUnavailable(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        response.json::<T>().await.map_err(|e| {
            AppError::SourceUnavailable(format!("failed to parse response from {}: {}", url, e))
        })
    }
}

#[async_trait]
impl PokemonSource for PokeApiClient {
    async fn fetch_list(&self, limit: u32, offset: u32) -> AppResult<PokemonListResponse> {
        let url = format!(
            "{}/pokemon?limit={}&offset={}",
            self.base_url, limit, offset
        );
        self.get_json(&url).await
    }

    async fn fetch_detail(&self, url: &str) -> AppResult<RawPokemon> {
        self.get_json(url).await
    }

    async fn fetch_species(&self, url: &str) -> AppResult<RawSpecies> {
        self.get_json(url).await
    }

    async fn fetch_evolution_chain(&self, url: &str) -> AppResult<RawEvolutionChain> {
        self.get_json(url).await
    }
}

impl Default for PokeApiClient {
    fn default() -> Self {
        Self::new()
    }
}
