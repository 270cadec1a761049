//! HTTP client for the upstream Pokédex API.
//!
//! [`PokeApiClient`] is a thin reqwest wrapper around the three endpoints the
//! crate consumes. The resolver does not depend on it directly: it consumes
//! the [`NameSource`] trait, which the client implements, so tests can swap
//! in a mock upstream.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{Pokemon, PokemonPage, SpeciesNames};

/// Production base URL of the upstream API.
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Default page size for [`PokeApiClient::pokemon_page`].
pub const DEFAULT_LIST_LIMIT: u32 = 1000;

/// The upstream seam of the resolver.
///
/// Implementations return the localized-names list for a species identifier.
/// The identifier is already normalized (lower-cased) by the resolver.
#[async_trait]
pub trait NameSource: Send + Sync {
    /// Looks up the localized names of the species identified by `key`.
    async fn localized_names(&self, key: &str) -> Result<SpeciesNames, ApiError>;
}

/// Client for the public PokéAPI.
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for PokeApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PokeApiClient {
    /// Creates a client against the production API.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom base URL (no trailing slash).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetches a single Pokémon by name or national dex number.
    ///
    /// The query is lower-cased into the URL path; the upstream accepts both
    /// names and numeric ids there.
    ///
    /// # Errors
    /// Returns [`ApiError::Status`] for a non-success response (404 for an
    /// unknown Pokémon) and [`ApiError::Transport`] for request or decode
    /// failures.
    pub async fn pokemon(&self, query: &str) -> Result<Pokemon, ApiError> {
        self.get_json(&pokemon_resource(query)).await
    }

    /// Fetches one page of the Pokémon list.
    ///
    /// # Errors
    /// Same taxonomy as [`PokeApiClient::pokemon`].
    pub async fn pokemon_page(&self, limit: u32, offset: u32) -> Result<PokemonPage, ApiError> {
        let resource = format!("pokemon?limit={limit}&offset={offset}");
        self.get_json(&resource).await
    }

    /// Fetches the localized-names list of a species.
    ///
    /// # Errors
    /// Same taxonomy as [`PokeApiClient::pokemon`].
    pub async fn species_names(&self, key: &str) -> Result<SpeciesNames, ApiError> {
        self.get_json(&species_resource(key)).await
    }

    async fn get_json<T>(&self, resource: &str) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, resource);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                resource: resource.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl NameSource for PokeApiClient {
    async fn localized_names(&self, key: &str) -> Result<SpeciesNames, ApiError> {
        self.species_names(key).await
    }
}

// The upstream accepts names and numeric ids in the same path segment, but
// only lower-cased names.
fn pokemon_resource(query: &str) -> String {
    format!("pokemon/{}", query.to_lowercase())
}

fn species_resource(key: &str) -> String {
    format!("pokemon-species/{}", key.to_lowercase())
}
