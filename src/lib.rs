//! # jpdex - Pokédex client with localized-name resolution
//!
//! jpdex is a client library for the public PokéAPI with one non-trivial
//! subsystem: a resolver that translates English Pokémon identifiers into
//! Japanese display names with minimal redundant network work.
//!
//! ## Core Concepts
//!
//! - **NameResolver**: a two-tier cache (in-memory map backed by a persisted
//!   snapshot) in front of a concurrency-bounded fan-out of species lookups
//!   with in-flight request deduplication
//! - **NameSource**: the upstream seam - anything that can return the
//!   localized-names list for an identifier
//! - **SnapshotStore**: best-effort persistence of the cache as a flat
//!   string-to-string JSON document
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jpdex::{FileSnapshotStore, NameResolver, PokeApiClient};
//!
//! let client = Arc::new(PokeApiClient::new());
//! let store = Arc::new(FileSnapshotStore::new("./cache")?);
//! let resolver = NameResolver::new(client, store);
//!
//! let names = resolver
//!     .resolve_batch(["Pikachu", "Eevee"], &Default::default())
//!     .await;
//! assert_eq!(names.len(), 2);
//! ```
//!
//! Resolution never surfaces an upstream error to the caller: a failed or
//! malformed lookup falls back to the original identifier. Only cancellation
//! and the internal lookup timeout are reported, so callers can tell "retry
//! later" apart from "resolved to a fallback, stop retrying".

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod error;
pub mod model;
pub mod resolver;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use api::{NameSource, PokeApiClient};
pub use error::{ApiError, ResolveError};
pub use model::{LocalizedName, NamedResource, Pokemon, PokemonPage, SpeciesNames};
pub use resolver::{BatchOptions, NameResolver, ResolveOptions, ResolverConfig};
pub use storage::{FileSnapshotStore, InMemorySnapshotStore, SnapshotStore, StorageError};
