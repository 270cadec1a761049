//! The name-localization resolver.
//!
//! [`NameResolver`] translates English Pokémon identifiers into Japanese
//! display names with minimal redundant network work:
//!
//! - a two-tier cache: an in-memory map backed by a persisted snapshot,
//!   loaded lazily once per resolver lifetime
//! - in-flight deduplication: concurrent single-item resolutions of the same
//!   key share one underlying lookup
//! - a bounded worker pool for batch resolution
//! - cooperative cancellation, raced against an internal per-lookup timeout
//! - debounced, best-effort snapshot writes
//!
//! Cache keys are always lower-cased. A successful resolution is idempotent:
//! once a key is cached it is never re-fetched. Failed or locale-less lookups
//! cache the original identifier as a fallback so they are not re-attempted;
//! cancelled and timed-out lookups cache nothing, so a later retry starts
//! clean.
//!
//! All shared state lives behind a mutex that is never held across an
//! `.await`, so mutations are atomic relative to other tasks between
//! suspension points.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use indexmap::IndexMap;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::api::NameSource;
use crate::error::ResolveError;
use crate::storage::SnapshotStore;

/// Locale tag whose entry the resolver extracts (katakana Japanese).
pub const DEFAULT_LOCALE: &str = "ja-Hrkt";

/// Upper bound on a single species lookup.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(6);

/// Quiet window before cache mutations are flushed to the snapshot store.
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(250);

/// Default number of simultaneous lookups in a batch.
const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Resolver configuration.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Target locale tag, matched against the upstream language names.
    pub locale: String,
    /// Internal timeout for one species lookup.
    pub lookup_timeout: Duration,
    /// Debounce window for snapshot writes.
    pub debounce_window: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            lookup_timeout: LOOKUP_TIMEOUT,
            debounce_window: DEBOUNCE_WINDOW,
        }
    }
}

/// Options for a single-item resolution.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Join an already-pending lookup for the same key instead of issuing a
    /// second one. Batch resolution disables this; its input is already
    /// deduplicated.
    pub deduplicate: bool,
    /// Caller-supplied cancellation token.
    pub cancel: Option<CancellationToken>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { deduplicate: true, cancel: None }
    }
}

/// Options for a batch resolution.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum number of simultaneous lookups.
    pub concurrency: usize,
    /// Caller-supplied cancellation token; cancelling aborts every lookup
    /// the batch still has in flight.
    pub cancel: Option<CancellationToken>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { concurrency: DEFAULT_BATCH_CONCURRENCY, cancel: None }
    }
}

/// A lookup result as broadcast to deduplicated joiners. `None` until the
/// underlying operation settles.
type Settled = Option<Result<String, ResolveError>>;

/// Resolves identifiers to localized display names.
///
/// Construct one per application run and share it; clones are handles to the
/// same cache and in-flight table. There is no teardown: state is memory-only
/// plus best-effort persistence.
#[derive(Clone)]
pub struct NameResolver {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn NameSource>,
    store: Arc<dyn SnapshotStore>,
    config: ResolverConfig,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    cache: HashMap<String, String>,
    in_flight: HashMap<String, watch::Receiver<Settled>>,
    snapshot_loaded: bool,
    flush: Option<JoinHandle<()>>,
}

/// How a single-item resolution proceeds after the cache check.
enum Path {
    /// Run the lookup inline, unregistered (deduplication disabled).
    Direct,
    /// Join a lookup some other caller already has in flight.
    Join(watch::Receiver<Settled>),
    /// Lead a new shared lookup.
    Lead(watch::Sender<Settled>, watch::Receiver<Settled>),
}

impl NameResolver {
    /// Creates a resolver with default configuration.
    #[must_use]
    pub fn new(source: Arc<dyn NameSource>, store: Arc<dyn SnapshotStore>) -> Self {
        Self::with_config(source, store, ResolverConfig::default())
    }

    /// Creates a resolver with an explicit configuration.
    #[must_use]
    pub fn with_config(
        source: Arc<dyn NameSource>,
        store: Arc<dyn SnapshotStore>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                store,
                config,
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Resolves one identifier to its localized display name.
    ///
    /// A cached key returns immediately. An uncached key issues a lookup
    /// bounded by the internal timeout and abortable by `options.cancel`,
    /// whichever fires first. Upstream failure and a missing target-locale
    /// entry both resolve to the identifier itself, and that fallback is
    /// cached so the key is not re-attempted.
    ///
    /// # Errors
    /// [`ResolveError::Cancelled`] or [`ResolveError::TimedOut`] when the
    /// lookup was aborted before settling. Nothing is cached in either case.
    pub async fn resolve_one(
        &self,
        identifier: &str,
        options: &ResolveOptions,
    ) -> Result<String, ResolveError> {
        let key = normalize_key(identifier);
        self.inner.ensure_snapshot_loaded();

        // Cache check, in-flight join and leader registration are one
        // critical section; otherwise two callers could both become leaders
        // for the same key.
        let path = {
            let mut state = self.inner.state();
            if let Some(hit) = state.cache.get(&key) {
                return Ok(hit.clone());
            }
            if !options.deduplicate {
                Path::Direct
            } else if let Some(pending) = state.in_flight.get(&key) {
                Path::Join(pending.clone())
            } else {
                let (tx, rx) = watch::channel(None);
                state.in_flight.insert(key.clone(), rx.clone());
                Path::Lead(tx, rx)
            }
        };

        match path {
            Path::Direct => self.inner.lookup(&key, identifier, options.cancel.clone()).await,
            Path::Join(pending) => await_settled(pending).await,
            Path::Lead(tx, rx) => {
                // The lookup runs in its own task so joiners share its fate
                // even if this caller is dropped mid-await.
                let inner = Arc::clone(&self.inner);
                let fallback = identifier.to_string();
                let cancel = options.cancel.clone();
                tokio::spawn(async move {
                    let settled = inner.lookup(&key, &fallback, cancel).await;
                    inner.state().in_flight.remove(&key);
                    let _ = tx.send(Some(settled));
                });
                await_settled(rx).await
            }
        }
    }

    /// Resolves a batch of identifiers, returning one entry per distinct
    /// original input element (original casing preserved), in input order.
    ///
    /// Only keys missing from the cache are fetched, by a pool of at most
    /// `options.concurrency` workers pulling from a shared queue.
    /// Cancellation aborts the in-flight lookups; keys resolved before the
    /// cancellation stay cached, unresolved keys map to their original
    /// identifier without being cached.
    pub async fn resolve_batch<I, S>(
        &self,
        identifiers: I,
        options: &BatchOptions,
    ) -> IndexMap<String, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let originals: Vec<String> = identifiers.into_iter().map(Into::into).collect();
        self.inner.ensure_snapshot_loaded();

        let queue: VecDeque<String> = {
            let state = self.inner.state();
            let mut seen = HashSet::new();
            let mut queue = VecDeque::new();
            for original in &originals {
                let key = normalize_key(original);
                if !state.cache.contains_key(&key) && seen.insert(key.clone()) {
                    queue.push_back(key);
                }
            }
            queue
        };

        if !queue.is_empty() {
            let workers = options.concurrency.clamp(1, queue.len());
            let queue = Arc::new(Mutex::new(queue));
            let mut pool = JoinSet::new();

            for _ in 0..workers {
                let queue = Arc::clone(&queue);
                let resolver = self.clone();
                let cancel = options.cancel.clone();
                pool.spawn(async move {
                    let item_options =
                        ResolveOptions { deduplicate: false, cancel: cancel.clone() };
                    while let Some(key) = next_key(&queue) {
                        match resolver.resolve_one(&key, &item_options).await {
                            Ok(_) => {}
                            Err(ResolveError::Cancelled)
                                if cancel
                                    .as_ref()
                                    .is_some_and(CancellationToken::is_cancelled) =>
                            {
                                break;
                            }
                            Err(err) => {
                                log::debug!("batch lookup for '{key}' aborted: {err}");
                            }
                        }
                    }
                });
            }

            while pool.join_next().await.is_some() {}
        }

        let state = self.inner.state();
        originals
            .into_iter()
            .map(|original| {
                let value = state
                    .cache
                    .get(&normalize_key(&original))
                    .cloned()
                    .unwrap_or_else(|| original.clone());
                (original, value)
            })
            .collect()
    }

    /// Returns the cached display name for `identifier`, if known.
    ///
    /// Synchronous and never fetches. The first call on a fresh resolver
    /// loads the persisted snapshot, so rendering code sees best-effort data
    /// without blocking on the network.
    #[must_use]
    pub fn get_cached(&self, identifier: &str) -> Option<String> {
        self.inner.ensure_snapshot_loaded();
        self.inner.state().cache.get(&normalize_key(identifier)).cloned()
    }
}

impl Inner {
    /// Cache keys and in-flight keys are plain map inserts/removes, so a
    /// poisoned guard still holds structurally intact maps; recover it.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_snapshot_loaded(&self) {
        let mut state = self.state();
        if state.snapshot_loaded {
            return;
        }
        state.snapshot_loaded = true;
        match self.store.load() {
            Ok(entries) => {
                // Never overwrite a value resolved in this session.
                for (key, value) in entries {
                    state.cache.entry(normalize_key(&key)).or_insert(value);
                }
            }
            Err(err) => log::warn!("ignoring unreadable name snapshot: {err}"),
        }
    }

    /// One network lookup: timeout-bounded, cancellable, fallback-caching.
    async fn lookup(
        self: &Arc<Self>,
        key: &str,
        fallback: &str,
        cancel: Option<CancellationToken>,
    ) -> Result<String, ResolveError> {
        let fetch =
            tokio::time::timeout(self.config.lookup_timeout, self.source.localized_names(key));

        let fetched = if let Some(token) = cancel {
            tokio::select! {
                () = token.cancelled() => return Err(ResolveError::Cancelled),
                fetched = fetch => fetched,
            }
        } else {
            fetch.await
        };

        let resolved = match fetched {
            Err(_elapsed) => return Err(ResolveError::TimedOut(self.config.lookup_timeout)),
            Ok(Ok(names)) => match names.for_language(&self.config.locale) {
                Some(name) => name.to_string(),
                None => fallback.to_string(),
            },
            Ok(Err(err)) => {
                log::debug!("species lookup for '{key}' failed, using fallback: {err}");
                fallback.to_string()
            }
        };

        self.store_resolved(key, resolved.clone());
        Ok(resolved)
    }

    fn store_resolved(self: &Arc<Self>, key: &str, value: String) {
        self.state().cache.insert(key.to_string(), value);
        self.schedule_flush();
    }

    /// Trailing-edge debounce: every write pushes the pending flush out,
    /// keeping at most one scheduled at a time.
    fn schedule_flush(self: &Arc<Self>) {
        let mut state = self.state();
        if let Some(pending) = state.flush.take() {
            pending.abort();
        }

        let inner = Arc::clone(self);
        state.flush = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.config.debounce_window).await;
            let entries = {
                let mut state = inner.state();
                state.flush = None;
                state.cache.clone()
            };
            if let Err(err) = inner.store.save(&entries) {
                log::debug!("name snapshot write failed (ignored): {err}");
            }
        }));
    }
}

fn normalize_key(identifier: &str) -> String {
    identifier.to_lowercase()
}

async fn await_settled(
    mut pending: watch::Receiver<Settled>,
) -> Result<String, ResolveError> {
    match pending.wait_for(Option::is_some).await {
        Ok(settled) => (*settled).clone().unwrap_or(Err(ResolveError::Cancelled)),
        // Leader task torn down without settling (runtime shutdown).
        Err(_) => Err(ResolveError::Cancelled),
    }
}

fn next_key(queue: &Mutex<VecDeque<String>>) -> Option<String> {
    queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front()
}
