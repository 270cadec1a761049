use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use jpdex::{
    ApiError, BatchOptions, InMemorySnapshotStore, LocalizedName, NameResolver, NameSource,
    NamedResource, SpeciesNames,
};

fn species(ja: &str) -> SpeciesNames {
    SpeciesNames {
        names: vec![LocalizedName {
            name: ja.to_string(),
            language: NamedResource { name: "ja-Hrkt".to_string(), url: String::new() },
        }],
    }
}

/// Upstream mock with per-key replies, call counting and in-flight tracking.
struct MapSource {
    replies: HashMap<&'static str, &'static str>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MapSource {
    fn new(replies: &[(&'static str, &'static str)]) -> Self {
        Self::with_delay(replies, Duration::ZERO)
    }

    fn with_delay(replies: &[(&'static str, &'static str)], delay: Duration) -> Self {
        Self {
            replies: replies.iter().copied().collect(),
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NameSource for MapSource {
    async fn localized_names(&self, key: &str) -> Result<SpeciesNames, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.replies.get(key) {
            Some(ja) => Ok(species(ja)),
            // No target-locale entry: the resolver falls back.
            None => Ok(SpeciesNames::default()),
        }
    }
}

fn resolver_with(source: Arc<dyn NameSource>) -> NameResolver {
    NameResolver::new(source, Arc::new(InMemorySnapshotStore::new()))
}

#[tokio::test]
async fn batch_maps_every_input_element() {
    let source = Arc::new(MapSource::new(&[("pikachu", "ピカチュウ"), ("eevee", "イーブイ")]));
    let resolver = resolver_with(source.clone());

    let options = BatchOptions { concurrency: 2, cancel: None };
    let result = resolver.resolve_batch(["Pikachu", "pikachu", "Eevee"], &options).await;

    // One network call per unique lower-cased key.
    assert_eq!(source.calls(), 2);

    assert_eq!(result.len(), 3);
    assert_eq!(result["Pikachu"], "ピカチュウ");
    assert_eq!(result["pikachu"], "ピカチュウ");
    assert_eq!(result["Eevee"], "イーブイ");

    let order: Vec<&str> = result.keys().map(String::as_str).collect();
    assert_eq!(order, ["Pikachu", "pikachu", "Eevee"]);
}

#[tokio::test]
async fn identical_inputs_collapse_to_one_entry() {
    let source = Arc::new(MapSource::new(&[("mew", "ミュウ")]));
    let resolver = resolver_with(source.clone());

    let result = resolver.resolve_batch(["Mew", "Mew"], &BatchOptions::default()).await;

    assert_eq!(source.calls(), 1);
    assert_eq!(result.len(), 1);
    assert_eq!(result["Mew"], "ミュウ");
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    let source = Arc::new(MapSource::new(&[]));
    let resolver = resolver_with(source.clone());

    let result =
        resolver.resolve_batch(Vec::<String>::new(), &BatchOptions::default()).await;

    assert!(result.is_empty());
    assert_eq!(source.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn batch_respects_the_concurrency_bound() {
    let source = Arc::new(MapSource::with_delay(&[], Duration::from_millis(25)));
    let resolver = resolver_with(source.clone());

    let identifiers: Vec<String> = (1..=8).map(|i| format!("pokemon-{i}")).collect();
    let options = BatchOptions { concurrency: 3, cancel: None };
    let result = resolver.resolve_batch(identifiers, &options).await;

    assert_eq!(result.len(), 8);
    assert_eq!(source.calls(), 8);
    assert!(source.max_in_flight() <= 3, "max in flight was {}", source.max_in_flight());
}

#[tokio::test]
async fn cached_keys_are_not_refetched() {
    let seeded: HashMap<String, String> =
        [("pikachu".to_string(), "ピカチュウ".to_string())].into_iter().collect();
    let source = Arc::new(MapSource::new(&[("eevee", "イーブイ")]));
    let resolver = NameResolver::new(
        source.clone(),
        Arc::new(InMemorySnapshotStore::with_entries(seeded)),
    );

    let result = resolver.resolve_batch(["Pikachu", "Eevee"], &BatchOptions::default()).await;

    assert_eq!(source.calls(), 1);
    assert_eq!(result["Pikachu"], "ピカチュウ");
    assert_eq!(result["Eevee"], "イーブイ");
}

/// Replies instantly for bulbasaur, cancels the batch on charmander.
struct CancelOnSecond {
    token: CancellationToken,
    calls: AtomicUsize,
}

#[async_trait]
impl NameSource for CancelOnSecond {
    async fn localized_names(&self, key: &str) -> Result<SpeciesNames, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if key == "bulbasaur" {
            return Ok(species("フシギダネ"));
        }
        self.token.cancel();
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(SpeciesNames::default())
    }
}

#[tokio::test(start_paused = true)]
async fn cancellation_keeps_resolved_keys_and_drops_pending_ones() {
    let token = CancellationToken::new();
    let source =
        Arc::new(CancelOnSecond { token: token.clone(), calls: AtomicUsize::new(0) });
    let resolver = resolver_with(source.clone());

    let options = BatchOptions { concurrency: 1, cancel: Some(token) };
    let result = resolver
        .resolve_batch(["Bulbasaur", "Charmander", "Squirtle"], &options)
        .await;

    // Every input element still has an entry; unresolved keys fall back to
    // the caller's original spelling.
    assert_eq!(result["Bulbasaur"], "フシギダネ");
    assert_eq!(result["Charmander"], "Charmander");
    assert_eq!(result["Squirtle"], "Squirtle");

    // The resolved key stays cached, the aborted and never-attempted keys
    // are not cached as failures.
    assert_eq!(resolver.get_cached("bulbasaur").as_deref(), Some("フシギダネ"));
    assert_eq!(resolver.get_cached("charmander"), None);
    assert_eq!(resolver.get_cached("squirtle"), None);

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}
