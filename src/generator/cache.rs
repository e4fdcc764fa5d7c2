//! Client cache
//!
//! Reuses built model clients for identical `(model, temperature,
//! max_tokens)` triples until they are `ttl` old (one hour by default).
//! Clients are built through an injected factory, so tests never touch
//! the network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

use super::client::ChatModel;
use super::error::Result;
use super::models::GenerationParams;

pub const DEFAULT_CLIENT_TTL: Duration = Duration::from_secs(3600);

type Factory = dyn Fn(&GenerationParams) -> Result<Arc<dyn ChatModel>> + Send + Sync;

/// Cache key. Temperature is keyed by its bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey {
    pub model: String,
    temperature_bits: u64,
    pub max_tokens: u32,
}

impl ClientKey {
    pub fn new(params: &GenerationParams) -> Self {
        Self {
            model: params.model.clone(),
            temperature_bits: params.temperature.to_bits(),
            max_tokens: params.max_tokens,
        }
    }

    pub(crate) fn temperature(&self) -> f64 {
        f64::from_bits(self.temperature_bits)
    }
}

struct Entry {
    client: Arc<dyn ChatModel>,
    built_at: Instant,
}

pub struct ClientCache {
    factory: Box<Factory>,
    ttl: Duration,
    entries: Mutex<HashMap<ClientKey, Entry>>,
}

impl ClientCache {
    pub fn new<F>(ttl: Duration, factory: F) -> Self
    where
        F: Fn(&GenerationParams) -> Result<Arc<dyn ChatModel>> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached client for `params`, building a fresh one if missing or expired.
    /// A failed build is not cached.
    pub fn get(&self, params: &GenerationParams) -> Result<Arc<dyn ChatModel>> {
        let key = ClientKey::new(params);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let evicted = evict_expired(&mut entries, self.ttl);
        if evicted > 0 {
            debug!(evicted, "dropped expired clients");
        }

        if let Some(entry) = entries.get(&key) {
            debug!(model = %key.model, "reusing cached client");
            return Ok(Arc::clone(&entry.client));
        }

        debug!(model = %key.model, temperature = key.temperature(), max_tokens = key.max_tokens, "building client");
        let client = (self.factory)(params)?;
        entries.insert(
            key,
            Entry {
                client: Arc::clone(&client),
                built_at: Instant::now(),
            },
        );
        Ok(client)
    }
}

/// Drop entries at least `ttl` old, returning how many went
fn evict_expired(entries: &mut HashMap<ClientKey, Entry>, ttl: Duration) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| entry.built_at.elapsed() < ttl);
    before - entries.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::error::GenerationError;
    use crate::generator::models::ModelCatalog;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo;

    impl ChatModel for Echo {
        fn complete(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_string())
        }
    }

    fn cached(cache: &ClientCache) -> usize {
        cache.entries.lock().unwrap().len()
    }

    fn counting_cache(ttl: Duration) -> (Arc<AtomicUsize>, ClientCache) {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&builds);
        let cache = ClientCache::new(ttl, move |_params| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Echo) as Arc<dyn ChatModel>)
        });
        (builds, cache)
    }

    fn params(temperature: f64, max_tokens: u32) -> GenerationParams {
        ModelCatalog::default()
            .params(
                "meta-llama/Meta-Llama-3-8B-Instruct",
                Some(temperature),
                Some(max_tokens),
            )
            .unwrap()
    }

    #[test]
    fn test_reuses_clients_per_key() {
        let (builds, cache) = counting_cache(DEFAULT_CLIENT_TTL);

        cache.get(&params(0.3, 800)).unwrap();
        cache.get(&params(0.3, 800)).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);

        cache.get(&params(0.5, 800)).unwrap();
        cache.get(&params(0.3, 1024)).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 3);
        assert_eq!(cached(&cache), 3);
    }

    #[test]
    fn test_expired_clients_are_rebuilt() {
        let (builds, cache) = counting_cache(Duration::ZERO);

        cache.get(&params(0.3, 800)).unwrap();
        cache.get(&params(0.3, 800)).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);
        assert_eq!(cached(&cache), 1);

        // Stale entries for other keys go too
        cache.get(&params(0.5, 800)).unwrap();
        assert_eq!(cached(&cache), 1);
        assert_eq!(builds.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failed_builds_are_not_cached() {
        let cache = ClientCache::new(DEFAULT_CLIENT_TTL, |_params| Err(GenerationError::MissingToken));

        assert!(cache.get(&params(0.3, 800)).is_err());
        assert_eq!(cached(&cache), 0);
    }
}
