//! In-memory memoization of completed fetches.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::client::MarketData;
use crate::{DateRange, Symbol};

type FetchKey = (Symbol, DateRange);

#[derive(Debug, Clone)]
struct CacheEntry {
    data: MarketData,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| now <= expires_at)
    }
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<FetchKey, CacheEntry>,
    ttl: Duration,
}

impl CacheInner {
    fn get(&self, key: &FetchKey) -> Option<MarketData> {
        self.map
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.data.clone())
    }

    fn put(&mut self, key: FetchKey, data: MarketData) {
        let now = Instant::now();
        self.map.retain(|_, entry| entry.is_live(now));
        self.map.insert(
            key,
            CacheEntry {
                data,
                expires_at: now.checked_add(self.ttl),
            },
        );
    }
}

/// Thread-safe cache of [`MarketData`] keyed by `(symbol, range)`.
///
/// A zero TTL disables the cache: `put` becomes a no-op and every `get`
/// misses.
#[derive(Debug, Clone)]
pub struct FetchCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl FetchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                ttl,
            })),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn get(&self, symbol: &Symbol, range: DateRange) -> Option<MarketData> {
        let store = self.inner.read().await;
        store.get(&(symbol.clone(), range))
    }

    pub async fn put(&self, symbol: Symbol, range: DateRange, data: MarketData) {
        let mut store = self.inner.write().await;
        if store.ttl == Duration::ZERO {
            return;
        }
        store.put((symbol, range), data);
    }

    /// Number of entries, expired ones included until the next `put`.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn is_disabled(&self) -> bool {
        self.inner.read().await.ttl == Duration::ZERO
    }
}

impl Default for FetchCache {
    fn default() -> Self {
        Self::disabled()
    }
}
