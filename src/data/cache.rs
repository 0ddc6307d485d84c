//! Time-bounded memoization in front of a provider
//!
//! Fetches are idempotent reads, so a successful response can be served again
//! until it is `ttl` old. Failures are never cached. Expired entries are
//! purged whenever a new entry is stored.

use super::MarketDataProvider;
use crate::error::Result;
use crate::types::{DateWindow, DividendEvent, PricePoint};
use hashbrown::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Default entry lifetime: one hour
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

struct Entry<T> {
    fetched_at: Instant,
    value: T,
}

/// Wraps any provider with a per-ticker TTL cache
pub struct CachingProvider<P> {
    inner: P,
    ttl: Duration,
    dividends: Mutex<HashMap<String, Entry<Vec<DividendEvent>>>>,
    prices: Mutex<HashMap<(String, DateWindow), Entry<Vec<PricePoint>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Insert `value` under `key` after dropping entries older than `ttl`
fn store<K, T>(map: &Mutex<HashMap<K, Entry<T>>>, ttl: Duration, key: K, value: T)
where
    K: std::hash::Hash + Eq,
{
    let mut map = lock(map);
    let before = map.len();
    map.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
    if map.len() < before {
        log::debug!("Evicted {} expired cache entries", before - map.len());
    }
    map.insert(
        key,
        Entry {
            fetched_at: Instant::now(),
            value,
        },
    );
}

impl<P: MarketDataProvider> CachingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL)
    }

    pub fn with_ttl(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            dividends: Mutex::new(HashMap::new()),
            prices: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        lock(&self.dividends).clear();
        lock(&self.prices).clear();
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Cached dividend and price entries, fresh or not
    pub fn entry_count(&self) -> usize {
        lock(&self.dividends).len() + lock(&self.prices).len()
    }

    fn fresh<T>(&self, entry: &Entry<T>) -> bool {
        entry.fetched_at.elapsed() < self.ttl
    }
}

impl<P: MarketDataProvider> MarketDataProvider for CachingProvider<P> {
    fn dividends(&self, ticker: &str) -> Result<Vec<DividendEvent>> {
        if let Some(entry) = lock(&self.dividends).get(ticker) {
            if self.fresh(entry) {
                log::debug!("Cache hit: dividends for {}", ticker);
                return Ok(entry.value.clone());
            }
        }

        let value = self.inner.dividends(ticker)?;
        store(&self.dividends, self.ttl, ticker.to_string(), value.clone());
        Ok(value)
    }

    fn prices(&self, ticker: &str, window: &DateWindow) -> Result<Vec<PricePoint>> {
        let key = (ticker.to_string(), *window);
        if let Some(entry) = lock(&self.prices).get(&key) {
            if self.fresh(entry) {
                log::debug!("Cache hit: prices for {}", ticker);
                return Ok(entry.value.clone());
            }
        }

        let value = self.inner.prices(ticker, window)?;
        store(&self.prices, self.ttl, key, value.clone());
        Ok(value)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
