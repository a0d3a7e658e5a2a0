//! TTL-caching oracle wrapper
//!
//! Wraps any inner oracle with a per-symbol quote cache. A quote younger
//! than the configured TTL short-circuits the inner fetch; a stale or
//! missing quote triggers a fresh fetch whose result replaces the cache
//! entry. Two tasks racing on a cold symbol may both hit the inner oracle;
//! the cache is a cost saver, not a synchronization point.

use crate::pricing::PriceOracle;
use crate::types::LedgerError;
use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use rust_decimal::Decimal;
use std::time::{Duration, Instant};

/// One cached quote with its fetch instant
#[derive(Debug, Clone, Copy)]
struct CachedQuote {
    price: Decimal,
    fetched_at: Instant,
}

/// Price oracle that caches an inner oracle's quotes for a fixed TTL
#[derive(Debug)]
pub struct CachedPriceOracle<O> {
    inner: O,
    ttl: Duration,
    cache: DashMap<String, CachedQuote>,
}

impl<O: PriceOracle> CachedPriceOracle<O> {
    /// Wrap an oracle with a quote cache of the given TTL
    pub fn new(inner: O, ttl: Duration) -> Self {
        CachedPriceOracle {
            inner,
            ttl,
            cache: DashMap::new(),
        }
    }

    fn cached(&self, symbol: &str) -> Option<Decimal> {
        let entry = self.cache.get(symbol)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.price)
        } else {
            None
        }
    }
}

#[async_trait]
impl<O: PriceOracle> PriceOracle for CachedPriceOracle<O> {
    async fn get_price(&self, symbol: &str) -> Result<Decimal, LedgerError> {
        if let Some(price) = self.cached(symbol) {
            debug!("Quote cache hit for {}: {}", symbol, price);
            return Ok(price);
        }

        let price = self.inner.get_price(symbol).await?;
        self.cache.insert(
            symbol.to_string(),
            CachedQuote {
                price,
                fetched_at: Instant::now(),
            },
        );
        Ok(price)
    }
}
