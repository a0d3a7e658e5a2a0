//! Price oracle interface and reference implementations
//!
//! The ledger never owns market data. Prices come from a `PriceOracle`
//! implementation behind a fetch-with-timeout contract: every call the
//! engine makes is bounded by the configured timeout and an elapsed timeout
//! surfaces as `PriceUnavailable`, exactly like a provider failure.
//!
//! Two reference implementations ship with the crate:
//! - [`FixedPriceOracle`]: static quote table, used by tests and demos
//! - [`CachedPriceOracle`]: TTL cache wrapped around any inner oracle

pub mod cached;
pub mod fixed;

pub use cached::CachedPriceOracle;
pub use fixed::FixedPriceOracle;

use crate::types::LedgerError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;

/// Source of current per-share prices
///
/// Implementations are free to hit a network, consult a cache, or serve a
/// static table; the engine only relies on `get_price` resolving to either
/// a positive quote or a `PriceUnavailable` error.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Current price per share for a symbol
    ///
    /// # Errors
    ///
    /// * `PriceUnavailable` - the provider has no quote or failed to answer
    async fn get_price(&self, symbol: &str) -> Result<Decimal, LedgerError>;
}

/// Fetch a price with an upper bound on how long the oracle may take
///
/// This is the single path through which the engine talks to an oracle.
///
/// # Errors
///
/// * `PriceUnavailable` - the oracle failed or the timeout elapsed
pub async fn fetch_price_with_timeout(
    oracle: &dyn PriceOracle,
    symbol: &str,
    timeout: Duration,
) -> Result<Decimal, LedgerError> {
    match tokio::time::timeout(timeout, oracle.get_price(symbol)).await {
        Ok(result) => result,
        Err(_) => Err(LedgerError::price_unavailable(symbol, "request timed out")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Oracle whose future never resolves, for exercising the timeout path
    struct StalledOracle;

    #[async_trait]
    impl PriceOracle for StalledOracle {
        async fn get_price(&self, _symbol: &str) -> Result<Decimal, LedgerError> {
            futures::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_timeout_elapses_as_price_unavailable() {
        let oracle = StalledOracle;
        let result =
            fetch_price_with_timeout(&oracle, "AAPL", Duration::from_millis(10)).await;

        match result {
            Err(LedgerError::PriceUnavailable { symbol, reason }) => {
                assert_eq!(symbol, "AAPL");
                assert_eq!(reason, "request timed out");
            }
            other => panic!("Expected PriceUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fast_oracle_passes_through() {
        let oracle = FixedPriceOracle::simulated();
        let price = fetch_price_with_timeout(&oracle, "AAPL", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(price, dec!(145.00));
    }
}
