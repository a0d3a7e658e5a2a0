//! Engine configuration
//!
//! Amount limits, the supported symbol set, and pricing knobs live in one
//! immutable struct read by validators and services at construction time.
//! `Default` carries the platform's standard values.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

/// Process-wide ledger configuration
///
/// Cloned into the validators and services when the engine is wired up;
/// nothing reads it after construction, so changing a config value never
/// affects a running engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Smallest accepted deposit (inclusive)
    pub min_deposit: Decimal,

    /// Largest accepted deposit (inclusive)
    pub max_deposit: Decimal,

    /// Smallest accepted withdrawal (inclusive)
    pub min_withdrawal: Decimal,

    /// Largest accepted withdrawal (inclusive)
    pub max_withdrawal: Decimal,

    /// Symbols the trading service accepts orders for
    pub supported_symbols: Vec<String>,

    /// How long a cached quote stays fresh
    pub price_cache_ttl: Duration,

    /// Upper bound on a single price-oracle call
    ///
    /// Elapsed timeouts surface as `PriceUnavailable`.
    pub price_timeout: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            min_deposit: dec!(1.00),
            max_deposit: dec!(1000000.00),
            min_withdrawal: dec!(0.01),
            max_withdrawal: dec!(1000000.00),
            supported_symbols: vec![
                "AAPL".to_string(),
                "TSLA".to_string(),
                "GOOGL".to_string(),
            ],
            price_cache_ttl: Duration::from_secs(300),
            price_timeout: Duration::from_secs(5),
        }
    }
}

impl LedgerConfig {
    /// Whether the symbol is in the supported trading set
    pub fn is_supported_symbol(&self, symbol: &str) -> bool {
        self.supported_symbols.iter().any(|s| s == symbol)
    }
}
