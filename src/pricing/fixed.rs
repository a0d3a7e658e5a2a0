//! Static quote table oracle
//!
//! Serves prices from an in-memory table. The `simulated` constructor
//! carries the platform's standard demo quote sheet, which makes this the
//! oracle of choice for tests and local runs.

use crate::pricing::PriceOracle;
use crate::types::LedgerError;
use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Price oracle backed by a fixed symbol-to-price table
#[derive(Debug, Clone)]
pub struct FixedPriceOracle {
    prices: HashMap<String, Decimal>,
}

impl FixedPriceOracle {
    /// Create an oracle serving exactly the given quotes
    pub fn new(prices: HashMap<String, Decimal>) -> Self {
        FixedPriceOracle { prices }
    }

    /// Oracle with the standard simulated quote sheet
    ///
    /// AAPL 145.00, TSLA 650.00, GOOGL 2800.00
    pub fn simulated() -> Self {
        Self::new(HashMap::from([
            ("AAPL".to_string(), dec!(145.00)),
            ("TSLA".to_string(), dec!(650.00)),
            ("GOOGL".to_string(), dec!(2800.00)),
        ]))
    }
}

#[async_trait]
impl PriceOracle for FixedPriceOracle {
    async fn get_price(&self, symbol: &str) -> Result<Decimal, LedgerError> {
        match self.prices.get(symbol) {
            Some(price) => {
                debug!("Quote for {}: {}", symbol, price);
                Ok(*price)
            }
            None => Err(LedgerError::price_unavailable(symbol, "no quote in table")),
        }
    }
}
