//! Portfolio valuation and profit-and-loss
//!
//! # Design
//!
//! The valuator is strictly read-only: it snapshots an account, prices the
//! positions, and derives figures. It never mutates state and never writes
//! transaction records, so it can run concurrently with any number of
//! mutating operations.
//!
//! All positions are priced concurrently and a single `PriceUnavailable`
//! fails the whole computation. A partial total that silently omitted an
//! unpriceable position would be worse than no answer.

use crate::config::LedgerConfig;
use crate::core::accounts::AccountRegistry;
use crate::pricing::{fetch_price_with_timeout, PriceOracle};
use crate::types::{AccountId, Holding, LedgerError};
use futures::future::try_join_all;
use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// One position priced at the current market
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingValue {
    /// Ticker symbol
    pub symbol: String,
    /// Shares held
    pub quantity: u32,
    /// Weighted average purchase price per share
    pub avg_cost_basis: Decimal,
    /// Price per share at valuation time
    pub current_price: Decimal,
    /// `quantity * current_price`
    pub market_value: Decimal,
    /// `quantity * (current_price - avg_cost_basis)`
    pub unrealized_pnl: Decimal,
}

/// Gain realized by a sale, relative to the weighted average basis
///
/// `quantity * (sale_price - avg_cost_basis)`; negative for a loss. Derived
/// on demand and never stored. Returns `None` when the checked arithmetic
/// cannot represent the result.
pub fn realized_pnl(quantity: u32, sale_price: Decimal, avg_cost_basis: Decimal) -> Option<Decimal> {
    sale_price
        .checked_sub(avg_cost_basis)
        .and_then(|gain_per_share| Decimal::from(quantity).checked_mul(gain_per_share))
}

/// Read-only portfolio valuation over shared accounts and an oracle
pub struct PortfolioValuator {
    accounts: Arc<AccountRegistry>,
    oracle: Arc<dyn PriceOracle>,
    price_timeout: Duration,
}

impl PortfolioValuator {
    /// Create a valuator over shared accounts and an oracle
    pub fn new(
        config: &LedgerConfig,
        accounts: Arc<AccountRegistry>,
        oracle: Arc<dyn PriceOracle>,
    ) -> Self {
        PortfolioValuator {
            accounts,
            oracle,
            price_timeout: config.price_timeout,
        }
    }

    /// Price every position concurrently
    ///
    /// # Errors
    ///
    /// * `PriceUnavailable` - any fetch failed or timed out
    async fn price_all(
        &self,
        holdings: Vec<Holding>,
    ) -> Result<Vec<(Holding, Decimal)>, LedgerError> {
        let fetches = holdings.into_iter().map(|holding| {
            let oracle = Arc::clone(&self.oracle);
            let timeout = self.price_timeout;
            async move {
                let price = fetch_price_with_timeout(&*oracle, &holding.symbol, timeout).await?;
                Ok::<(Holding, Decimal), LedgerError>((holding, price))
            }
        });
        try_join_all(fetches).await
    }

    fn portfolio_value(
        account_id: AccountId,
        cash: Decimal,
        priced: &[(Holding, Decimal)],
    ) -> Result<Decimal, LedgerError> {
        let mut total = cash;
        for (holding, price) in priced {
            total = total
                .checked_add(holding.market_value(*price)?)
                .ok_or_else(|| LedgerError::arithmetic_overflow("portfolio value", account_id))?;
        }
        Ok(total)
    }

    /// Total portfolio value: cash plus every position at market price
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - no such account
    /// * `PriceUnavailable` - any position could not be priced
    pub async fn calculate_total_value(
        &self,
        account_id: AccountId,
    ) -> Result<Decimal, LedgerError> {
        let snapshot = self.accounts.snapshot(account_id)?;
        let cash = snapshot.account.cash_balance();
        let priced = self.price_all(snapshot.holdings).await?;

        let total = Self::portfolio_value(account_id, cash, &priced)?;
        debug!("Account {} valued at {}", account_id, total);
        Ok(total)
    }

    /// Every position priced at market, sorted by symbol
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - no such account
    /// * `PriceUnavailable` - any position could not be priced
    pub async fn holding_values(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<HoldingValue>, LedgerError> {
        let snapshot = self.accounts.snapshot(account_id)?;
        let priced = self.price_all(snapshot.holdings).await?;

        priced
            .into_iter()
            .map(|(holding, price)| {
                Ok(HoldingValue {
                    symbol: holding.symbol.clone(),
                    quantity: holding.quantity(),
                    avg_cost_basis: holding.avg_cost_basis(),
                    current_price: price,
                    market_value: holding.market_value(price)?,
                    unrealized_pnl: holding.unrealized_pnl(price)?,
                })
            })
            .collect()
    }

    /// Unrealized profit-and-loss summed over every position
    ///
    /// `Σ quantity * (current_price - avg_cost_basis)`; zero for an account
    /// with no holdings.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - no such account
    /// * `PriceUnavailable` - any position could not be priced
    pub async fn calculate_total_pnl(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        let snapshot = self.accounts.snapshot(account_id)?;
        let priced = self.price_all(snapshot.holdings).await?;

        let mut total = Decimal::ZERO;
        for (holding, price) in &priced {
            total = total
                .checked_add(holding.unrealized_pnl(*price)?)
                .ok_or_else(|| LedgerError::arithmetic_overflow("total pnl", account_id))?;
        }
        Ok(total)
    }

    /// Cash contributed to the account over its lifetime
    ///
    /// `total_deposits - total_withdrawals`.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - no such account
    pub fn net_deposits(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        let account = self
            .accounts
            .get(account_id)
            .ok_or_else(|| LedgerError::account_not_found(account_id))?;

        account
            .total_deposits()
            .checked_sub(account.total_withdrawals())
            .ok_or_else(|| LedgerError::arithmetic_overflow("net deposits", account_id))
    }

    /// Portfolio gain relative to the cash put in
    ///
    /// `calculate_total_value - net_deposits`, both taken from one snapshot
    /// so the two figures describe the same instant.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - no such account
    /// * `PriceUnavailable` - any position could not be priced
    pub async fn total_return(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        let snapshot = self.accounts.snapshot(account_id)?;
        let cash = snapshot.account.cash_balance();
        let net = snapshot
            .account
            .total_deposits()
            .checked_sub(snapshot.account.total_withdrawals())
            .ok_or_else(|| LedgerError::arithmetic_overflow("net deposits", account_id))?;
        let priced = self.price_all(snapshot.holdings).await?;

        let total = Self::portfolio_value(account_id, cash, &priced)?;
        total
            .checked_sub(net)
            .ok_or_else(|| LedgerError::arithmetic_overflow("total return", account_id))
    }
}
