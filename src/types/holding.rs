//! Holding types for the trading ledger engine
//!
//! A `Holding` is one account's position in one symbol: a share count plus
//! the weighted-average price paid for those shares. Quantity and basis are
//! private so the weighted-average invariant cannot be broken from outside;
//! buys and sells go through `add_shares`/`remove_shares`.

use crate::types::account::AccountId;
use crate::types::error::LedgerError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An account's position in a single symbol
///
/// The average cost basis is recomputed on every buy as
/// `(held_quantity * old_basis + bought_quantity * price) / total_quantity`
/// and left unchanged by sells. A holding never exists with zero quantity;
/// the registry removes the entry when a sell empties it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Owning account identifier
    pub account_id: AccountId,

    /// Ticker symbol (e.g. "AAPL")
    pub symbol: String,

    /// Shares currently held; always positive while the holding exists
    quantity: u32,

    /// Weighted-average purchase price per share
    avg_cost_basis: Decimal,

    /// Instant of the last buy or sell touching this holding (UTC)
    pub last_updated: DateTime<Utc>,
}

impl Holding {
    /// Open a position with an initial purchase
    ///
    /// # Errors
    ///
    /// * `InvalidQuantity` - if `quantity` is zero
    pub fn new(
        account_id: AccountId,
        symbol: &str,
        quantity: u32,
        price: Decimal,
    ) -> Result<Self, LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::invalid_quantity(quantity));
        }

        Ok(Holding {
            account_id,
            symbol: symbol.to_string(),
            quantity,
            avg_cost_basis: price,
            last_updated: Utc::now(),
        })
    }

    /// Shares currently held
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Weighted-average purchase price per share
    pub fn avg_cost_basis(&self) -> Decimal {
        self.avg_cost_basis
    }

    /// Whether the position covers a sale of `quantity` shares
    pub fn can_sell(&self, quantity: u32) -> bool {
        self.quantity >= quantity
    }

    /// Add purchased shares and recompute the weighted-average basis
    ///
    /// # Errors
    ///
    /// * `InvalidQuantity` - if `quantity` is zero
    /// * `ArithmeticOverflow` - if the checked cost arithmetic exhausts `Decimal`
    pub fn add_shares(&mut self, quantity: u32, price: Decimal) -> Result<(), LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::invalid_quantity(quantity));
        }

        let overflow = || LedgerError::arithmetic_overflow("cost basis update", self.account_id);

        let held_cost = Decimal::from(self.quantity)
            .checked_mul(self.avg_cost_basis)
            .ok_or_else(overflow)?;
        let added_cost = Decimal::from(quantity)
            .checked_mul(price)
            .ok_or_else(overflow)?;
        let total_cost = held_cost.checked_add(added_cost).ok_or_else(overflow)?;

        let total_quantity = self.quantity.checked_add(quantity).ok_or_else(overflow)?;

        // total_quantity >= 1 here, so the division cannot hit zero
        self.avg_cost_basis = total_cost
            .checked_div(Decimal::from(total_quantity))
            .ok_or_else(overflow)?;
        self.quantity = total_quantity;
        self.last_updated = Utc::now();
        Ok(())
    }

    /// Remove sold shares; the average cost basis is unchanged by sells
    ///
    /// # Errors
    ///
    /// * `InvalidQuantity` - if `quantity` is zero
    /// * `InsufficientHoldings` - if more shares are requested than held
    pub fn remove_shares(&mut self, quantity: u32) -> Result<(), LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::invalid_quantity(quantity));
        }
        if quantity > self.quantity {
            return Err(LedgerError::insufficient_holdings(
                self.account_id,
                &self.symbol,
                self.quantity,
                quantity,
            ));
        }

        self.quantity -= quantity;
        self.last_updated = Utc::now();
        Ok(())
    }

    /// Market value of the position at the given price
    ///
    /// # Errors
    ///
    /// * `ArithmeticOverflow` - if the checked multiplication exhausts `Decimal`
    pub fn market_value(&self, price: Decimal) -> Result<Decimal, LedgerError> {
        Decimal::from(self.quantity)
            .checked_mul(price)
            .ok_or_else(|| LedgerError::arithmetic_overflow("market value", self.account_id))
    }

    /// Unrealized gain or loss at the given price: `quantity * (price - basis)`
    ///
    /// # Errors
    ///
    /// * `ArithmeticOverflow` - if the checked arithmetic exhausts `Decimal`
    pub fn unrealized_pnl(&self, price: Decimal) -> Result<Decimal, LedgerError> {
        let overflow = || LedgerError::arithmetic_overflow("unrealized pnl", self.account_id);
        let per_share = price.checked_sub(self.avg_cost_basis).ok_or_else(overflow)?;
        Decimal::from(self.quantity)
            .checked_mul(per_share)
            .ok_or_else(overflow)
    }
}
