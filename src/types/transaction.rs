//! Transaction types for the trading ledger engine
//!
//! This module defines the immutable audit record written for every money
//! operation, successful or not. Transactions are created `Pending` by the
//! typed constructors below, transition to a terminal status exactly once
//! through the consuming `complete`/`fail` methods, and are only ever handed
//! to the transaction sink in a terminal status.

use crate::types::account::AccountId;
use crate::types::error::LedgerError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique transaction identifier (UUID v4)
pub type TransactionId = Uuid;

/// The kind of money operation a transaction records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Cash added to the account from outside
    Deposit,
    /// Cash removed from the account to outside
    Withdrawal,
    /// Shares purchased with account cash
    Buy,
    /// Shares sold for account cash
    Sell,
}

/// Lifecycle status of a transaction
///
/// `Pending` exists only between construction and the terminal transition;
/// it is never observable through the engine's public surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    /// Created but not yet settled or rejected
    Pending,
    /// Settled; its effects are reflected in balances and holdings
    Completed,
    /// Rejected; it had no effect on balances or holdings
    Failed,
}

/// Immutable audit record of one money operation
///
/// Deposits and withdrawals carry only an amount. Buys and sells carry the
/// symbol, share quantity, and (when the price fetch succeeded) the price
/// per share, with `total_amount = quantity * price_per_share`. Failed
/// trades whose price fetch itself failed carry no price and a zero total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub transaction_id: TransactionId,

    /// Account this transaction belongs to
    pub account_id: AccountId,

    /// Kind of operation recorded
    pub transaction_type: TransactionType,

    /// Cash moved by the operation (requested cash for failed ones)
    pub total_amount: Decimal,

    /// Creation instant (UTC, sub-second precision)
    pub timestamp: DateTime<Utc>,

    /// Ticker symbol; present for trades, absent for funds operations
    pub symbol: Option<String>,

    /// Share quantity; present for trades, absent for funds operations
    pub quantity: Option<u32>,

    /// Execution price per share; present when a price was fetched
    pub price_per_share: Option<Decimal>,

    /// Lifecycle status; terminal before the record leaves the engine
    status: TransactionStatus,

    /// Why the operation was rejected; set only on `Failed` records
    failure_reason: Option<String>,
}

impl Transaction {
    fn pending(
        account_id: AccountId,
        transaction_type: TransactionType,
        total_amount: Decimal,
    ) -> Self {
        Transaction {
            transaction_id: Uuid::new_v4(),
            account_id,
            transaction_type,
            total_amount,
            timestamp: Utc::now(),
            symbol: None,
            quantity: None,
            price_per_share: None,
            status: TransactionStatus::Pending,
            failure_reason: None,
        }
    }

    /// Create a pending deposit record
    pub fn deposit(account_id: AccountId, amount: Decimal) -> Self {
        Self::pending(account_id, TransactionType::Deposit, amount)
    }

    /// Create a pending withdrawal record
    pub fn withdrawal(account_id: AccountId, amount: Decimal) -> Self {
        Self::pending(account_id, TransactionType::Withdrawal, amount)
    }

    /// Create a pending buy record with `total_amount = quantity * price`
    ///
    /// # Errors
    ///
    /// * `InvalidQuantity` - if `quantity` is zero
    /// * `ArithmeticOverflow` - if the checked total exhausts `Decimal`
    pub fn buy(
        account_id: AccountId,
        symbol: &str,
        quantity: u32,
        price_per_share: Decimal,
    ) -> Result<Self, LedgerError> {
        Self::trade(
            account_id,
            TransactionType::Buy,
            symbol,
            quantity,
            price_per_share,
        )
    }

    /// Create a pending sell record with `total_amount = quantity * price`
    ///
    /// # Errors
    ///
    /// * `InvalidQuantity` - if `quantity` is zero
    /// * `ArithmeticOverflow` - if the checked total exhausts `Decimal`
    pub fn sell(
        account_id: AccountId,
        symbol: &str,
        quantity: u32,
        price_per_share: Decimal,
    ) -> Result<Self, LedgerError> {
        Self::trade(
            account_id,
            TransactionType::Sell,
            symbol,
            quantity,
            price_per_share,
        )
    }

    fn trade(
        account_id: AccountId,
        transaction_type: TransactionType,
        symbol: &str,
        quantity: u32,
        price_per_share: Decimal,
    ) -> Result<Self, LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::invalid_quantity(quantity));
        }

        let total_amount = Decimal::from(quantity)
            .checked_mul(price_per_share)
            .ok_or_else(|| LedgerError::arithmetic_overflow("order total", account_id))?;

        let mut tx = Self::pending(account_id, transaction_type, total_amount);
        tx.symbol = Some(symbol.to_string());
        tx.quantity = Some(quantity);
        tx.price_per_share = Some(price_per_share);
        Ok(tx)
    }

    /// Create an already-failed trade record for a rejected order
    ///
    /// Carries whatever was known at failure time: the price is present only
    /// when the fetch succeeded, and the total falls back to zero when no
    /// price (or no representable total) exists.
    pub fn failed_trade(
        account_id: AccountId,
        transaction_type: TransactionType,
        symbol: &str,
        quantity: u32,
        price_per_share: Option<Decimal>,
        reason: &str,
    ) -> Self {
        let total_amount = price_per_share
            .and_then(|price| Decimal::from(quantity).checked_mul(price))
            .unwrap_or(Decimal::ZERO);

        let mut tx = Self::pending(account_id, transaction_type, total_amount);
        tx.symbol = Some(symbol.to_string());
        tx.quantity = Some(quantity);
        tx.price_per_share = price_per_share;
        tx.status = TransactionStatus::Failed;
        tx.failure_reason = Some(reason.to_string());
        tx
    }

    /// Settle a pending transaction
    ///
    /// Consumes the record so the transition can happen at most once; a
    /// record already in a terminal status is returned unchanged.
    pub fn complete(mut self) -> Self {
        if self.status == TransactionStatus::Pending {
            self.status = TransactionStatus::Completed;
        }
        self
    }

    /// Reject a pending transaction, recording why
    ///
    /// Consumes the record so the transition can happen at most once; a
    /// record already in a terminal status is returned unchanged.
    pub fn fail(mut self, reason: &str) -> Self {
        if self.status == TransactionStatus::Pending {
            self.status = TransactionStatus::Failed;
            self.failure_reason = Some(reason.to_string());
        }
        self
    }

    /// Current lifecycle status
    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Rejection reason, set only on failed records
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Whether the record settled successfully
    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }

    /// Whether the record was rejected
    pub fn is_failed(&self) -> bool {
        self.status == TransactionStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deposit_carries_no_trade_fields() {
        let account = Uuid::new_v4();
        let tx = Transaction::deposit(account, dec!(100.00));

        assert_eq!(tx.account_id, account);
        assert_eq!(tx.transaction_type, TransactionType::Deposit);
        assert_eq!(tx.total_amount, dec!(100.00));
        assert_eq!(tx.status(), TransactionStatus::Pending);
        assert!(tx.symbol.is_none());
        assert!(tx.quantity.is_none());
        assert!(tx.price_per_share.is_none());
        assert!(tx.failure_reason().is_none());
    }

    #[test]
    fn test_buy_computes_total_from_quantity_and_price() {
        let tx = Transaction::buy(Uuid::new_v4(), "AAPL", 10, dec!(145.00)).unwrap();

        assert_eq!(tx.transaction_type, TransactionType::Buy);
        assert_eq!(tx.symbol.as_deref(), Some("AAPL"));
        assert_eq!(tx.quantity, Some(10));
        assert_eq!(tx.price_per_share, Some(dec!(145.00)));
        assert_eq!(tx.total_amount, dec!(1450.00));
    }

    #[test]
    fn test_trade_rejects_zero_quantity() {
        let result = Transaction::sell(Uuid::new_v4(), "TSLA", 0, dec!(650.00));
        assert!(matches!(
            result,
            Err(LedgerError::InvalidQuantity { quantity: 0 })
        ));
    }

    #[test]
    fn test_complete_transitions_exactly_once() {
        let tx = Transaction::deposit(Uuid::new_v4(), dec!(50.00)).complete();
        assert_eq!(tx.status(), TransactionStatus::Completed);

        // Terminal status survives a later transition attempt
        let tx = tx.fail("too late");
        assert_eq!(tx.status(), TransactionStatus::Completed);
        assert!(tx.failure_reason().is_none());
    }

    #[test]
    fn test_fail_records_reason() {
        let tx = Transaction::withdrawal(Uuid::new_v4(), dec!(25.00)).fail("insufficient funds");

        assert_eq!(tx.status(), TransactionStatus::Failed);
        assert_eq!(tx.failure_reason(), Some("insufficient funds"));
        assert!(tx.is_failed());
        assert!(!tx.is_completed());

        // Fail is also a one-shot transition
        let tx = tx.complete();
        assert_eq!(tx.status(), TransactionStatus::Failed);
    }

    #[test]
    fn test_failed_trade_without_price_has_zero_total() {
        let tx = Transaction::failed_trade(
            Uuid::new_v4(),
            TransactionType::Buy,
            "GOOGL",
            3,
            None,
            "price unavailable",
        );

        assert_eq!(tx.status(), TransactionStatus::Failed);
        assert_eq!(tx.total_amount, Decimal::ZERO);
        assert_eq!(tx.symbol.as_deref(), Some("GOOGL"));
        assert_eq!(tx.quantity, Some(3));
        assert!(tx.price_per_share.is_none());
        assert_eq!(tx.failure_reason(), Some("price unavailable"));
    }

    #[test]
    fn test_failed_trade_with_price_keeps_requested_total() {
        let tx = Transaction::failed_trade(
            Uuid::new_v4(),
            TransactionType::Buy,
            "AAPL",
            4,
            Some(dec!(145.00)),
            "insufficient funds",
        );

        assert_eq!(tx.total_amount, dec!(580.00));
        assert_eq!(tx.price_per_share, Some(dec!(145.00)));
    }
}
