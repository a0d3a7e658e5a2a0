//! Error types for the trading ledger engine
//!
//! This module defines all error types that can occur while operating on the
//! ledger. Every failed money operation surfaces one of these variants, and
//! the same display string is recorded as the `failure_reason` of the FAILED
//! audit transaction written for the attempt.
//!
//! # Error Categories
//!
//! - **Validation Errors**: amount out of range, unsupported symbol, zero quantity
//! - **Balance Errors**: insufficient funds or holdings, negative-balance guard
//! - **Pricing Errors**: oracle failure or timeout
//! - **Registry Errors**: unknown account, duplicate account for a user
//! - **Arithmetic Errors**: checked decimal arithmetic exhausted

use crate::types::account::AccountId;
use crate::types::user::UserId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger engine
///
/// This enum represents all possible errors that can occur during ledger
/// operations. Each variant includes relevant context to help diagnose and
/// resolve the issue, and the display string doubles as the audit-trail
/// failure reason.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Amount fails the configured range or precision rules
    ///
    /// Deposits and withdrawals must fall within the configured limits and
    /// carry at most two decimal places. This is a recoverable error - the
    /// operation is rejected and the account state remains unchanged.
    #[error("Invalid amount {amount}: must be between {min} and {max} with at most 2 decimal places")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
        /// Lower bound of the valid range (inclusive)
        min: Decimal,
        /// Upper bound of the valid range (inclusive)
        max: Decimal,
    },

    /// Cash balance cannot cover the requested debit
    ///
    /// This is a recoverable error - the withdrawal or buy is rejected
    /// and the account state remains unchanged.
    #[error(
        "Insufficient funds for account {account}: available {available}, requested {requested}"
    )]
    InsufficientFunds {
        /// Account identifier
        account: AccountId,
        /// Available cash balance
        available: Decimal,
        /// Requested debit amount
        requested: Decimal,
    },

    /// Held share quantity cannot cover the requested sale
    ///
    /// This is a recoverable error - the sell is rejected and the holding
    /// remains unchanged.
    #[error("Insufficient holdings of {symbol} for account {account}: held {held}, requested {requested}")]
    InsufficientHoldings {
        /// Account identifier
        account: AccountId,
        /// Ticker symbol of the holding
        symbol: String,
        /// Shares currently held
        held: u32,
        /// Shares requested for sale
        requested: u32,
    },

    /// Symbol is not in the supported trading set
    ///
    /// This is a recoverable error - the order is rejected before any
    /// price lookup takes place.
    #[error("Unsupported symbol '{symbol}'")]
    UnsupportedSymbol {
        /// The rejected ticker symbol
        symbol: String,
    },

    /// Share quantity must be a positive integer
    ///
    /// This is a recoverable error - the order is rejected.
    #[error("Invalid quantity {quantity}: must be a positive number of shares")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: u32,
    },

    /// Price oracle failed to produce a quote
    ///
    /// Covers provider errors and elapsed timeouts. This is a recoverable
    /// error - the order is rejected and the account state remains unchanged.
    #[error("Price unavailable for {symbol}: {reason}")]
    PriceUnavailable {
        /// Symbol whose price was requested
        symbol: String,
        /// Provider failure or timeout description
        reason: String,
    },

    /// Balance change would drive the cash balance below zero
    ///
    /// Entity-level guard that holds even when a caller bypasses the
    /// validators. This is a recoverable error - the mutation is rejected.
    #[error("Negative balance rejected for account {account}: balance {balance}, change {change}")]
    NegativeBalanceRejected {
        /// Account identifier
        account: AccountId,
        /// Balance before the rejected change
        balance: Decimal,
        /// The rejected signed change
        change: Decimal,
    },

    /// No account registered under the given identifier
    ///
    /// This is a recoverable error. No audit record is written because
    /// there is no account to own it.
    #[error("Account {account} not found")]
    AccountNotFound {
        /// The unknown account identifier
        account: AccountId,
    },

    /// The user already owns an account
    ///
    /// Each user owns exactly one account. This is a recoverable error -
    /// the second open attempt is rejected.
    #[error("Account already exists for user {user}")]
    AccountAlreadyExists {
        /// Owning user identifier
        user: UserId,
    },

    /// Checked decimal arithmetic exhausted its range
    ///
    /// This is a recoverable error - the operation is rejected to keep the
    /// account consistent.
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account identifier
        account: AccountId,
    },
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, min: Decimal, max: Decimal) -> Self {
        LedgerError::InvalidAmount { amount, min, max }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account,
            available,
            requested,
        }
    }

    /// Create an InsufficientHoldings error
    pub fn insufficient_holdings(
        account: AccountId,
        symbol: &str,
        held: u32,
        requested: u32,
    ) -> Self {
        LedgerError::InsufficientHoldings {
            account,
            symbol: symbol.to_string(),
            held,
            requested,
        }
    }

    /// Create an UnsupportedSymbol error
    pub fn unsupported_symbol(symbol: &str) -> Self {
        LedgerError::UnsupportedSymbol {
            symbol: symbol.to_string(),
        }
    }

    /// Create an InvalidQuantity error
    pub fn invalid_quantity(quantity: u32) -> Self {
        LedgerError::InvalidQuantity { quantity }
    }

    /// Create a PriceUnavailable error
    pub fn price_unavailable(symbol: &str, reason: &str) -> Self {
        LedgerError::PriceUnavailable {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a NegativeBalanceRejected error
    pub fn negative_balance_rejected(account: AccountId, balance: Decimal, change: Decimal) -> Self {
        LedgerError::NegativeBalanceRejected {
            account,
            balance,
            change,
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(account: AccountId) -> Self {
        LedgerError::AccountNotFound { account }
    }

    /// Create an AccountAlreadyExists error
    pub fn account_already_exists(user: UserId) -> Self {
        LedgerError::AccountAlreadyExists { user }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }
}
