//! Trading Ledger Engine Library
//! # Overview
//!
//! This library provides a concurrent in-memory ledger for a simulated
//! brokerage: cash deposits and withdrawals, share trading against an async
//! price oracle, portfolio valuation, and a complete audit history of every
//! attempted operation
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Holding, Transaction, etc.)
//! - [`config`] - Engine limits, the supported symbol set, and timeouts
//! - [`core`] - Business logic components:
//!   - [`core::accounts`] - Account registry and per-account exclusive updates
//!   - [`core::funds`] - Deposit and withdrawal service
//!   - [`core::trading`] - Buy and sell service
//!   - [`core::valuation`] - Portfolio valuation and P&L
//!   - [`core::transaction_log`] - Append-only audit record sink
//! - [`pricing`] - Async price oracle trait and reference oracles
//!
//! # Transaction Types
//!
//! The ledger records four transaction types:
//!
//! - **Deposit**: Credit cash to an account
//! - **Withdrawal**: Debit cash from an account (requires sufficient balance)
//! - **Buy**: Exchange cash for shares at the oracle price
//! - **Sell**: Exchange shares for cash at the oracle price
//!
//! Every attempt is recorded: rejected operations append a FAILED record
//! carrying the reason before the typed error propagates to the caller.
//!
//! # Concurrency Model
//!
//! The account is the unit of mutual exclusion. Validation, mutation, and
//! the COMPLETED audit record for one operation all happen while holding
//! that account's entry lock, so operations on the same account serialize
//! while different accounts proceed in parallel. The async price fetch is
//! the only suspension point and always runs outside any lock.

// Module declarations
pub mod config;
pub mod core;
pub mod pricing;
pub mod types;

pub use config::LedgerConfig;
pub use core::{
    AccountRegistry, FundsService, InMemoryTransactionLog, PortfolioValuator, TradingService,
    TransactionSink,
};
pub use pricing::{CachedPriceOracle, FixedPriceOracle, PriceOracle};
pub use types::{
    Account, AccountId, Holding, LedgerError, Transaction, TransactionId, TransactionStatus,
    TransactionType, User, UserId,
};
