//! Core ledger logic module
//!
//! This module contains the core ledger components:
//! - `accounts` - Account registry, per-account state, and exclusive updates
//! - `validation` - Pure validators for funds and trading rules
//! - `funds` - Deposit and withdrawal service
//! - `trading` - Buy and sell service against oracle prices
//! - `valuation` - Read-only portfolio valuation and P&L
//! - `transaction_log` - Append-only audit record sink

pub mod accounts;
pub mod funds;
pub mod trading;
pub mod transaction_log;
pub mod validation;
pub mod valuation;

pub use accounts::{AccountRegistry, AccountSnapshot, AccountState};
pub use funds::FundsService;
pub use trading::TradingService;
pub use transaction_log::{InMemoryTransactionLog, TransactionSink};
pub use validation::{FundsValidator, TradingValidator};
pub use valuation::{realized_pnl, HoldingValue, PortfolioValuator};
