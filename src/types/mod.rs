//! Types module
//!
//! Contains core data structures used throughout the engine.
//! This module organizes types into logical submodules:
//! - `account`: Account entity and identifier
//! - `holding`: Per-symbol position entity
//! - `transaction`: Audit-record entity, type/status enums, identifiers
//! - `user`: User identity entity
//! - `error`: Error types for the ledger engine

pub mod account;
pub mod error;
pub mod holding;
pub mod transaction;
pub mod user;

pub use account::{Account, AccountId};
pub use error::LedgerError;
pub use holding::Holding;
pub use transaction::{Transaction, TransactionId, TransactionStatus, TransactionType};
pub use user::{User, UserId, UserStatus};
