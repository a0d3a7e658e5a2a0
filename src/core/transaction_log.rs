//! Transaction sink and in-memory audit log
//!
//! This module defines the `TransactionSink` interface behind which the
//! engine persists its audit trail, plus the in-memory reference
//! implementation used by tests and demos.
//!
//! # Design
//!
//! The sink is deliberately synchronous: services append while holding an
//! account's entry lock, and the price oracle is supposed to stay the only
//! suspension point in the engine. Persistence that needs I/O belongs in an
//! implementation that buffers internally.
//!
//! # Purpose
//!
//! Every requested money operation leaves exactly one terminal record here,
//! completed or failed. The log is append-only; a record is never modified
//! after `append`.
//!
//! # Thread Safety
//!
//! `InMemoryTransactionLog` keys records by account in a `DashMap`, so
//! appends for different accounts do not contend. Appends for one account
//! happen under that account's registry lock, which makes the per-account
//! record order the serialization order of the operations themselves.

use crate::types::{AccountId, Transaction};
use dashmap::DashMap;

/// Ordered, append-only destination for terminal transaction records
pub trait TransactionSink: Send + Sync {
    /// Append a terminal (completed or failed) transaction record
    fn append(&self, transaction: Transaction);

    /// All records for an account in ascending timestamp order
    ///
    /// Unknown accounts yield an empty list; the sink does not track which
    /// accounts exist.
    fn list(&self, account_id: AccountId) -> Vec<Transaction>;
}

/// In-memory reference implementation of the transaction sink
#[derive(Debug, Default)]
pub struct InMemoryTransactionLog {
    /// Records per account, in append order
    transactions: DashMap<AccountId, Vec<Transaction>>,
}

impl InMemoryTransactionLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionSink for InMemoryTransactionLog {
    fn append(&self, transaction: Transaction) {
        self.transactions
            .entry(transaction.account_id)
            .or_insert_with(Vec::new)
            .push(transaction);
    }

    fn list(&self, account_id: AccountId) -> Vec<Transaction> {
        let mut records = self
            .transactions
            .get(&account_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        // Stable sort: records with equal timestamps keep their append order
        records.sort_by_key(|tx| tx.timestamp);
        records
    }
}
