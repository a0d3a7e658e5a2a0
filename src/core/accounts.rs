//! Thread-safe account registry
//!
//! This module provides the `AccountRegistry`, which owns every account's
//! cash balance and holdings using concurrent data structures so services on
//! different tasks can operate on different accounts at the same time.
//!
//! # Design
//!
//! The registry keeps one `AccountState` (the account plus its holdings) per
//! entry in a `DashMap`. The map entry is the unit of mutual exclusion: the
//! `update` method runs a closure while holding the entry's exclusive lock,
//! which is how a service makes its validate + mutate + record sequence
//! atomic for one account without any global lock. The paired
//! balance-and-holding mutations of a trade live on `AccountState` itself,
//! so no caller can debit cash without the matching holding update.
//!
//! # Thread Safety
//!
//! All operations are thread-safe through DashMap's internal sharding.
//! Operations on different accounts do not block each other; operations on
//! the same account serialize on the entry lock. Snapshot reads clone the
//! entry under its lock, so a reader never observes a trade's cash movement
//! without its holding movement.

use crate::types::{Account, AccountId, Holding, LedgerError, UserId};
use dashmap::DashMap;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// One account's complete ledger state: cash plus holdings
///
/// The holdings map is private so positions can only move through the
/// paired-trade operations below, which keep the invariant that a stored
/// holding always has a positive quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountState {
    /// The cash account
    pub account: Account,
    /// Holdings keyed by symbol; entries are removed when emptied
    holdings: HashMap<String, Holding>,
}

impl AccountState {
    /// Wrap a fresh account with no holdings
    pub fn new(account: Account) -> Self {
        AccountState {
            account,
            holdings: HashMap::new(),
        }
    }

    /// The position in `symbol`, if any shares are held
    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.get(symbol)
    }

    /// Shares held in `symbol` (zero when no position exists)
    pub fn held_quantity(&self, symbol: &str) -> u32 {
        self.holdings.get(symbol).map_or(0, |h| h.quantity())
    }

    /// All positions, sorted by symbol for deterministic output
    pub fn holdings(&self) -> Vec<Holding> {
        let mut holdings: Vec<Holding> = self.holdings.values().cloned().collect();
        holdings.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        holdings
    }

    /// Apply a buy: debit `quantity * price` and grow the position
    ///
    /// The post-trade holding is computed before anything is assigned, so a
    /// failure leaves both the balance and the holdings untouched.
    ///
    /// # Errors
    ///
    /// * `NegativeBalanceRejected` - the balance cannot cover the cost
    /// * `InvalidQuantity` - zero shares
    /// * `ArithmeticOverflow` - checked arithmetic exhausted
    pub fn apply_buy(
        &mut self,
        symbol: &str,
        quantity: u32,
        price: Decimal,
    ) -> Result<(), LedgerError> {
        let cost = Decimal::from(quantity)
            .checked_mul(price)
            .ok_or_else(|| LedgerError::arithmetic_overflow("buy cost", self.account.account_id))?;

        let updated = match self.holdings.get(symbol) {
            Some(holding) => {
                let mut next = holding.clone();
                next.add_shares(quantity, price)?;
                next
            }
            None => Holding::new(self.account.account_id, symbol, quantity, price)?,
        };

        self.account.apply_balance_change(-cost)?;
        self.holdings.insert(symbol.to_string(), updated);
        Ok(())
    }

    /// Apply a sell: credit `quantity * price` and shrink the position
    ///
    /// A position emptied by the sale is removed; zero-quantity holdings are
    /// never stored.
    ///
    /// # Errors
    ///
    /// * `InsufficientHoldings` - fewer shares held than requested
    /// * `InvalidQuantity` - zero shares
    /// * `ArithmeticOverflow` - checked arithmetic exhausted
    pub fn apply_sell(
        &mut self,
        symbol: &str,
        quantity: u32,
        price: Decimal,
    ) -> Result<(), LedgerError> {
        let proceeds = Decimal::from(quantity).checked_mul(price).ok_or_else(|| {
            LedgerError::arithmetic_overflow("sale proceeds", self.account.account_id)
        })?;

        let mut updated = self.holdings.get(symbol).cloned().ok_or_else(|| {
            LedgerError::insufficient_holdings(self.account.account_id, symbol, 0, quantity)
        })?;
        updated.remove_shares(quantity)?;

        self.account.apply_balance_change(proceeds)?;
        if updated.quantity() == 0 {
            self.holdings.remove(symbol);
        } else {
            self.holdings.insert(symbol.to_string(), updated);
        }
        Ok(())
    }
}

/// Consistent point-in-time view of one account and its holdings
///
/// Taken under the account's entry lock, so the cash and holding figures
/// always belong to the same instant.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSnapshot {
    /// The cash account at the snapshot instant
    pub account: Account,
    /// Positions at the snapshot instant, sorted by symbol
    pub holdings: Vec<Holding>,
}

/// Thread-safe registry of all accounts and their holdings
///
/// Accounts are opened explicitly (one per user) rather than created on
/// demand; every operation on an unknown account fails with
/// `AccountNotFound`.
///
/// # Thread Safety
///
/// All methods are safe to call from multiple threads concurrently. The
/// internal `DashMap` ensures that:
/// - Operations on different accounts don't block each other
/// - Operations on the same account are properly serialized
/// - Snapshot reads are internally consistent
#[derive(Debug, Default)]
pub struct AccountRegistry {
    /// Account state by account ID; the entry is the unit of mutual exclusion
    accounts: DashMap<AccountId, AccountState>,

    /// Index enforcing one account per user
    accounts_by_user: DashMap<UserId, AccountId>,
}

impl AccountRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the account for a user
    ///
    /// Each user owns exactly one account. When two opens race for the same
    /// user, the user-index entry lock decides the winner and the loser gets
    /// `AccountAlreadyExists`.
    ///
    /// # Errors
    ///
    /// * `AccountAlreadyExists` - the user already owns an account
    pub fn open_account(&self, user_id: UserId) -> Result<Account, LedgerError> {
        let mut opened = None;
        self.accounts_by_user.entry(user_id).or_insert_with(|| {
            let account = Account::new(user_id);
            let account_id = account.account_id;
            self.accounts
                .insert(account_id, AccountState::new(account.clone()));
            opened = Some(account);
            account_id
        });

        match opened {
            Some(account) => {
                debug!(
                    "Opened account {} for user {}",
                    account.account_id, user_id
                );
                Ok(account)
            }
            None => Err(LedgerError::account_already_exists(user_id)),
        }
    }

    /// Snapshot of the account's cash state
    pub fn get(&self, account_id: AccountId) -> Option<Account> {
        self.accounts
            .get(&account_id)
            .map(|entry| entry.account.clone())
    }

    /// The account owned by a user, if one has been opened
    pub fn account_for_user(&self, user_id: UserId) -> Option<AccountId> {
        self.accounts_by_user.get(&user_id).map(|entry| *entry)
    }

    /// Fail with `AccountNotFound` unless the account exists
    pub fn ensure_exists(&self, account_id: AccountId) -> Result<(), LedgerError> {
        if self.accounts.contains_key(&account_id) {
            Ok(())
        } else {
            Err(LedgerError::account_not_found(account_id))
        }
    }

    /// Run a closure with exclusive access to one account's state
    ///
    /// The closure executes while holding the entry's lock; no other thread
    /// can read or modify the account until it returns. This is the
    /// exclusive section in which services validate, mutate, and record.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - no account registered under `account_id`
    /// * Any error returned by the closure
    pub fn update<T, F>(&self, account_id: AccountId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut AccountState) -> Result<T, LedgerError>,
    {
        match self.accounts.get_mut(&account_id) {
            Some(mut entry) => f(entry.value_mut()),
            None => Err(LedgerError::account_not_found(account_id)),
        }
    }

    /// Consistent snapshot of the account and all its holdings
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - no account registered under `account_id`
    pub fn snapshot(&self, account_id: AccountId) -> Result<AccountSnapshot, LedgerError> {
        match self.accounts.get(&account_id) {
            Some(entry) => Ok(AccountSnapshot {
                account: entry.account.clone(),
                holdings: entry.holdings(),
            }),
            None => Err(LedgerError::account_not_found(account_id)),
        }
    }

    /// All positions of an account, sorted by symbol
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - no account registered under `account_id`
    pub fn holdings(&self, account_id: AccountId) -> Result<Vec<Holding>, LedgerError> {
        match self.accounts.get(&account_id) {
            Some(entry) => Ok(entry.holdings()),
            None => Err(LedgerError::account_not_found(account_id)),
        }
    }

    /// One position of an account, if it exists
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - no account registered under `account_id`
    pub fn holding(
        &self,
        account_id: AccountId,
        symbol: &str,
    ) -> Result<Option<Holding>, LedgerError> {
        match self.accounts.get(&account_id) {
            Some(entry) => Ok(entry.holding(symbol).cloned()),
            None => Err(LedgerError::account_not_found(account_id)),
        }
    }
}
