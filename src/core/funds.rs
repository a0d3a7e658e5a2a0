//! Cash deposit and withdrawal service
//!
//! # Design
//!
//! Every operation follows the same shape: check the account exists, run
//! the pure validations, then enter the account's exclusive section to
//! mutate the balance and append the COMPLETED audit record. Rejections at
//! any stage append a FAILED record carrying the reason and then propagate
//! the typed error, so the history shows every attempt, not just the ones
//! that settled.
//!
//! The withdrawal balance check runs inside the exclusive section with the
//! balance it will debit, so two racing withdrawals can never both pass
//! validation against the same funds.

use crate::config::LedgerConfig;
use crate::core::accounts::AccountRegistry;
use crate::core::transaction_log::TransactionSink;
use crate::core::validation::FundsValidator;
use crate::types::{AccountId, LedgerError, Transaction, TransactionId};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Deposits, withdrawals, and the per-account transaction history
pub struct FundsService {
    accounts: Arc<AccountRegistry>,
    transactions: Arc<dyn TransactionSink>,
    validator: FundsValidator,
}

impl FundsService {
    /// Create a funds service over shared accounts and a shared sink
    pub fn new(
        config: &LedgerConfig,
        accounts: Arc<AccountRegistry>,
        transactions: Arc<dyn TransactionSink>,
    ) -> Self {
        FundsService {
            accounts,
            transactions,
            validator: FundsValidator::new(config),
        }
    }

    /// Append a FAILED record for a rejected operation and hand the error back
    fn reject(&self, record: Transaction, error: LedgerError) -> LedgerError {
        warn!(
            "{:?} of {} rejected for account {}: {}",
            record.transaction_type, record.total_amount, record.account_id, error
        );
        self.transactions.append(record.fail(&error.to_string()));
        error
    }

    /// Deposit cash into an account
    ///
    /// # Arguments
    ///
    /// * `account_id` - The account to credit
    /// * `amount` - Cash to add, at most two decimal places
    ///
    /// # Returns
    ///
    /// The id of the COMPLETED transaction record.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - no such account; nothing is recorded
    /// * `InvalidAmount` - amount outside the configured range or with
    ///   sub-cent precision; a FAILED record is appended first
    pub fn deposit(
        &self,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<TransactionId, LedgerError> {
        self.accounts.ensure_exists(account_id)?;

        if let Err(error) = self.validator.validate_deposit(amount) {
            return Err(self.reject(Transaction::deposit(account_id, amount), error));
        }

        self.accounts.update(account_id, |state| {
            state
                .account
                .record_deposit(amount)
                .map_err(|error| self.reject(Transaction::deposit(account_id, amount), error))?;

            let record = Transaction::deposit(account_id, amount).complete();
            let transaction_id = record.transaction_id;
            self.transactions.append(record);

            debug!("Deposited {} into account {}", amount, account_id);
            Ok(transaction_id)
        })
    }

    /// Withdraw cash from an account
    ///
    /// The amount and balance checks both run inside the account's
    /// exclusive section, so the checked balance is the one the debit hits.
    ///
    /// # Returns
    ///
    /// The id of the COMPLETED transaction record.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - no such account; nothing is recorded
    /// * `InvalidAmount` - amount outside the configured range or with
    ///   sub-cent precision; a FAILED record is appended first
    /// * `InsufficientFunds` - balance cannot cover the amount; a FAILED
    ///   record is appended first
    pub fn withdraw(
        &self,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<TransactionId, LedgerError> {
        self.accounts.ensure_exists(account_id)?;

        self.accounts.update(account_id, |state| {
            self.validator
                .validate_withdrawal(&state.account, amount)
                .map_err(|error| {
                    self.reject(Transaction::withdrawal(account_id, amount), error)
                })?;

            state
                .account
                .record_withdrawal(amount)
                .map_err(|error| {
                    self.reject(Transaction::withdrawal(account_id, amount), error)
                })?;

            let record = Transaction::withdrawal(account_id, amount).complete();
            let transaction_id = record.transaction_id;
            self.transactions.append(record);

            debug!("Withdrew {} from account {}", amount, account_id);
            Ok(transaction_id)
        })
    }

    /// All transaction records for an account, oldest first
    ///
    /// Includes FAILED records; PENDING never appears because only terminal
    /// records reach the sink.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - no such account
    pub fn get_transaction_history(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.accounts.ensure_exists(account_id)?;
        Ok(self.transactions.list(account_id))
    }
}
