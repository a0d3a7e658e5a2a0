//! Account-related types for the trading ledger engine
//!
//! This module defines the Account structure holding a user's cash position.
//! The balance is private and can only move through guarded operations, so a
//! negative cash balance is unrepresentable no matter which service (or test)
//! drives the entity.

use crate::types::error::LedgerError;
use crate::types::user::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique account identifier (UUID v4)
pub type AccountId = Uuid;

/// Cash account owned by exactly one user
///
/// Represents the current cash state of an account: the spendable balance
/// plus lifetime deposit and withdrawal accumulators used by the P&L
/// calculator. All monetary fields are `Decimal`; the engine never touches
/// floating point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier
    pub account_id: AccountId,

    /// Identifier of the owning user
    pub user_id: UserId,

    /// Spendable cash balance
    ///
    /// Never negative. Mutated only through the guarded operations below;
    /// any change that would take it below zero is rejected with
    /// `NegativeBalanceRejected`.
    cash_balance: Decimal,

    /// Lifetime sum of completed deposits
    total_deposits: Decimal,

    /// Lifetime sum of completed withdrawals
    total_withdrawals: Decimal,

    /// Creation instant (UTC)
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a zero balance
    ///
    /// # Arguments
    ///
    /// * `user_id` - The owning user's identifier
    pub fn new(user_id: UserId) -> Self {
        Account {
            account_id: Uuid::new_v4(),
            user_id,
            cash_balance: Decimal::ZERO,
            total_deposits: Decimal::ZERO,
            total_withdrawals: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Current spendable cash balance
    pub fn cash_balance(&self) -> Decimal {
        self.cash_balance
    }

    /// Lifetime sum of completed deposits
    pub fn total_deposits(&self) -> Decimal {
        self.total_deposits
    }

    /// Lifetime sum of completed withdrawals
    pub fn total_withdrawals(&self) -> Decimal {
        self.total_withdrawals
    }

    /// Whether the balance covers a debit of `amount`
    pub fn can_withdraw(&self, amount: Decimal) -> bool {
        self.cash_balance >= amount
    }

    /// Balance after applying a signed change, without mutating
    ///
    /// # Errors
    ///
    /// * `ArithmeticOverflow` - if the checked addition exhausts `Decimal`
    /// * `NegativeBalanceRejected` - if the result would be negative
    fn balance_after(&self, change: Decimal) -> Result<Decimal, LedgerError> {
        let next = self
            .cash_balance
            .checked_add(change)
            .ok_or_else(|| LedgerError::arithmetic_overflow("balance update", self.account_id))?;

        if next < Decimal::ZERO {
            return Err(LedgerError::negative_balance_rejected(
                self.account_id,
                self.cash_balance,
                change,
            ));
        }

        Ok(next)
    }

    /// Apply a signed balance change (positive credits, negative debits)
    ///
    /// This is the single guarded mutation path for the cash balance. It is
    /// used directly by trades, which move cash without touching the
    /// deposit/withdrawal accumulators.
    ///
    /// # Errors
    ///
    /// * `NegativeBalanceRejected` - the change would produce a negative balance
    /// * `ArithmeticOverflow` - checked arithmetic exhausted
    pub fn apply_balance_change(&mut self, change: Decimal) -> Result<(), LedgerError> {
        self.cash_balance = self.balance_after(change)?;
        Ok(())
    }

    /// Credit a completed deposit: balance and lifetime accumulator together
    ///
    /// Both new values are computed before either field is assigned, so a
    /// failure leaves the account untouched.
    ///
    /// # Errors
    ///
    /// * `ArithmeticOverflow` - checked arithmetic exhausted
    pub fn record_deposit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        let balance = self.balance_after(amount)?;
        let deposits = self
            .total_deposits
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("deposit total", self.account_id))?;

        self.cash_balance = balance;
        self.total_deposits = deposits;
        Ok(())
    }

    /// Debit a completed withdrawal: balance and lifetime accumulator together
    ///
    /// # Errors
    ///
    /// * `NegativeBalanceRejected` - the balance cannot cover the amount
    /// * `ArithmeticOverflow` - checked arithmetic exhausted
    pub fn record_withdrawal(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        let balance = self.balance_after(-amount)?;
        let withdrawals = self
            .total_withdrawals
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("withdrawal total", self.account_id))?;

        self.cash_balance = balance;
        self.total_withdrawals = withdrawals;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn test_account() -> Account {
        Account::new(Uuid::new_v4())
    }

    #[test]
    fn test_new_account_starts_empty() {
        let account = test_account();
        assert_eq!(account.cash_balance(), Decimal::ZERO);
        assert_eq!(account.total_deposits(), Decimal::ZERO);
        assert_eq!(account.total_withdrawals(), Decimal::ZERO);
    }

    #[test]
    fn test_record_deposit_updates_balance_and_accumulator() {
        let mut account = test_account();
        account.record_deposit(dec!(100.00)).unwrap();
        account.record_deposit(dec!(50.25)).unwrap();

        assert_eq!(account.cash_balance(), dec!(150.25));
        assert_eq!(account.total_deposits(), dec!(150.25));
        assert_eq!(account.total_withdrawals(), Decimal::ZERO);
    }

    #[test]
    fn test_record_withdrawal_updates_balance_and_accumulator() {
        let mut account = test_account();
        account.record_deposit(dec!(100.00)).unwrap();
        account.record_withdrawal(dec!(40.00)).unwrap();

        assert_eq!(account.cash_balance(), dec!(60.00));
        assert_eq!(account.total_deposits(), dec!(100.00));
        assert_eq!(account.total_withdrawals(), dec!(40.00));
    }

    #[test]
    fn test_deposit_withdraw_round_trip_restores_balance() {
        let mut account = test_account();
        account.record_deposit(dec!(100.00)).unwrap();
        account.record_withdrawal(dec!(100.00)).unwrap();

        assert_eq!(account.cash_balance(), Decimal::ZERO);
        // Lifetime accumulators keep the full history
        assert_eq!(account.total_deposits(), dec!(100.00));
        assert_eq!(account.total_withdrawals(), dec!(100.00));
    }

    #[test]
    fn test_overdraft_rejected_with_context() {
        let mut account = test_account();
        account.record_deposit(dec!(10.00)).unwrap();

        let result = account.record_withdrawal(dec!(20.00));
        match result {
            Err(LedgerError::NegativeBalanceRejected {
                account: id,
                balance,
                change,
            }) => {
                assert_eq!(id, account.account_id);
                assert_eq!(balance, dec!(10.00));
                assert_eq!(change, dec!(-20.00));
            }
            other => panic!("Expected NegativeBalanceRejected, got {:?}", other),
        }

        // The failed debit left the account untouched
        assert_eq!(account.cash_balance(), dec!(10.00));
        assert_eq!(account.total_withdrawals(), Decimal::ZERO);
    }

    #[test]
    fn test_apply_balance_change_moves_cash_without_accumulators() {
        let mut account = test_account();
        account.record_deposit(dec!(500.00)).unwrap();

        // A buy debits cash directly
        account.apply_balance_change(dec!(-145.00)).unwrap();
        assert_eq!(account.cash_balance(), dec!(355.00));
        assert_eq!(account.total_deposits(), dec!(500.00));
        assert_eq!(account.total_withdrawals(), Decimal::ZERO);

        // A sell credits cash directly
        account.apply_balance_change(dec!(145.00)).unwrap();
        assert_eq!(account.cash_balance(), dec!(500.00));
    }

    #[rstest]
    #[case::exact_balance(dec!(100.00), dec!(100.00), true)]
    #[case::below_balance(dec!(100.00), dec!(99.99), true)]
    #[case::above_balance(dec!(100.00), dec!(100.01), false)]
    #[case::empty_account(dec!(0.00), dec!(0.01), false)]
    fn test_can_withdraw(
        #[case] balance: Decimal,
        #[case] requested: Decimal,
        #[case] expected: bool,
    ) {
        let mut account = test_account();
        if balance > Decimal::ZERO {
            account.record_deposit(balance).unwrap();
        }
        assert_eq!(account.can_withdraw(requested), expected);
    }
}
