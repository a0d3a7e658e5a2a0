//! Pure validation layer
//!
//! Validators answer one question and never mutate anything: is this
//! operation acceptable against the configured rules and the given state?
//! Services call them before (and, for balance checks, inside) the
//! account's exclusive section and turn any rejection into a FAILED audit
//! record plus a typed error.

use crate::config::LedgerConfig;
use crate::core::accounts::AccountState;
use crate::types::{Account, LedgerError};
use rust_decimal::Decimal;

/// Monetary amounts carry at most two decimal places
fn has_cent_precision(amount: Decimal) -> bool {
    amount.normalize().scale() <= 2
}

/// Range and precision rules for deposits and withdrawals
#[derive(Debug, Clone)]
pub struct FundsValidator {
    min_deposit: Decimal,
    max_deposit: Decimal,
    min_withdrawal: Decimal,
    max_withdrawal: Decimal,
}

impl FundsValidator {
    /// Bind a validator to the configured limits
    pub fn new(config: &LedgerConfig) -> Self {
        FundsValidator {
            min_deposit: config.min_deposit,
            max_deposit: config.max_deposit,
            min_withdrawal: config.min_withdrawal,
            max_withdrawal: config.max_withdrawal,
        }
    }

    fn check_amount(amount: Decimal, min: Decimal, max: Decimal) -> Result<(), LedgerError> {
        if amount < min || amount > max || !has_cent_precision(amount) {
            return Err(LedgerError::invalid_amount(amount, min, max));
        }
        Ok(())
    }

    /// Check a deposit amount against the configured range and precision
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` - out of range or more than two decimal places
    pub fn validate_deposit(&self, amount: Decimal) -> Result<(), LedgerError> {
        Self::check_amount(amount, self.min_deposit, self.max_deposit)
    }

    /// Check a withdrawal amount and the account's ability to cover it
    ///
    /// The balance check also runs here when called inside the account's
    /// exclusive section, so check-and-debit is one atomic step.
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` - out of range or more than two decimal places
    /// * `InsufficientFunds` - the balance cannot cover the amount
    pub fn validate_withdrawal(
        &self,
        account: &Account,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        Self::check_amount(amount, self.min_withdrawal, self.max_withdrawal)?;

        if !account.can_withdraw(amount) {
            return Err(LedgerError::insufficient_funds(
                account.account_id,
                account.cash_balance(),
                amount,
            ));
        }
        Ok(())
    }
}

/// Symbol, quantity, affordability and holdings rules for orders
#[derive(Debug, Clone)]
pub struct TradingValidator {
    supported_symbols: Vec<String>,
}

impl TradingValidator {
    /// Bind a validator to the configured symbol set
    pub fn new(config: &LedgerConfig) -> Self {
        TradingValidator {
            supported_symbols: config.supported_symbols.clone(),
        }
    }

    /// Check the static parts of an order: symbol membership and quantity
    ///
    /// Runs before any price fetch, so an unsupported symbol is reported as
    /// `UnsupportedSymbol` rather than a pricing failure.
    ///
    /// # Errors
    ///
    /// * `UnsupportedSymbol` - symbol not in the supported set
    /// * `InvalidQuantity` - zero shares
    pub fn validate_order(&self, symbol: &str, quantity: u32) -> Result<(), LedgerError> {
        if !self.supported_symbols.iter().any(|s| s == symbol) {
            return Err(LedgerError::unsupported_symbol(symbol));
        }
        if quantity == 0 {
            return Err(LedgerError::invalid_quantity(quantity));
        }
        Ok(())
    }

    /// Check that the account can afford `quantity * price`
    ///
    /// Called inside the account's exclusive section with the already
    /// fetched price, so the checked balance is the one the debit hits.
    ///
    /// # Errors
    ///
    /// * `InsufficientFunds` - the balance cannot cover the cost
    /// * `ArithmeticOverflow` - the checked cost exhausts `Decimal`
    pub fn validate_buy(
        &self,
        account: &Account,
        quantity: u32,
        price: Decimal,
    ) -> Result<(), LedgerError> {
        let cost = Decimal::from(quantity)
            .checked_mul(price)
            .ok_or_else(|| LedgerError::arithmetic_overflow("order total", account.account_id))?;

        if account.cash_balance() < cost {
            return Err(LedgerError::insufficient_funds(
                account.account_id,
                account.cash_balance(),
                cost,
            ));
        }
        Ok(())
    }

    /// Check that the position covers a sale of `quantity` shares
    ///
    /// # Errors
    ///
    /// * `InsufficientHoldings` - fewer shares held than requested
    pub fn validate_sell(
        &self,
        state: &AccountState,
        symbol: &str,
        quantity: u32,
    ) -> Result<(), LedgerError> {
        let held = state.held_quantity(symbol);
        if held < quantity {
            return Err(LedgerError::insufficient_holdings(
                state.account.account_id,
                symbol,
                held,
                quantity,
            ));
        }
        Ok(())
    }
}
