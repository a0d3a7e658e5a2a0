//! Share buy and sell service
//!
//! # Design
//!
//! Orders run in three stages. The static checks (symbol membership,
//! quantity) run first so a bad order never reaches the price oracle. The
//! price fetch runs next, outside any lock, because the oracle is async
//! and entry guards must not be held across an await. The fetched price
//! then travels into the account's exclusive section, where affordability
//! and holdings checks, the balance and position mutation, and the
//! COMPLETED audit record all happen against the same state.
//!
//! Rejections at every stage append a FAILED record before the typed
//! error propagates. Records for orders rejected before a price existed
//! carry no price and a zero total.

use crate::config::LedgerConfig;
use crate::core::accounts::AccountRegistry;
use crate::core::transaction_log::TransactionSink;
use crate::core::validation::TradingValidator;
use crate::pricing::{fetch_price_with_timeout, PriceOracle};
use crate::types::{AccountId, Holding, LedgerError, Transaction, TransactionId, TransactionType};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

/// Buys, sells, and position lookups against live oracle prices
pub struct TradingService {
    accounts: Arc<AccountRegistry>,
    transactions: Arc<dyn TransactionSink>,
    oracle: Arc<dyn PriceOracle>,
    validator: TradingValidator,
    price_timeout: Duration,
}

impl TradingService {
    /// Create a trading service over shared accounts, sink, and oracle
    pub fn new(
        config: &LedgerConfig,
        accounts: Arc<AccountRegistry>,
        transactions: Arc<dyn TransactionSink>,
        oracle: Arc<dyn PriceOracle>,
    ) -> Self {
        TradingService {
            accounts,
            transactions,
            oracle,
            validator: TradingValidator::new(config),
            price_timeout: config.price_timeout,
        }
    }

    /// Append a FAILED record for a rejected order and hand the error back
    fn reject(
        &self,
        account_id: AccountId,
        transaction_type: TransactionType,
        symbol: &str,
        quantity: u32,
        price_per_share: Option<Decimal>,
        error: LedgerError,
    ) -> LedgerError {
        warn!(
            "{:?} of {} {} rejected for account {}: {}",
            transaction_type, quantity, symbol, account_id, error
        );
        self.transactions.append(Transaction::failed_trade(
            account_id,
            transaction_type,
            symbol,
            quantity,
            price_per_share,
            &error.to_string(),
        ));
        error
    }

    /// Buy shares at the oracle's current price
    ///
    /// # Arguments
    ///
    /// * `account_id` - The buying account
    /// * `symbol` - Ticker symbol, must be in the supported set
    /// * `quantity` - Whole shares to buy, must be positive
    ///
    /// # Returns
    ///
    /// The id of the COMPLETED transaction record.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - no such account; nothing is recorded
    /// * `UnsupportedSymbol` / `InvalidQuantity` - static order checks; a
    ///   FAILED record without a price is appended first
    /// * `PriceUnavailable` - oracle failure or timeout; a FAILED record
    ///   without a price is appended first
    /// * `InsufficientFunds` - cost exceeds the balance; a FAILED record
    ///   with the fetched price is appended first
    pub async fn buy_shares(
        &self,
        account_id: AccountId,
        symbol: &str,
        quantity: u32,
    ) -> Result<TransactionId, LedgerError> {
        self.accounts.ensure_exists(account_id)?;

        if let Err(error) = self.validator.validate_order(symbol, quantity) {
            return Err(self.reject(account_id, TransactionType::Buy, symbol, quantity, None, error));
        }

        let price = match fetch_price_with_timeout(&*self.oracle, symbol, self.price_timeout).await
        {
            Ok(price) => price,
            Err(error) => {
                return Err(self.reject(
                    account_id,
                    TransactionType::Buy,
                    symbol,
                    quantity,
                    None,
                    error,
                ))
            }
        };

        self.accounts.update(account_id, |state| {
            self.validator
                .validate_buy(&state.account, quantity, price)
                .map_err(|error| {
                    self.reject(account_id, TransactionType::Buy, symbol, quantity, Some(price), error)
                })?;

            // Build the record before mutating, so a construction failure
            // cannot leave a half-applied trade behind
            let record = Transaction::buy(account_id, symbol, quantity, price).map_err(|error| {
                self.reject(account_id, TransactionType::Buy, symbol, quantity, Some(price), error)
            })?;

            state.apply_buy(symbol, quantity, price).map_err(|error| {
                self.reject(account_id, TransactionType::Buy, symbol, quantity, Some(price), error)
            })?;

            let record = record.complete();
            let transaction_id = record.transaction_id;
            self.transactions.append(record);

            debug!(
                "Bought {} {} at {} for account {}",
                quantity, symbol, price, account_id
            );
            Ok(transaction_id)
        })
    }

    /// Sell shares at the oracle's current price
    ///
    /// The cost basis of the remaining position is unchanged by a sale;
    /// selling the whole position removes it.
    ///
    /// # Returns
    ///
    /// The id of the COMPLETED transaction record.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - no such account; nothing is recorded
    /// * `UnsupportedSymbol` / `InvalidQuantity` - static order checks; a
    ///   FAILED record without a price is appended first
    /// * `PriceUnavailable` - oracle failure or timeout; a FAILED record
    ///   without a price is appended first
    /// * `InsufficientHoldings` - fewer shares held than requested; a
    ///   FAILED record with the fetched price is appended first
    pub async fn sell_shares(
        &self,
        account_id: AccountId,
        symbol: &str,
        quantity: u32,
    ) -> Result<TransactionId, LedgerError> {
        self.accounts.ensure_exists(account_id)?;

        if let Err(error) = self.validator.validate_order(symbol, quantity) {
            return Err(self.reject(
                account_id,
                TransactionType::Sell,
                symbol,
                quantity,
                None,
                error,
            ));
        }

        let price = match fetch_price_with_timeout(&*self.oracle, symbol, self.price_timeout).await
        {
            Ok(price) => price,
            Err(error) => {
                return Err(self.reject(
                    account_id,
                    TransactionType::Sell,
                    symbol,
                    quantity,
                    None,
                    error,
                ))
            }
        };

        self.accounts.update(account_id, |state| {
            self.validator
                .validate_sell(state, symbol, quantity)
                .map_err(|error| {
                    self.reject(account_id, TransactionType::Sell, symbol, quantity, Some(price), error)
                })?;

            let record = Transaction::sell(account_id, symbol, quantity, price).map_err(|error| {
                self.reject(account_id, TransactionType::Sell, symbol, quantity, Some(price), error)
            })?;

            state.apply_sell(symbol, quantity, price).map_err(|error| {
                self.reject(account_id, TransactionType::Sell, symbol, quantity, Some(price), error)
            })?;

            let record = record.complete();
            let transaction_id = record.transaction_id;
            self.transactions.append(record);

            debug!(
                "Sold {} {} at {} for account {}",
                quantity, symbol, price, account_id
            );
            Ok(transaction_id)
        })
    }

    /// All positions of an account, sorted by symbol
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - no such account
    pub fn get_holdings(&self, account_id: AccountId) -> Result<Vec<Holding>, LedgerError> {
        self.accounts.holdings(account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction_log::InMemoryTransactionLog;
    use crate::pricing::FixedPriceOracle;
    use crate::types::TransactionStatus;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Returns a scripted sequence of prices, then repeats the last one
    struct ShiftingOracle {
        prices: Vec<Decimal>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceOracle for ShiftingOracle {
        async fn get_price(&self, _symbol: &str) -> Result<Decimal, LedgerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.prices[call.min(self.prices.len() - 1)])
        }
    }

    /// Never answers; forces the fetch timeout to fire
    struct StalledOracle;

    #[async_trait]
    impl PriceOracle for StalledOracle {
        async fn get_price(&self, _symbol: &str) -> Result<Decimal, LedgerError> {
            futures::future::pending().await
        }
    }

    fn build_service(oracle: Arc<dyn PriceOracle>) -> (Arc<AccountRegistry>, TradingService) {
        let accounts = Arc::new(AccountRegistry::new());
        let service = TradingService::new(
            &LedgerConfig::default(),
            Arc::clone(&accounts),
            Arc::new(InMemoryTransactionLog::new()),
            oracle,
        );
        (accounts, service)
    }

    fn funded_account(accounts: &AccountRegistry, balance: Decimal) -> AccountId {
        let account_id = accounts.open_account(Uuid::new_v4()).unwrap().account_id;
        accounts
            .update(account_id, |state| state.account.record_deposit(balance))
            .unwrap();
        account_id
    }

    fn history(service: &TradingService, account_id: AccountId) -> Vec<Transaction> {
        service.transactions.list(account_id)
    }

    #[tokio::test]
    async fn test_buy_debits_cash_and_opens_position() {
        let (accounts, service) = build_service(Arc::new(FixedPriceOracle::simulated()));
        let account_id = funded_account(&accounts, dec!(10000.00));

        let transaction_id = service.buy_shares(account_id, "AAPL", 10).await.unwrap();

        let account = accounts.get(account_id).unwrap();
        assert_eq!(account.cash_balance(), dec!(8550.00));

        let holdings = service.get_holdings(account_id).unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].symbol, "AAPL");
        assert_eq!(holdings[0].quantity(), 10);
        assert_eq!(holdings[0].avg_cost_basis(), dec!(145.00));

        let records = history(&service, account_id);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].transaction_id, transaction_id);
        assert_eq!(records[0].transaction_type, TransactionType::Buy);
        assert_eq!(records[0].total_amount, dec!(1450.00));
        assert_eq!(records[0].price_per_share, Some(dec!(145.00)));
        assert_eq!(records[0].status(), TransactionStatus::Completed);
    }

    #[tokio::test]
    async fn test_buy_beyond_balance_fails_with_priced_record() {
        let (accounts, service) = build_service(Arc::new(FixedPriceOracle::simulated()));
        let account_id = funded_account(&accounts, dec!(100.00));

        let result = service.buy_shares(account_id, "AAPL", 1).await;
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));

        // Balance untouched, FAILED record carries the fetched price
        assert_eq!(accounts.get(account_id).unwrap().cash_balance(), dec!(100.00));
        let records = history(&service, account_id);
        assert_eq!(records.len(), 1);
        assert!(records[0].is_failed());
        assert_eq!(records[0].price_per_share, Some(dec!(145.00)));
        assert_eq!(records[0].total_amount, dec!(145.00));
    }

    #[tokio::test]
    async fn test_buy_unsupported_symbol_never_reaches_oracle() {
        let (accounts, service) = build_service(Arc::new(StalledOracle));
        let account_id = funded_account(&accounts, dec!(1000.00));

        // A stalled oracle would hang; the static check must fire first
        let result = service.buy_shares(account_id, "MSFT", 1).await;
        assert!(matches!(result, Err(LedgerError::UnsupportedSymbol { .. })));

        let records = history(&service, account_id);
        assert_eq!(records.len(), 1);
        assert!(records[0].is_failed());
        assert_eq!(records[0].symbol.as_deref(), Some("MSFT"));
        assert!(records[0].price_per_share.is_none());
        assert_eq!(records[0].total_amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_buy_zero_quantity_is_rejected() {
        let (accounts, service) = build_service(Arc::new(FixedPriceOracle::simulated()));
        let account_id = funded_account(&accounts, dec!(1000.00));

        let result = service.buy_shares(account_id, "AAPL", 0).await;
        assert!(matches!(
            result,
            Err(LedgerError::InvalidQuantity { quantity: 0 })
        ));
    }

    #[tokio::test]
    async fn test_stalled_oracle_fails_order_without_price() {
        let (accounts, service) = {
            let accounts = Arc::new(AccountRegistry::new());
            let config = LedgerConfig {
                price_timeout: Duration::from_millis(10),
                ..LedgerConfig::default()
            };
            let service = TradingService::new(
                &config,
                Arc::clone(&accounts),
                Arc::new(InMemoryTransactionLog::new()),
                Arc::new(StalledOracle),
            );
            (accounts, service)
        };
        let account_id = funded_account(&accounts, dec!(1000.00));

        let result = service.buy_shares(account_id, "AAPL", 2).await;
        assert!(matches!(result, Err(LedgerError::PriceUnavailable { .. })));

        let records = history(&service, account_id);
        assert_eq!(records.len(), 1);
        assert!(records[0].is_failed());
        assert!(records[0].price_per_share.is_none());
        assert_eq!(records[0].total_amount, Decimal::ZERO);
        assert_eq!(accounts.get(account_id).unwrap().cash_balance(), dec!(1000.00));
    }

    #[tokio::test]
    async fn test_sell_credits_proceeds_and_shrinks_position() {
        let (accounts, service) = build_service(Arc::new(FixedPriceOracle::simulated()));
        let account_id = funded_account(&accounts, dec!(10000.00));

        service.buy_shares(account_id, "TSLA", 10).await.unwrap();
        service.sell_shares(account_id, "TSLA", 4).await.unwrap();

        let account = accounts.get(account_id).unwrap();
        // 10000 - 6500 + 2600
        assert_eq!(account.cash_balance(), dec!(6100.00));

        let holdings = service.get_holdings(account_id).unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].quantity(), 6);
        assert_eq!(holdings[0].avg_cost_basis(), dec!(650.00));
    }

    #[tokio::test]
    async fn test_selling_everything_removes_the_position() {
        let (accounts, service) = build_service(Arc::new(FixedPriceOracle::simulated()));
        let account_id = funded_account(&accounts, dec!(10000.00));

        service.buy_shares(account_id, "AAPL", 5).await.unwrap();
        service.sell_shares(account_id, "AAPL", 5).await.unwrap();

        assert!(service.get_holdings(account_id).unwrap().is_empty());
        assert_eq!(
            accounts.get(account_id).unwrap().cash_balance(),
            dec!(10000.00)
        );
    }

    #[tokio::test]
    async fn test_sell_more_than_held_fails_with_record() {
        let (accounts, service) = build_service(Arc::new(FixedPriceOracle::simulated()));
        let account_id = funded_account(&accounts, dec!(10000.00));
        service.buy_shares(account_id, "AAPL", 3).await.unwrap();

        let result = service.sell_shares(account_id, "AAPL", 5).await;
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientHoldings { held: 3, requested: 5, .. })
        ));

        let records = history(&service, account_id);
        assert_eq!(records.len(), 2);
        assert!(records[1].is_failed());
        assert_eq!(records[1].quantity, Some(5));

        // Position unchanged by the rejected sale
        let holdings = service.get_holdings(account_id).unwrap();
        assert_eq!(holdings[0].quantity(), 3);
    }

    #[tokio::test]
    async fn test_basis_averages_across_buys_at_different_prices() {
        let oracle = Arc::new(ShiftingOracle {
            prices: vec![dec!(100.00), dec!(200.00)],
            calls: AtomicUsize::new(0),
        });
        let (accounts, service) = build_service(oracle);
        let account_id = funded_account(&accounts, dec!(10000.00));

        service.buy_shares(account_id, "AAPL", 10).await.unwrap();
        service.buy_shares(account_id, "AAPL", 10).await.unwrap();

        let holdings = service.get_holdings(account_id).unwrap();
        assert_eq!(holdings[0].quantity(), 20);
        assert_eq!(holdings[0].avg_cost_basis(), dec!(150.00));
    }

    #[tokio::test]
    async fn test_sale_leaves_basis_unchanged() {
        let oracle = Arc::new(ShiftingOracle {
            prices: vec![dec!(100.00), dec!(250.00)],
            calls: AtomicUsize::new(0),
        });
        let (accounts, service) = build_service(oracle);
        let account_id = funded_account(&accounts, dec!(10000.00));

        service.buy_shares(account_id, "GOOGL", 10).await.unwrap();
        service.sell_shares(account_id, "GOOGL", 5).await.unwrap();

        let holdings = service.get_holdings(account_id).unwrap();
        assert_eq!(holdings[0].avg_cost_basis(), dec!(100.00));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_buys_serialize_on_the_account() {
        let (accounts, service) = build_service(Arc::new(FixedPriceOracle::simulated()));
        let service = Arc::new(service);
        let account_id = funded_account(&accounts, dec!(10000.00));

        let mut handles = vec![];
        for _ in 0..20 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.buy_shares(account_id, "AAPL", 1).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let account = accounts.get(account_id).unwrap();
        assert_eq!(account.cash_balance(), dec!(7100.00));

        let holdings = service.get_holdings(account_id).unwrap();
        assert_eq!(holdings[0].quantity(), 20);

        let records = history(&service, account_id);
        assert_eq!(records.len(), 20);
        assert!(records.iter().all(|tx| tx.is_completed()));
    }
}
