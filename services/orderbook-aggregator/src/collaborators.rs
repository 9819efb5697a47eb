//! External collaborator seams
//!
//! The core never talks to storage, chain RPC or alerting directly. It
//! consumes these traits; failures come back as `CollaboratorFailure` and
//! are propagated unrecovered.

use async_trait::async_trait;
use tracing::warn;
use types::errors::CollaboratorFailure;
use types::ids::Address;
use types::market::Market;
use types::numeric::Amount;
use types::order::SignedOrder;

use crate::order_filter::OrderFilter;

/// Batch limit assumed for oracles that do not state their own.
pub const DEFAULT_ORACLE_MAX_BATCH: usize = 400;

/// Persisted store of signed orders.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// All orders matching `filter`, sorted by hash ascending.
    async fn find(&self, filter: &OrderFilter) -> Result<Vec<SignedOrder>, CollaboratorFailure>;

    /// Number of orders matching `filter`.
    async fn count(&self, filter: &OrderFilter) -> Result<usize, CollaboratorFailure> {
        Ok(self.find(filter).await?.len())
    }
}

/// On-chain view of spendable maker collateral.
#[async_trait]
pub trait CollateralOracle: Send + Sync {
    /// `min(balance, allowance to spender)` for each `(holders[i], tokens[i])`.
    ///
    /// The result is positional and must have the same length as the input.
    /// Inputs never exceed `max_batch_len()`.
    async fn min_available(
        &self,
        holders: &[Address],
        tokens: &[Address],
        spender: Address,
    ) -> Result<Vec<Amount>, CollaboratorFailure>;

    fn max_batch_len(&self) -> usize {
        DEFAULT_ORACLE_MAX_BATCH
    }
}

/// Source of the markets a price feed should cover.
#[async_trait]
pub trait MarketDiscovery: Send + Sync {
    async fn markets(&self) -> Result<Vec<Market>, CollaboratorFailure>;
}

/// Receives orders dropped for being expired.
pub trait ExpiryAlerter: Send + Sync {
    fn report_expired(&self, orders: &[SignedOrder]);
}

/// Logs each expired order at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingExpiryAlerter;

impl ExpiryAlerter for LoggingExpiryAlerter {
    fn report_expired(&self, orders: &[SignedOrder]) {
        for order in orders {
            warn!(
                order_hash = %order.hash,
                maker = %order.maker,
                expiry = order.expiry,
                "Dropping expired order"
            );
        }
    }
}

/// Source of the current time in Unix seconds.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_unix(&self) -> u64 {
        self.0
    }
}
