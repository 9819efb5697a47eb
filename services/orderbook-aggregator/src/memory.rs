//! In-memory collaborators
//!
//! Local backends for the collaborator traits. Used by the integration
//! tests and for running the aggregators without a database or chain node.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::RwLock;
use types::errors::CollaboratorFailure;
use types::ids::{Address, OrderHash};
use types::market::Market;
use types::numeric::Amount;
use types::order::SignedOrder;

use crate::collaborators::{CollateralOracle, MarketDiscovery, OrderSource, DEFAULT_ORACLE_MAX_BATCH};
use crate::order_filter::OrderFilter;

/// Order store keyed by hash. Iteration is hash-ascending.
#[derive(Debug, Default)]
pub struct InMemoryOrderSource {
    orders: RwLock<BTreeMap<OrderHash, SignedOrder>>,
    failure: Option<String>,
}

impl InMemoryOrderSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(orders: impl IntoIterator<Item = SignedOrder>) -> Self {
        Self {
            orders: RwLock::new(orders.into_iter().map(|o| (o.hash, o)).collect()),
            failure: None,
        }
    }

    /// Make every query fail with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Insert or replace an order. Returns `true` if the hash was new.
    pub async fn insert(&self, order: SignedOrder) -> bool {
        self.orders.write().await.insert(order.hash, order).is_none()
    }

    pub async fn remove(&self, hash: &OrderHash) -> Option<SignedOrder> {
        self.orders.write().await.remove(hash)
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderSource for InMemoryOrderSource {
    async fn find(&self, filter: &OrderFilter) -> Result<Vec<SignedOrder>, CollaboratorFailure> {
        if let Some(message) = &self.failure {
            return Err(CollaboratorFailure::order_source(message.clone()));
        }
        Ok(self
            .orders
            .read()
            .await
            .values()
            .filter(|order| filter.matches(order))
            .cloned()
            .collect())
    }
}

/// Oracle answering from a fixed `(holder, token)` table.
///
/// Pairs missing from the table report zero. Records every batch size it
/// receives.
#[derive(Debug)]
pub struct StaticCollateralOracle {
    balances: HashMap<(Address, Address), Amount>,
    max_batch_len: usize,
    failure: Option<String>,
    batch_sizes: Mutex<Vec<usize>>,
}

impl Default for StaticCollateralOracle {
    fn default() -> Self {
        Self {
            balances: HashMap::new(),
            max_batch_len: DEFAULT_ORACLE_MAX_BATCH,
            failure: None,
            batch_sizes: Mutex::new(Vec::new()),
        }
    }
}

impl StaticCollateralOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_batch_len(mut self, max_batch_len: usize) -> Self {
        self.max_batch_len = max_batch_len;
        self
    }

    pub fn with_balance(mut self, holder: Address, token: Address, amount: Amount) -> Self {
        self.set(holder, token, amount);
        self
    }

    /// Make every call fail with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn set(&mut self, holder: Address, token: Address, amount: Amount) {
        self.balances.insert((holder, token), amount);
    }

    /// Sizes of the batches received so far, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes
            .lock()
            .map(|sizes| sizes.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CollateralOracle for StaticCollateralOracle {
    async fn min_available(
        &self,
        holders: &[Address],
        tokens: &[Address],
        _spender: Address,
    ) -> Result<Vec<Amount>, CollaboratorFailure> {
        if let Ok(mut sizes) = self.batch_sizes.lock() {
            sizes.push(holders.len());
        }
        if let Some(message) = &self.failure {
            return Err(CollaboratorFailure::collateral_oracle(message.clone()));
        }
        if holders.len() != tokens.len() {
            return Err(CollaboratorFailure::collateral_oracle(format!(
                "{} holders but {} tokens",
                holders.len(),
                tokens.len()
            )));
        }
        if holders.len() > self.max_batch_len {
            return Err(CollaboratorFailure::collateral_oracle(format!(
                "batch of {} exceeds limit {}",
                holders.len(),
                self.max_batch_len
            )));
        }
        Ok(holders
            .iter()
            .zip(tokens)
            .map(|(holder, token)| {
                self.balances
                    .get(&(*holder, *token))
                    .copied()
                    .unwrap_or(Amount::ZERO)
            })
            .collect())
    }

    fn max_batch_len(&self) -> usize {
        self.max_batch_len
    }
}

/// Discovery returning a fixed market list.
#[derive(Debug, Clone, Default)]
pub struct StaticMarketDiscovery {
    markets: Vec<Market>,
    failure: Option<String>,
}

impl StaticMarketDiscovery {
    pub fn new(markets: Vec<Market>) -> Self {
        Self {
            markets,
            failure: None,
        }
    }

    /// Make every call fail with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }
}

#[async_trait]
impl MarketDiscovery for StaticMarketDiscovery {
    async fn markets(&self) -> Result<Vec<Market>, CollaboratorFailure> {
        if let Some(message) = &self.failure {
            return Err(CollaboratorFailure::market_discovery(message.clone()));
        }
        Ok(self.markets.clone())
    }
}
