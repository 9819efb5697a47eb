//! Collaborators and shared pipeline stages for aggregation passes
//!
//! Both aggregators load a market the same way: one order-source query for
//! the pair in either direction, a split into bids and asks, expiry
//! filtering, and ranking. They also snapshot collateral and evaluate
//! orders (fold step, then request filter) the same way.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, error};
use types::errors::CollaboratorFailure;
use types::market::{Market, Side};
use types::order::{AnnotatedOrder, SignedOrder};

use crate::collaborators::{Clock, CollateralOracle, ExpiryAlerter, LoggingExpiryAlerter, OrderSource, SystemClock};
use crate::collateral::{batch_count, fetch_ledger, CollateralKey, CollateralLedger};
use crate::config::AggregatorConfig;
use crate::fillability::FillabilityFold;
use crate::freshness::FreshnessFilter;
use crate::metrics::AggregatorMetrics;
use crate::order_filter::OrderFilter;
use crate::ranking::OrderRanker;
use crate::request_filter::RequestFilter;

/// Everything an aggregation pass talks to.
#[derive(Clone)]
pub struct AggregatorContext {
    pub orders: Arc<dyn OrderSource>,
    pub oracle: Arc<dyn CollateralOracle>,
    pub alerter: Arc<dyn ExpiryAlerter>,
    pub clock: Arc<dyn Clock>,
    pub metrics: Arc<AggregatorMetrics>,
    pub config: AggregatorConfig,
}

impl AggregatorContext {
    /// Context with the wall clock and a logging expiry alerter.
    pub fn new(
        orders: Arc<dyn OrderSource>,
        oracle: Arc<dyn CollateralOracle>,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            orders,
            oracle,
            alerter: Arc::new(LoggingExpiryAlerter),
            clock: Arc::new(SystemClock),
            metrics: Arc::new(AggregatorMetrics::new()),
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_alerter(mut self, alerter: Arc<dyn ExpiryAlerter>) -> Self {
        self.alerter = alerter;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<AggregatorMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Load one market's fresh orders, split by side and ranked best first.
    pub async fn load_market(&self, market: Market) -> Result<RankedMarket, CollaboratorFailure> {
        let candidates = self
            .orders
            .find(&OrderFilter::pair(market))
            .await
            .map_err(|err| {
                error!(%market, error = %err, "Order source query failed");
                err
            })?;

        let freshness = FreshnessFilter::new(self.clock.now_unix(), self.config.expiry_buffer_secs);
        let loaded = candidates.len();
        let fresh = freshness.retain_fresh(candidates, self.alerter.as_ref());
        self.metrics.record_expired(loaded - fresh.len());

        let mut bids = Vec::new();
        let mut asks = Vec::new();
        for order in fresh {
            match market.side_of(&order) {
                Some(Side::Bid) => bids.push(order),
                Some(Side::Ask) => asks.push(order),
                None => debug!(order_hash = %order.hash, %market, "Ignoring order outside market"),
            }
        }

        debug!(
            %market,
            loaded,
            bids = bids.len(),
            asks = asks.len(),
            "Market loaded"
        );

        Ok(RankedMarket {
            market,
            bids: OrderRanker::new(Side::Bid).rank(bids),
            asks: OrderRanker::new(Side::Ask).rank(asks),
        })
    }

    /// One collateral snapshot covering every key.
    pub async fn snapshot_ledger(
        &self,
        keys: &BTreeSet<CollateralKey>,
    ) -> Result<CollateralLedger, CollaboratorFailure> {
        let batch_len = self.config.batch_len(self.oracle.max_batch_len());
        self.metrics.record_oracle_batches(batch_count(keys.len(), batch_len));
        fetch_ledger(
            self.oracle.as_ref(),
            keys,
            self.config.collateral_spender,
            batch_len,
        )
        .await
    }

    /// Fold one order and apply the request filter. `Some` if it survives.
    pub fn evaluate(
        &self,
        fold: &mut FillabilityFold,
        filter: &RequestFilter<'_>,
        order: SignedOrder,
    ) -> Option<AnnotatedOrder> {
        let step = fold.step(AnnotatedOrder::unfilled(order));
        let verdict = filter.check(&step.order);
        self.metrics.record_evaluation(step.outcome, verdict.is_ok());
        match verdict {
            Ok(()) => Some(step.order),
            Err(reason) => {
                debug!(order_hash = %step.order.hash(), ?reason, "Order filtered out");
                None
            }
        }
    }
}

/// A market's fresh orders, each side ranked best first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedMarket {
    pub market: Market,
    pub bids: Vec<SignedOrder>,
    pub asks: Vec<SignedOrder>,
}

impl RankedMarket {
    /// Collateral slots referenced by any order on either side.
    pub fn collateral_keys(&self) -> impl Iterator<Item = CollateralKey> + '_ {
        self.bids
            .iter()
            .chain(self.asks.iter())
            .map(CollateralKey::maker_side)
    }

    pub fn order_count(&self) -> usize {
        self.bids.len() + self.asks.len()
    }
}
