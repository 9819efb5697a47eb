//! Best bid and ask across many markets
//!
//! All markets draw on one collateral snapshot covering the union of their
//! `(maker, token)` slots. Markets are scanned in order, bids before asks;
//! on each side the scan stops at the first order that survives the fold
//! and the request filter. A maker's collateral consumed while pricing one
//! market is gone for every market after it.
//!
//! An order is folded at most once per pass. A market listed in both
//! directions sees the same orders on opposite sides; the later market
//! skips any order an earlier one already folded.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, info_span, warn, Instrument};
use types::errors::{AggregatorError, ConstraintViolation};
use types::ids::{Address, OrderHash};
use types::market::Market;
use types::order::{AnnotatedOrder, SignedOrder};
use types::pagination::Paginated;
use uuid::Uuid;

use crate::collaborators::MarketDiscovery;
use crate::context::AggregatorContext;
use crate::fillability::FillabilityFold;
use crate::request_filter::{validate_market, MarketQuery, RequestFilter};

/// Markets to price and the constraints shared by all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PriceFeedRequest {
    /// `None` means ask market discovery.
    pub markets: Option<Vec<Market>>,
    #[serde(flatten)]
    pub query: MarketQuery,
}

/// Best fillable bid and ask of one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPrice {
    pub base_token: Address,
    pub quote_token: Address,
    pub bid: Option<AnnotatedOrder>,
    pub ask: Option<AnnotatedOrder>,
}

/// Builds price feeds from persisted orders and live collateral.
#[derive(Clone)]
pub struct PriceFeedAggregator {
    ctx: AggregatorContext,
    discovery: Option<Arc<dyn MarketDiscovery>>,
}

impl PriceFeedAggregator {
    pub fn new(ctx: AggregatorContext) -> Self {
        Self {
            ctx,
            discovery: None,
        }
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn MarketDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn context(&self) -> &AggregatorContext {
        &self.ctx
    }

    pub async fn get_prices(
        &self,
        request: &PriceFeedRequest,
    ) -> Result<Paginated<MarketPrice>, AggregatorError> {
        request.query.validate(&self.ctx.config)?;
        if let Some(markets) = &request.markets {
            for market in markets {
                validate_market(market)?;
            }
        }

        let request_id = Uuid::now_v7();
        let span = info_span!("price_feed", %request_id);
        self.build(request).instrument(span).await
    }

    async fn resolve_markets(&self, request: &PriceFeedRequest) -> Result<Vec<Market>, AggregatorError> {
        let markets = match &request.markets {
            Some(markets) => markets.clone(),
            None => {
                let discovery = self
                    .discovery
                    .as_ref()
                    .ok_or(ConstraintViolation::MissingField { field: "markets" })?;
                let discovered = discovery.markets().await.map_err(|err| {
                    error!(error = %err, "Market discovery failed");
                    err
                })?;
                discovered
                    .into_iter()
                    .filter(|market| {
                        let usable = !market.is_degenerate();
                        if !usable {
                            warn!(%market, "Skipping discovered market with identical tokens");
                        }
                        usable
                    })
                    .collect()
            }
        };

        let mut seen = HashSet::new();
        Ok(markets.into_iter().filter(|m| seen.insert(*m)).collect())
    }

    async fn build(&self, request: &PriceFeedRequest) -> Result<Paginated<MarketPrice>, AggregatorError> {
        let ctx = &self.ctx;
        ctx.metrics.record_pass();

        let markets = self.resolve_markets(request).await?;
        let ranked = try_join_all(markets.iter().map(|market| ctx.load_market(*market))).await?;

        let keys: BTreeSet<_> = ranked.iter().flat_map(|m| m.collateral_keys()).collect();
        let ledger = ctx.snapshot_ledger(&keys).await?;

        info!(
            markets = ranked.len(),
            orders = ranked.iter().map(|m| m.order_count()).sum::<usize>(),
            collateral_slots = keys.len(),
            "Scanning price feed"
        );

        let filter = RequestFilter::new(&request.query, &ctx.config);
        let mut fold = FillabilityFold::new(ledger);
        let mut folded: HashSet<OrderHash> = HashSet::new();
        let mut best_first = |orders: Vec<SignedOrder>| {
            orders
                .into_iter()
                .filter(|order| {
                    let first_seen = folded.insert(order.hash);
                    if !first_seen {
                        debug!(order_hash = %order.hash, "Order already folded in an earlier market");
                    }
                    first_seen
                })
                .find_map(|order| ctx.evaluate(&mut fold, &filter, order))
        };

        let mut prices = Vec::with_capacity(ranked.len());
        for market in ranked {
            let bid = best_first(market.bids);
            let ask = best_first(market.asks);
            prices.push(MarketPrice {
                base_token: market.market.base_token,
                quote_token: market.market.quote_token,
                bid,
                ask,
            });
        }

        info!(
            priced_bids = prices.iter().filter(|p| p.bid.is_some()).count(),
            priced_asks = prices.iter().filter(|p| p.ask.is_some()).count(),
            "Price feed ready"
        );

        Ok(Paginated::from_items(
            prices,
            request.query.page,
            request.query.per_page,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::errors::CollaboratorFailure;
    use types::numeric::Amount;

    use crate::collaborators::FixedClock;
    use crate::config::AggregatorConfig;
    use crate::memory::{InMemoryOrderSource, StaticCollateralOracle, StaticMarketDiscovery};

    const NOW: u64 = 1_700_000_000;

    fn token(id: u64) -> Address {
        Address::from_low_u64(id)
    }

    fn bid(maker: u64, market: Market, maker_amount: u64, taker_amount: u64, salt: u64) -> SignedOrder {
        SignedOrder {
            maker: Address::from_low_u64(maker),
            taker: Address::NULL,
            maker_token: market.quote_token,
            taker_token: market.base_token,
            maker_amount: Amount::from(maker_amount),
            taker_amount: Amount::from(taker_amount),
            taker_token_fee_amount: Amount::ZERO,
            fee_recipient: Address::NULL,
            expiry: NOW + 3_600,
            salt: Amount::from(salt),
            hash: OrderHash::default(),
        }
        .with_computed_hash()
    }

    fn aggregator(orders: Vec<SignedOrder>, oracle: StaticCollateralOracle) -> PriceFeedAggregator {
        let ctx = AggregatorContext::new(
            Arc::new(InMemoryOrderSource::with_orders(orders)),
            Arc::new(oracle),
            AggregatorConfig::default(),
        )
        .with_clock(Arc::new(FixedClock(NOW)));
        PriceFeedAggregator::new(ctx)
    }

    #[tokio::test]
    async fn test_scan_skips_to_first_passing_order() {
        let market = Market::new(token(1), token(2));
        // Best-priced bid is from an unfunded maker; the next one is funded.
        let unfunded = bid(10, market, 2_000, 1_000, 1);
        let funded = bid(11, market, 1_000, 1_000, 2);
        let oracle = StaticCollateralOracle::new().with_balance(
            Address::from_low_u64(11),
            token(2),
            Amount::from(5_000),
        );

        let prices = aggregator(vec![unfunded, funded.clone()], oracle)
            .get_prices(&PriceFeedRequest {
                markets: Some(vec![market]),
                query: MarketQuery::default(),
            })
            .await
            .unwrap();

        assert_eq!(prices.total, 1);
        let price = &prices.records[0];
        assert_eq!(price.bid.as_ref().map(|b| b.hash()), Some(funded.hash));
        assert!(price.ask.is_none());
    }

    #[tokio::test]
    async fn test_collateral_shared_across_markets() {
        let quote = token(2);
        let first = Market::new(token(1), quote);
        let second = Market::new(token(3), quote);
        let oracle = StaticCollateralOracle::new().with_balance(
            Address::from_low_u64(10),
            quote,
            Amount::from(1_000),
        );

        let feed = aggregator(
            vec![
                bid(10, first, 1_000, 1_000, 1),
                bid(10, second, 1_000, 1_000, 2),
            ],
            oracle,
        );
        let prices = feed
            .get_prices(&PriceFeedRequest {
                markets: Some(vec![first, second]),
                query: MarketQuery::default(),
            })
            .await
            .unwrap();

        assert!(prices.records[0].bid.is_some());
        assert!(prices.records[1].bid.is_none());

        // The second market's order was folded against an exhausted slot
        let metrics = feed.context().metrics.snapshot();
        assert_eq!(metrics.orders_evaluated, 2);
        assert_eq!(metrics.orders_unfillable, 1);
        assert_eq!(metrics.orders_rejected, 1);
    }

    #[tokio::test]
    async fn test_reversed_market_does_not_refold_order() {
        let forward = Market::new(token(1), token(2));
        let reversed = Market::new(token(2), token(1));
        // A bid in the forward market is an ask in the reversed one
        let order = bid(10, forward, 1_000, 1_000, 1);
        let oracle = StaticCollateralOracle::new().with_balance(
            Address::from_low_u64(10),
            token(2),
            Amount::from(1_500),
        );

        let feed = aggregator(vec![order.clone()], oracle);
        let prices = feed
            .get_prices(&PriceFeedRequest {
                markets: Some(vec![forward, reversed]),
                query: MarketQuery::default(),
            })
            .await
            .unwrap();

        assert_eq!(prices.total, 2);
        let forward_bid = prices.records[0].bid.as_ref().unwrap();
        assert_eq!(forward_bid.hash(), order.hash);
        assert_eq!(forward_bid.remaining_fillable_taker_amount(), Amount::from(1_000));
        assert!(prices.records[1].ask.is_none());
        assert!(prices.records[1].bid.is_none());
        assert_eq!(feed.context().metrics.snapshot().orders_evaluated, 1);
    }

    #[tokio::test]
    async fn test_discovery_failure_propagates() {
        let feed = aggregator(vec![], StaticCollateralOracle::new())
            .with_discovery(Arc::new(StaticMarketDiscovery::new(vec![]).failing("registry offline")));

        let err = feed.get_prices(&PriceFeedRequest::default()).await.unwrap_err();
        assert_eq!(
            err,
            AggregatorError::Collaborator(CollaboratorFailure::market_discovery("registry offline"))
        );
    }

    #[tokio::test]
    async fn test_discovery_used_when_markets_absent() {
        let market = Market::new(token(1), token(2));
        let degenerate = Market::new(token(5), token(5));
        let feed = aggregator(vec![], StaticCollateralOracle::new())
            .with_discovery(Arc::new(StaticMarketDiscovery::new(vec![market, degenerate, market])));

        let prices = feed.get_prices(&PriceFeedRequest::default()).await.unwrap();
        assert_eq!(prices.total, 1);
        assert_eq!(prices.records[0].base_token, token(1));
    }

    #[tokio::test]
    async fn test_missing_markets_without_discovery() {
        let err = aggregator(vec![], StaticCollateralOracle::new())
            .get_prices(&PriceFeedRequest::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AggregatorError::Constraint(ConstraintViolation::MissingField { field: "markets" })
        );
    }

    #[test]
    fn test_request_from_json() {
        let request: PriceFeedRequest = serde_json::from_str(
            r#"{
                "markets": [{
                    "baseToken": "0x0000000000000000000000000000000000000001",
                    "quoteToken": "0x0000000000000000000000000000000000000002"
                }],
                "perPage": 5
            }"#,
        )
        .unwrap();
        assert_eq!(request.markets, Some(vec![Market::new(token(1), token(2))]));
        assert_eq!(request.query.per_page, 5);
        assert_eq!(request.query.page, 1);
    }
}
