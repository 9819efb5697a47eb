//! Collateral-adjusted order book for one market
//!
//! Bids and asks share one collateral snapshot. Bids are folded first, and
//! asks continue with the ledger the bids left behind. Survivors of the
//! request filter are paginated per side with the same page and size.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use types::errors::AggregatorError;
use types::ids::Address;
use types::market::Market;
use types::order::AnnotatedOrder;
use types::pagination::Paginated;
use uuid::Uuid;

use crate::context::AggregatorContext;
use crate::fillability::FillabilityFold;
use crate::request_filter::{validate_market, MarketQuery, RequestFilter};

/// Paginated bid and ask collections for one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    pub bids: Paginated<AnnotatedOrder>,
    pub asks: Paginated<AnnotatedOrder>,
}

/// Builds order books from persisted orders and live collateral.
#[derive(Clone)]
pub struct OrderBookAggregator {
    ctx: AggregatorContext,
}

impl OrderBookAggregator {
    pub fn new(ctx: AggregatorContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &AggregatorContext {
        &self.ctx
    }

    /// Order book with paging only; the dust floor still applies.
    pub async fn get_order_book(
        &self,
        page: usize,
        per_page: usize,
        base_token: Address,
        quote_token: Address,
    ) -> Result<OrderBook, AggregatorError> {
        self.get_order_book_for(
            &MarketQuery::paged(page, per_page),
            Market::new(base_token, quote_token),
        )
        .await
    }

    /// Order book with every caller constraint in `query` applied.
    pub async fn get_order_book_for(
        &self,
        query: &MarketQuery,
        market: Market,
    ) -> Result<OrderBook, AggregatorError> {
        query.validate(&self.ctx.config)?;
        validate_market(&market)?;

        let request_id = Uuid::now_v7();
        let span = info_span!("order_book", %request_id, %market);
        self.build(query, market).instrument(span).await
    }

    async fn build(&self, query: &MarketQuery, market: Market) -> Result<OrderBook, AggregatorError> {
        let ctx = &self.ctx;
        ctx.metrics.record_pass();

        let ranked = ctx.load_market(market).await?;
        let keys: BTreeSet<_> = ranked.collateral_keys().collect();
        let ledger = ctx.snapshot_ledger(&keys).await?;

        info!(
            bids = ranked.bids.len(),
            asks = ranked.asks.len(),
            collateral_slots = keys.len(),
            "Folding order book"
        );

        let filter = RequestFilter::new(query, &ctx.config);
        let mut fold = FillabilityFold::new(ledger);

        let bids: Vec<AnnotatedOrder> = ranked
            .bids
            .into_iter()
            .filter_map(|order| ctx.evaluate(&mut fold, &filter, order))
            .collect();
        let asks: Vec<AnnotatedOrder> = ranked
            .asks
            .into_iter()
            .filter_map(|order| ctx.evaluate(&mut fold, &filter, order))
            .collect();

        info!(
            bids = bids.len(),
            asks = asks.len(),
            "Order book ready"
        );

        Ok(OrderBook {
            bids: Paginated::from_items(bids, query.page, query.per_page),
            asks: Paginated::from_items(asks, query.page, query.per_page),
        })
    }
}
