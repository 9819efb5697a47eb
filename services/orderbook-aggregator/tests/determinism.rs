//! Determinism tests for the aggregators
//!
//! Identical orders and collateral must produce byte-identical output,
//! whatever order the store and oracle hand them back in.
//!
//! Tests include:
//! - Dual pass comparison
//! - Insertion order independence
//! - Contended collateral under random order sets

use std::sync::Arc;

use orderbook_aggregator::collaborators::FixedClock;
use orderbook_aggregator::memory::{InMemoryOrderSource, StaticCollateralOracle};
use orderbook_aggregator::{
    AggregatorConfig, AggregatorContext, MarketQuery, OrderBookAggregator, PriceFeedAggregator,
    PriceFeedRequest,
};
use proptest::prelude::*;
use types::ids::{Address, OrderHash};
use types::market::Market;
use types::numeric::Amount;
use types::order::SignedOrder;

const NOW: u64 = 1_708_123_456;
const BASE: u64 = 0xb;
const QUOTE: u64 = 0xc;

fn make_order(maker: u64, is_bid: bool, maker_amount: u64, taker_amount: u64, salt: u64) -> SignedOrder {
    let (maker_token, taker_token) = if is_bid { (QUOTE, BASE) } else { (BASE, QUOTE) };
    SignedOrder {
        maker: Address::from_low_u64(maker),
        taker: Address::NULL,
        maker_token: Address::from_low_u64(maker_token),
        taker_token: Address::from_low_u64(taker_token),
        maker_amount: Amount::from(maker_amount),
        taker_amount: Amount::from(taker_amount),
        taker_token_fee_amount: Amount::ZERO,
        fee_recipient: Address::NULL,
        expiry: NOW + 600,
        salt: Amount::from(salt),
        hash: OrderHash::default(),
    }
    .with_computed_hash()
}

fn oracle(balance: u64) -> StaticCollateralOracle {
    (1..=4).fold(StaticCollateralOracle::new(), |oracle, maker| {
        oracle
            .with_balance(Address::from_low_u64(maker), Address::from_low_u64(BASE), Amount::from(balance))
            .with_balance(Address::from_low_u64(maker), Address::from_low_u64(QUOTE), Amount::from(balance))
    })
}

fn context(orders: Vec<SignedOrder>, balance: u64) -> AggregatorContext {
    AggregatorContext::new(
        Arc::new(InMemoryOrderSource::with_orders(orders)),
        Arc::new(oracle(balance)),
        AggregatorConfig::default(),
    )
    .with_clock(Arc::new(FixedClock(NOW)))
}

fn sample_orders() -> Vec<SignedOrder> {
    let mut orders = Vec::new();
    for i in 0..30u64 {
        let maker = 1 + i % 4;
        orders.push(make_order(maker, true, 900 + i * 7, 1_000, i));
        orders.push(make_order(maker, false, 1_000, 1_050 + i * 5, 100 + i));
    }
    orders
}

async fn book_json(orders: Vec<SignedOrder>, balance: u64) -> String {
    let book = OrderBookAggregator::new(context(orders, balance))
        .get_order_book(1, 100, Address::from_low_u64(BASE), Address::from_low_u64(QUOTE))
        .await
        .unwrap();
    serde_json::to_string(&book).unwrap()
}

#[tokio::test]
async fn test_dual_pass_produces_identical_book() {
    let first = book_json(sample_orders(), 8_000).await;
    let second = book_json(sample_orders(), 8_000).await;
    assert_eq!(first, second, "Two passes over the same inputs diverged");
}

#[tokio::test]
async fn test_insertion_order_does_not_matter() {
    let mut reversed = sample_orders();
    reversed.reverse();
    assert_eq!(book_json(sample_orders(), 8_000).await, book_json(reversed, 8_000).await);
}

#[tokio::test]
async fn test_price_feed_repeatable() {
    let market = Market::new(Address::from_low_u64(BASE), Address::from_low_u64(QUOTE));
    let request = PriceFeedRequest {
        markets: Some(vec![market]),
        query: MarketQuery::default(),
    };

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let prices = PriceFeedAggregator::new(context(sample_orders(), 8_000))
            .get_prices(&request)
            .await
            .unwrap();
        outputs.push(serde_json::to_string(&prices).unwrap());
    }
    assert_eq!(outputs[0], outputs[1]);
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_contended_book_is_order_independent(
        specs in prop::collection::vec((1u64..=4, any::<bool>(), 101u64..10_000, 101u64..10_000), 1..40),
        balance in 0u64..20_000,
    ) {
        let orders: Vec<SignedOrder> = specs
            .iter()
            .enumerate()
            .map(|(i, (maker, is_bid, m, t))| make_order(*maker, *is_bid, *m, *t, i as u64))
            .collect();
        let mut shuffled = orders.clone();
        shuffled.reverse();

        let first = block_on(book_json(orders, balance));
        let second = block_on(book_json(shuffled, balance));
        prop_assert_eq!(first, second);
    }
}
