//! Order Book Aggregator
//!
//! Turns persisted signed orders into views a taker can act on:
//! - Collateral-adjusted order books per market, paginated per side
//! - Best-bid / best-ask price feeds across many markets
//!
//! Every order's remaining fillable amount reflects the maker's real
//! available collateral, allocated in price priority across all of that
//! maker's orders on the same token.
//!
//! # Architecture
//!
//! ```text
//!   OrderSource            CollateralOracle
//!        │                        │
//!   ┌────▼─────┐                  │
//!   │Freshness │ ← drops expiring orders, alerts
//!   └────┬─────┘                  │
//!   ┌────▼─────┐           ┌──────▼──────┐
//!   │ Ranking  │           │  Snapshot   │ ← batched, concurrent
//!   └────┬─────┘           └──────┬──────┘
//!        │                        │
//!   ┌────▼────────────────────────▼──┐
//!   │        Fillability fold        │ ← one ledger per pass
//!   └────────────────┬───────────────┘
//!             ┌──────▼───────┐
//!             │Request filter│ ← fee, taker, threshold, dust
//!             └──────┬───────┘
//!          ┌─────────┴─────────┐
//!     ┌────▼─────┐       ┌─────▼────┐
//!     │Order book│       │Price feed│
//!     └──────────┘       └──────────┘
//! ```

pub mod collaborators;
pub mod collateral;
pub mod config;
pub mod context;
pub mod fillability;
pub mod freshness;
pub mod memory;
pub mod metrics;
pub mod order_book;
pub mod order_filter;
pub mod price_feed;
pub mod ranking;
pub mod request_filter;

pub use config::AggregatorConfig;
pub use context::AggregatorContext;
pub use order_book::{OrderBook, OrderBookAggregator};
pub use price_feed::{MarketPrice, PriceFeedAggregator, PriceFeedRequest};
pub use request_filter::{FeeTolerance, MarketQuery};

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
