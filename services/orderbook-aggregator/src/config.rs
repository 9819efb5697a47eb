//! Aggregator configuration
//!
//! Every field has a default, so a partial JSON document (or none at all)
//! yields a usable configuration.

use serde::Deserialize;
use types::ids::Address;

/// Orders expiring within this many seconds of now are treated as expired.
pub const DEFAULT_EXPIRY_BUFFER_SECS: u64 = 10;
/// Largest `(holder, token)` batch sent to the collateral oracle per call.
pub const DEFAULT_ORACLE_BATCH_SIZE: usize = 400;
/// Page size of a query that does not name one.
pub const DEFAULT_PER_PAGE: usize = 20;
pub const MAX_PER_PAGE: usize = 1000;

/// Configuration for order book and price feed aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AggregatorConfig {
    /// Safety margin applied to order expiry checks, in seconds.
    pub expiry_buffer_secs: u64,
    /// Upper bound on collateral oracle batch length.
    pub oracle_batch_size: usize,
    pub max_per_page: usize,
    /// Fee recipient subject to the governance fee pre-check.
    pub governance_fee_recipient: Address,
    /// Contract whose allowance bounds a maker's usable collateral.
    pub collateral_spender: Address,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            expiry_buffer_secs: DEFAULT_EXPIRY_BUFFER_SECS,
            oracle_batch_size: DEFAULT_ORACLE_BATCH_SIZE,
            max_per_page: MAX_PER_PAGE,
            governance_fee_recipient: Address::NULL,
            collateral_spender: Address::NULL,
        }
    }
}

impl AggregatorConfig {
    /// Parse a JSON document; absent fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Effective oracle batch length given the oracle's own limit.
    pub fn batch_len(&self, oracle_max: usize) -> usize {
        self.oracle_batch_size.min(oracle_max).max(1)
    }
}
