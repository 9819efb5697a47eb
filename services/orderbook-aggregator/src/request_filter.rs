//! Caller constraints applied after the fillability fold
//!
//! Checks run in a fixed sequence and the first rejection wins:
//! 1. Fee tolerance (governance pre-check, then the general check)
//! 2. Taker match
//! 3. Fee recipient match
//! 4. Liquidity floor (configured threshold, then the fixed dust floor)

use serde::Deserialize;
use types::errors::ConstraintViolation;
use types::ids::Address;
use types::market::Market;
use types::numeric::Amount;
use types::order::{AnnotatedOrder, SignedOrder};

use crate::config::{AggregatorConfig, DEFAULT_PER_PAGE};

/// Denominator of fee units: one unit is 1/100_000 of the taker amount.
pub const FEE_UNIT_DENOMINATOR: u64 = 100_000;

/// Orders with this much or less remaining taker size are never shown.
pub const DUST_FLOOR: u64 = 100;

/// Expected taker fee as a fraction of the taker amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeTolerance {
    /// Any fee is accepted.
    #[default]
    Unconstrained,
    /// Fee must equal `taker_amount * units / 100_000`, within one raw unit.
    Units(u64),
}

/// Per-request constraints and paging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketQuery {
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
    pub taker: Option<Address>,
    pub fee_recipient: Option<Address>,
    pub fee_tolerance: FeeTolerance,
    /// Orders at or below this remaining taker size are excluded.
    pub threshold: Option<Amount>,
}

impl Default for MarketQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            taker: None,
            fee_recipient: None,
            fee_tolerance: FeeTolerance::Unconstrained,
            threshold: None,
        }
    }
}

impl MarketQuery {
    /// A query with paging only.
    pub fn paged(page: usize, per_page: usize) -> Self {
        Self {
            page,
            per_page,
            ..Self::default()
        }
    }

    pub fn with_taker(mut self, taker: Address) -> Self {
        self.taker = Some(taker);
        self
    }

    pub fn with_fee_recipient(mut self, fee_recipient: Address) -> Self {
        self.fee_recipient = Some(fee_recipient);
        self
    }

    pub fn with_fee_units(mut self, units: u64) -> Self {
        self.fee_tolerance = FeeTolerance::Units(units);
        self
    }

    pub fn with_threshold(mut self, threshold: Amount) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Reject structurally invalid paging before any work is done.
    pub fn validate(&self, config: &AggregatorConfig) -> Result<(), ConstraintViolation> {
        if self.page == 0 {
            return Err(ConstraintViolation::InvalidPage);
        }
        if self.per_page == 0 || self.per_page > config.max_per_page {
            return Err(ConstraintViolation::InvalidPerPage {
                actual: self.per_page,
                max: config.max_per_page,
            });
        }
        Ok(())
    }
}

/// Reject a market whose base and quote are the same token.
pub fn validate_market(market: &Market) -> Result<(), ConstraintViolation> {
    if market.is_degenerate() {
        return Err(ConstraintViolation::IdenticalTokens {
            token: market.base_token.to_string(),
        });
    }
    Ok(())
}

/// Why an order was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    GovernanceFee,
    Fee,
    Taker,
    FeeRecipient,
    BelowThreshold,
    Dust,
}

/// Applies one query's constraints to fillability-adjusted orders.
#[derive(Debug, Clone, Copy)]
pub struct RequestFilter<'a> {
    query: &'a MarketQuery,
    governance_fee_recipient: Address,
}

impl<'a> RequestFilter<'a> {
    pub fn new(query: &'a MarketQuery, config: &AggregatorConfig) -> Self {
        Self {
            query,
            governance_fee_recipient: config.governance_fee_recipient,
        }
    }

    pub fn accepts(&self, order: &AnnotatedOrder) -> bool {
        self.check(order).is_ok()
    }

    /// Run every check in sequence; the first failure is returned.
    pub fn check(&self, annotated: &AnnotatedOrder) -> Result<(), Rejection> {
        let order = &annotated.order;

        if let FeeTolerance::Units(units) = self.query.fee_tolerance {
            // Narrower pre-check kept alongside the general one below
            if order.taker.is_null()
                && order.fee_recipient == self.governance_fee_recipient
                && !fee_within_tolerance(order, units)
            {
                return Err(Rejection::GovernanceFee);
            }
            if !fee_within_tolerance(order, units) {
                return Err(Rejection::Fee);
            }
        }

        if let Some(taker) = self.query.taker {
            if taker != order.taker {
                return Err(Rejection::Taker);
            }
        }

        if let Some(fee_recipient) = self.query.fee_recipient {
            if fee_recipient != order.fee_recipient {
                return Err(Rejection::FeeRecipient);
            }
        }

        let remaining = annotated.remaining_fillable_taker_amount();
        if let Some(threshold) = self.query.threshold {
            if remaining <= threshold {
                return Err(Rejection::BelowThreshold);
            }
        }
        if remaining <= Amount::from(DUST_FLOOR) {
            return Err(Rejection::Dust);
        }

        Ok(())
    }
}

/// `taker_token_fee_amount` within one raw unit of `taker_amount * units / 100_000`.
fn fee_within_tolerance(order: &SignedOrder, units: u64) -> bool {
    let Some(expected) = order
        .taker_amount
        .mul_div(Amount::from(units), Amount::from(FEE_UNIT_DENOMINATOR))
    else {
        return false;
    };
    let low = expected.saturating_sub(Amount::from(1));
    let high = expected.saturating_add(Amount::from(1));
    (low..=high).contains(&order.taker_token_fee_amount)
}
