//! Bid and ask priority
//!
//! One ordering serves both display priority and the right to draw on a
//! maker's shared collateral first.
//!
//! - Bids: `maker_amount / taker_amount` (quote paid per base) descending.
//! - Asks: `taker_amount / maker_amount` (quote asked per base) ascending.
//! - Orders with a zero amount have no defined price and sort after all
//!   priced orders.
//! - Ties break on hash ascending, which makes the order total.

use std::cmp::Ordering;

use types::market::Side;
use types::numeric::cmp_ratio;
use types::order::SignedOrder;

/// Deterministic comparator for one side of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRanker {
    side: Side,
}

impl OrderRanker {
    pub fn new(side: Side) -> Self {
        Self { side }
    }

    /// `Less` means `a` has priority over `b`.
    pub fn compare(&self, a: &SignedOrder, b: &SignedOrder) -> Ordering {
        let unpriced = |o: &SignedOrder| o.maker_amount.is_zero() || o.taker_amount.is_zero();

        unpriced(a)
            .cmp(&unpriced(b))
            .then_with(|| {
                if unpriced(a) {
                    return Ordering::Equal;
                }
                match self.side {
                    // Higher maker/taker first
                    Side::Bid => cmp_ratio(b.maker_amount, b.taker_amount, a.maker_amount, a.taker_amount),
                    // Lower taker/maker first
                    Side::Ask => cmp_ratio(a.taker_amount, a.maker_amount, b.taker_amount, b.maker_amount),
                }
            })
            .then_with(|| a.hash.cmp(&b.hash))
    }

    /// Sort `orders` best first.
    pub fn rank(&self, mut orders: Vec<SignedOrder>) -> Vec<SignedOrder> {
        orders.sort_by(|a, b| self.compare(a, b));
        orders
    }
}
