//! Order store filters
//!
//! A fixed set of recognized fields. Stores translate this into their own
//! query language; `matches` is the reference semantics.

use types::ids::Address;
use types::market::Market;
use types::order::SignedOrder;

/// Conjunction of optional field constraints over signed orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub maker: Option<Address>,
    pub taker: Option<Address>,
    pub maker_token: Option<Address>,
    pub taker_token: Option<Address>,
    pub fee_recipient: Option<Address>,
    /// Keep orders with `expiry >= min_expiry`.
    pub min_expiry: Option<u64>,
    /// Keep orders trading this pair in either direction.
    pub token_pair: Option<Market>,
}

impl OrderFilter {
    /// Orders on either side of a market.
    pub fn pair(market: Market) -> Self {
        Self {
            token_pair: Some(market),
            ..Self::default()
        }
    }

    pub fn matches(&self, order: &SignedOrder) -> bool {
        fn field_ok(want: Option<Address>, have: Address) -> bool {
            want.map_or(true, |w| w == have)
        }

        field_ok(self.maker, order.maker)
            && field_ok(self.taker, order.taker)
            && field_ok(self.maker_token, order.maker_token)
            && field_ok(self.taker_token, order.taker_token)
            && field_ok(self.fee_recipient, order.fee_recipient)
            && self.min_expiry.map_or(true, |min| order.expiry >= min)
            && self
                .token_pair
                .map_or(true, |market| market.side_of(order).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::OrderHash;
    use types::numeric::Amount;

    fn order(maker_token: u64, taker_token: u64, expiry: u64) -> SignedOrder {
        SignedOrder {
            maker: Address::from_low_u64(1),
            taker: Address::NULL,
            maker_token: Address::from_low_u64(maker_token),
            taker_token: Address::from_low_u64(taker_token),
            maker_amount: Amount::from(1),
            taker_amount: Amount::from(1),
            taker_token_fee_amount: Amount::ZERO,
            fee_recipient: Address::NULL,
            expiry,
            salt: Amount::ZERO,
            hash: OrderHash::default(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(OrderFilter::default().matches(&order(1, 2, 0)));
    }

    #[test]
    fn test_token_fields_are_directional() {
        let filter = OrderFilter {
            maker_token: Some(Address::from_low_u64(20)),
            taker_token: Some(Address::from_low_u64(10)),
            ..OrderFilter::default()
        };
        assert!(filter.matches(&order(20, 10, 0)));
        assert!(!filter.matches(&order(10, 20, 0)));
    }

    #[test]
    fn test_pair_filter_matches_both_directions() {
        let market = Market::new(Address::from_low_u64(10), Address::from_low_u64(20));
        let filter = OrderFilter::pair(market);
        assert!(filter.matches(&order(20, 10, 0)));
        assert!(filter.matches(&order(10, 20, 0)));
        assert!(!filter.matches(&order(10, 30, 0)));
    }

    #[test]
    fn test_min_expiry() {
        let filter = OrderFilter {
            min_expiry: Some(100),
            ..OrderFilter::default()
        };
        assert!(filter.matches(&order(1, 2, 100)));
        assert!(!filter.matches(&order(1, 2, 99)));
    }
}
