//! Markets and order sides
//!
//! A market is a (base, quote) token pair. A bid is a maker buying base
//! with quote (`taker_token == base`, `maker_token == quote`); an ask is the
//! converse.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::Address;
use crate::order::SignedOrder;

/// Side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Maker pays quote for base.
    Bid,
    /// Maker sells base for quote.
    Ask,
}

/// A (base, quote) token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub base_token: Address,
    pub quote_token: Address,
}

impl Market {
    pub fn new(base_token: Address, quote_token: Address) -> Self {
        Self {
            base_token,
            quote_token,
        }
    }

    /// `(maker_token, taker_token)` an order must carry to rest on `side`.
    pub fn tokens_for(&self, side: Side) -> (Address, Address) {
        match side {
            Side::Bid => (self.quote_token, self.base_token),
            Side::Ask => (self.base_token, self.quote_token),
        }
    }

    /// Which side of this market an order belongs to, if any.
    pub fn side_of(&self, order: &SignedOrder) -> Option<Side> {
        let pair = (order.maker_token, order.taker_token);
        if pair == self.tokens_for(Side::Bid) {
            Some(Side::Bid)
        } else if pair == self.tokens_for(Side::Ask) {
            Some(Side::Ask)
        } else {
            None
        }
    }

    /// Base and quote are the same token.
    pub fn is_degenerate(&self) -> bool {
        self.base_token == self.quote_token
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base_token, self.quote_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::OrderHash;
    use crate::numeric::Amount;

    fn order(maker_token: Address, taker_token: Address) -> SignedOrder {
        SignedOrder {
            maker: Address::from_low_u64(1),
            taker: Address::NULL,
            maker_token,
            taker_token,
            maker_amount: Amount::from(1),
            taker_amount: Amount::from(1),
            taker_token_fee_amount: Amount::ZERO,
            fee_recipient: Address::NULL,
            expiry: 0,
            salt: Amount::ZERO,
            hash: OrderHash::default(),
        }
    }

    #[test]
    fn test_side_of() {
        let base = Address::from_low_u64(100);
        let quote = Address::from_low_u64(200);
        let other = Address::from_low_u64(300);
        let market = Market::new(base, quote);

        assert_eq!(market.side_of(&order(quote, base)), Some(Side::Bid));
        assert_eq!(market.side_of(&order(base, quote)), Some(Side::Ask));
        assert_eq!(market.side_of(&order(base, other)), None);
    }

    #[test]
    fn test_degenerate_market() {
        let a = Address::from_low_u64(1);
        assert!(Market::new(a, a).is_degenerate());
        assert!(!Market::new(a, Address::from_low_u64(2)).is_degenerate());
    }
}
