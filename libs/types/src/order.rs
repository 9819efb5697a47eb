//! Signed off-chain order types
//!
//! A `SignedOrder` is the immutable record produced by order intake. An
//! aggregation pass pairs each one with a fresh `OrderState` to form an
//! `AnnotatedOrder`; the state is the only thing a pass mutates.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ids::{Address, OrderHash};
use crate::numeric::Amount;

/// Immutable signed limit order.
///
/// The maker offers `maker_amount` of `maker_token` in exchange for
/// `taker_amount` of `taker_token`. Amounts are raw integer units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrder {
    pub maker: Address,
    /// Restricts who may fill. `Address::NULL` means anyone.
    pub taker: Address,
    pub maker_token: Address,
    pub taker_token: Address,
    pub maker_amount: Amount,
    pub taker_amount: Amount,
    pub taker_token_fee_amount: Amount,
    pub fee_recipient: Address,
    /// Unix seconds.
    pub expiry: u64,
    pub salt: Amount,
    pub hash: OrderHash,
}

impl SignedOrder {
    /// Derive the content hash from every other field.
    ///
    /// Encoding: addresses as 20 raw bytes, amounts as 32-byte big-endian
    /// words, expiry as an 8-byte big-endian integer, hashed with SHA-256.
    pub fn compute_hash(&self) -> OrderHash {
        let mut hasher = Sha256::new();
        for address in [
            &self.maker,
            &self.taker,
            &self.maker_token,
            &self.taker_token,
            &self.fee_recipient,
        ] {
            hasher.update(address.as_bytes());
        }
        for amount in [
            &self.maker_amount,
            &self.taker_amount,
            &self.taker_token_fee_amount,
            &self.salt,
        ] {
            let mut word = [0u8; 32];
            amount.as_u256().to_big_endian(&mut word);
            hasher.update(word);
        }
        hasher.update(self.expiry.to_be_bytes());
        OrderHash::from_bytes(hasher.finalize().into())
    }

    /// Replace `hash` with the content hash.
    pub fn with_computed_hash(mut self) -> Self {
        self.hash = self.compute_hash();
        self
    }
}

/// Per-pass mutable state of an order.
///
/// Invariant: `0 <= remaining_fillable_taker_amount <= order.taker_amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderState {
    pub remaining_fillable_taker_amount: Amount,
}

/// An order together with its state for the current pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedOrder {
    pub order: SignedOrder,
    #[serde(rename = "metaData")]
    meta: OrderState,
}

impl AnnotatedOrder {
    /// Start a pass with the full nominal size remaining.
    pub fn unfilled(order: SignedOrder) -> Self {
        let meta = OrderState {
            remaining_fillable_taker_amount: order.taker_amount,
        };
        Self { order, meta }
    }

    pub fn hash(&self) -> OrderHash {
        self.order.hash
    }

    pub fn remaining_fillable_taker_amount(&self) -> Amount {
        self.meta.remaining_fillable_taker_amount
    }

    /// Set the remaining fillable size, clamped to `order.taker_amount`.
    pub fn set_remaining_fillable_taker_amount(&mut self, amount: Amount) {
        self.meta.remaining_fillable_taker_amount = amount.min(self.order.taker_amount);
    }
}
