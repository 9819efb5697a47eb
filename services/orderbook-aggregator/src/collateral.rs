//! Collateral ledger and oracle snapshot
//!
//! The ledger maps `(holder, token)` to the amount the holder can actually
//! move right now. It is sampled once per pass, then consumed in place by
//! the fillability fold. Values never go below zero.

use std::collections::{BTreeMap, BTreeSet};

use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, error};
use types::errors::CollaboratorFailure;
use types::ids::Address;
use types::numeric::Amount;
use types::order::SignedOrder;

use crate::collaborators::CollateralOracle;

/// A `(holder, token)` slot in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CollateralKey {
    pub holder: Address,
    pub token: Address,
}

impl CollateralKey {
    pub fn new(holder: Address, token: Address) -> Self {
        Self { holder, token }
    }

    /// The slot an order draws on when filled: the maker's maker token.
    pub fn maker_side(order: &SignedOrder) -> Self {
        Self::new(order.maker, order.maker_token)
    }
}

/// Request-scoped collateral balances.
///
/// Backed by a `BTreeMap` so iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollateralLedger {
    balances: BTreeMap<CollateralKey, Amount>,
}

impl CollateralLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Available amount for `key`; absent slots hold zero.
    pub fn available(&self, key: &CollateralKey) -> Amount {
        self.balances.get(key).copied().unwrap_or(Amount::ZERO)
    }

    pub fn set(&mut self, key: CollateralKey, amount: Amount) {
        self.balances.insert(key, amount);
    }

    /// Decrease `key` by `amount`, stopping at zero.
    pub fn consume(&mut self, key: CollateralKey, amount: Amount) {
        let slot = self.balances.entry(key).or_insert(Amount::ZERO);
        *slot = slot.saturating_sub(amount);
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CollateralKey, &Amount)> {
        self.balances.iter()
    }
}

impl FromIterator<(CollateralKey, Amount)> for CollateralLedger {
    fn from_iter<I: IntoIterator<Item = (CollateralKey, Amount)>>(iter: I) -> Self {
        Self {
            balances: iter.into_iter().collect(),
        }
    }
}

/// Number of oracle calls needed for `keys` slots at `batch_len` per call.
pub fn batch_count(keys: usize, batch_len: usize) -> usize {
    keys.div_ceil(batch_len.max(1))
}

/// Snapshot collateral for every key from the oracle.
///
/// Keys are split into batches of at most `batch_len`, all batches are
/// requested concurrently, and results are reassembled in key order. Any
/// failed or short batch fails the whole snapshot.
pub async fn fetch_ledger(
    oracle: &dyn CollateralOracle,
    keys: &BTreeSet<CollateralKey>,
    spender: Address,
    batch_len: usize,
) -> Result<CollateralLedger, CollaboratorFailure> {
    if keys.is_empty() {
        return Ok(CollateralLedger::new());
    }

    let keys: Vec<CollateralKey> = keys.iter().copied().collect();
    let batch_len = batch_len.max(1);

    debug!(
        keys = keys.len(),
        batch_len,
        batches = batch_count(keys.len(), batch_len),
        "Fetching collateral snapshot"
    );

    let requests = keys.chunks(batch_len).enumerate().map(|(index, chunk)| async move {
        let holders: Vec<Address> = chunk.iter().map(|k| k.holder).collect();
        let tokens: Vec<Address> = chunk.iter().map(|k| k.token).collect();

        let amounts = oracle
            .min_available(&holders, &tokens, spender)
            .await
            .map_err(|err| {
                error!(batch = index, error = %err, "Collateral batch failed");
                err
            })?;

        if amounts.len() != chunk.len() {
            error!(
                batch = index,
                expected = chunk.len(),
                actual = amounts.len(),
                "Collateral batch length mismatch"
            );
            return Err(CollaboratorFailure::collateral_oracle(format!(
                "batch {index} returned {} amounts for {} pairs",
                amounts.len(),
                chunk.len()
            )));
        }
        Ok(amounts)
    });

    let batches = try_join_all(requests).await?;

    Ok(keys
        .into_iter()
        .zip(batches.into_iter().flatten())
        .collect())
}
