//! Collateral-adjusted fillability
//!
//! Walks ranked orders left to right against one collateral ledger. Each
//! order sees the ledger as left by every higher-priority order before it,
//! so orders from the same maker on the same token compete for one pool of
//! real collateral in priority order.
//!
//! Per order, with `key = (maker, maker_token)`:
//! 1. `implied = maker_amount * remaining / taker_amount` (truncating).
//! 2. `available = ledger[key]`, zero when absent.
//! 3. If `available > 0`: when `implied > available`, scale remaining down
//!    to `available * taker_amount / maker_amount`; then decrement the slot
//!    by `implied`, the pre-clip amount.
//! 4. Otherwise remaining becomes zero and the ledger is untouched.
//!
//! Step 3 charges the pre-clip amount even when the order was clipped. The
//! slot saturates at zero, which every later order treats the same as a
//! negative balance.
//!
//! An order with a zero maker or taker amount has no price. It is forced
//! to zero remaining and never touches the ledger.

use tracing::debug;
use types::numeric::Amount;
use types::order::AnnotatedOrder;

use crate::collateral::{CollateralKey, CollateralLedger};
use crate::metrics::FillOutcome;

/// One order after its fold step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldStep {
    pub order: AnnotatedOrder,
    pub outcome: FillOutcome,
}

/// Output of folding a whole sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldResult {
    pub orders: Vec<AnnotatedOrder>,
    pub ledger: CollateralLedger,
}

/// Sequential fold state. Owns the ledger for the duration of a pass.
#[derive(Debug, Clone, Default)]
pub struct FillabilityFold {
    ledger: CollateralLedger,
}

impl FillabilityFold {
    pub fn new(ledger: CollateralLedger) -> Self {
        Self { ledger }
    }

    /// Apply one order against the current ledger.
    pub fn step(&mut self, mut annotated: AnnotatedOrder) -> FoldStep {
        let order = &annotated.order;
        let key = CollateralKey::maker_side(order);
        let remaining = annotated.remaining_fillable_taker_amount();

        if order.maker_amount.is_zero() || order.taker_amount.is_zero() {
            debug!(order_hash = %annotated.hash(), "Order has no price, unfillable");
            annotated.set_remaining_fillable_taker_amount(Amount::ZERO);
            return FoldStep {
                order: annotated,
                outcome: FillOutcome::Unfillable,
            };
        }

        let implied_maker_amount = order
            .maker_amount
            .mul_div(remaining, order.taker_amount)
            .unwrap_or(Amount::ZERO);
        let available = self.ledger.available(&key);

        if available.is_zero() {
            debug!(
                order_hash = %annotated.hash(),
                maker = %key.holder,
                token = %key.token,
                "No collateral left, order unfillable"
            );
            annotated.set_remaining_fillable_taker_amount(Amount::ZERO);
            return FoldStep {
                order: annotated,
                outcome: FillOutcome::Unfillable,
            };
        }

        let mut outcome = FillOutcome::Covered;
        if implied_maker_amount > available {
            let clipped = available
                .mul_div(order.taker_amount, order.maker_amount)
                .unwrap_or(Amount::ZERO);
            debug!(
                order_hash = %annotated.hash(),
                %available,
                implied = %implied_maker_amount,
                %clipped,
                "Clipping order to available collateral"
            );
            annotated.set_remaining_fillable_taker_amount(clipped);
            outcome = FillOutcome::Clipped;
        }
        self.ledger.consume(key, implied_maker_amount);

        FoldStep {
            order: annotated,
            outcome,
        }
    }

    pub fn ledger(&self) -> &CollateralLedger {
        &self.ledger
    }

    pub fn into_ledger(self) -> CollateralLedger {
        self.ledger
    }
}

/// Fold every order in sequence, returning the adjusted orders and the
/// residual ledger.
pub fn fold_fillability(
    orders: impl IntoIterator<Item = AnnotatedOrder>,
    ledger: CollateralLedger,
) -> FoldResult {
    let mut fold = FillabilityFold::new(ledger);
    let orders = orders.into_iter().map(|o| fold.step(o).order).collect();
    FoldResult {
        orders,
        ledger: fold.into_ledger(),
    }
}
