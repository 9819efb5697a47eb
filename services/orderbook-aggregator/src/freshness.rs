//! Expiry filtering
//!
//! An order is expired once `expiry <= now + buffer`. Expired orders are
//! handed to the alerter and never reach ranking or the fold.

use types::order::SignedOrder;

use crate::collaborators::ExpiryAlerter;

/// Result of partitioning orders by expiry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreshnessPartition {
    pub fresh: Vec<SignedOrder>,
    pub expired: Vec<SignedOrder>,
}

/// Splits orders into fresh and expired relative to a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessFilter {
    cutoff: u64,
}

impl FreshnessFilter {
    /// Orders with `expiry <= now + buffer_secs` count as expired.
    pub fn new(now: u64, buffer_secs: u64) -> Self {
        Self {
            cutoff: now.saturating_add(buffer_secs),
        }
    }

    pub fn is_expired(&self, order: &SignedOrder) -> bool {
        order.expiry <= self.cutoff
    }

    /// Partition `orders`, keeping input order within each half.
    pub fn partition(&self, orders: Vec<SignedOrder>) -> FreshnessPartition {
        let (expired, fresh) = orders.into_iter().partition(|o| self.is_expired(o));
        FreshnessPartition { fresh, expired }
    }

    /// Partition, report the expired half, and return only fresh orders.
    pub fn retain_fresh(&self, orders: Vec<SignedOrder>, alerter: &dyn ExpiryAlerter) -> Vec<SignedOrder> {
        let FreshnessPartition { fresh, expired } = self.partition(orders);
        if !expired.is_empty() {
            alerter.report_expired(&expired);
        }
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use types::ids::{Address, OrderHash};
    use types::numeric::Amount;

    #[derive(Default)]
    struct RecordingAlerter(Mutex<Vec<u64>>);

    impl ExpiryAlerter for RecordingAlerter {
        fn report_expired(&self, orders: &[SignedOrder]) {
            self.0.lock().unwrap().extend(orders.iter().map(|o| o.expiry));
        }
    }

    fn order(expiry: u64) -> SignedOrder {
        SignedOrder {
            maker: Address::from_low_u64(1),
            taker: Address::NULL,
            maker_token: Address::from_low_u64(2),
            taker_token: Address::from_low_u64(3),
            maker_amount: Amount::from(1),
            taker_amount: Amount::from(1),
            taker_token_fee_amount: Amount::ZERO,
            fee_recipient: Address::NULL,
            expiry,
            salt: Amount::from(expiry),
            hash: OrderHash::default(),
        }
        .with_computed_hash()
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let now = 1_700_000_000;
        let filter = FreshnessFilter::new(now, 0);
        assert!(filter.is_expired(&order(now - 1)));
    }

    #[test]
    fn test_buffer_boundary_is_expired() {
        let now = 1_700_000_000;
        let filter = FreshnessFilter::new(now, 10);
        assert!(filter.is_expired(&order(now + 10)));
        assert!(!filter.is_expired(&order(now + 11)));
    }

    #[test]
    fn test_partition_keeps_order() {
        let filter = FreshnessFilter::new(100, 0);
        let partition = filter.partition(vec![order(50), order(200), order(100), order(300)]);
        let fresh: Vec<u64> = partition.fresh.iter().map(|o| o.expiry).collect();
        let expired: Vec<u64> = partition.expired.iter().map(|o| o.expiry).collect();
        assert_eq!(fresh, vec![200, 300]);
        assert_eq!(expired, vec![50, 100]);
    }

    #[test]
    fn test_retain_fresh_reports_expired() {
        let alerter = RecordingAlerter::default();
        let filter = FreshnessFilter::new(100, 0);
        let fresh = filter.retain_fresh(vec![order(99), order(101)], &alerter);
        assert_eq!(fresh.len(), 1);
        assert_eq!(*alerter.0.lock().unwrap(), vec![99]);
    }

    #[test]
    fn test_no_report_when_nothing_expired() {
        let alerter = RecordingAlerter::default();
        let filter = FreshnessFilter::new(100, 0);
        filter.retain_fresh(vec![order(500)], &alerter);
        assert!(alerter.0.lock().unwrap().is_empty());
    }
}
