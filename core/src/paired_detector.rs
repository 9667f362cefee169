//! Paired-transaction detector.
//!
//! Bank transfers usually record the counterpart's transaction id. Two
//! records that point at each other, belong to different customers and sit
//! close together in time are one transfer seen from both ledgers.
//!
//! For each T with a related transaction id, the counterpart U must:
//!   - have U.transaction_id == T.related_transaction_id
//!   - belong to a different customer
//!   - point back: U.related_transaction_id == T.transaction_id
//!   - be recorded within `window` of T, on either side
//!
//! The window covers the pair as a whole, so when the legs are too far
//! apart neither side produces an edge. The first qualifying U in feed
//! order wins. The edge runs from U's owner
//! to T's owner and is labelled with U's transaction type.

use crate::{
    detector::RelationDetector,
    transaction::{RelatedCustomer, RelationType, Transaction},
};
use chrono::Duration;

pub fn default_window() -> Duration {
    Duration::hours(1)
}

pub struct PairedTransactionDetector {
    window: Duration,
}

impl PairedTransactionDetector {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// True when `u` is a valid counterpart for `t`.
    pub fn is_counterpart(&self, t: &Transaction, u: &Transaction) -> bool {
        Some(u.transaction_id) == t.related_transaction_id()
            && u.customer_id != t.customer_id
            && u.related_transaction_id() == Some(t.transaction_id)
            && self.within_window(t, u)
    }

    fn within_window(&self, t: &Transaction, u: &Transaction) -> bool {
        u.transaction_date
            .signed_duration_since(t.transaction_date)
            .abs()
            <= self.window
    }

    /// First counterpart of `t` in feed order.
    pub fn find_counterpart<'a>(
        &self,
        t: &Transaction,
        transactions: &'a [Transaction],
    ) -> Option<&'a Transaction> {
        transactions.iter().find(|u| self.is_counterpart(t, u))
    }

    pub fn pair_edge(counterpart: &Transaction, origin: &Transaction) -> RelatedCustomer {
        RelatedCustomer {
            customer_id: counterpart.customer_id,
            related_customer_id: origin.customer_id,
            relation_type: RelationType::Transfer(counterpart.transaction_type),
            transaction_id: Some(counterpart.transaction_id),
            related_transaction_id: Some(origin.transaction_id),
        }
    }

    pub fn by_related_transaction(&self, transactions: &[Transaction]) -> Vec<RelatedCustomer> {
        transactions
            .iter()
            .filter(|t| t.related_transaction_id().is_some())
            .filter_map(|t| {
                self.find_counterpart(t, transactions)
                    .map(|u| Self::pair_edge(u, t))
            })
            .collect()
    }
}

impl Default for PairedTransactionDetector {
    fn default() -> Self {
        Self::new(default_window())
    }
}

impl RelationDetector for PairedTransactionDetector {
    fn name(&self) -> &'static str {
        "paired_transaction"
    }

    fn detect(&self, transactions: &[Transaction]) -> Vec<RelatedCustomer> {
        self.by_related_transaction(transactions)
    }
}

/// Paired-transaction edges with the default one-hour window.
pub fn by_related_transaction(transactions: &[Transaction]) -> Vec<RelatedCustomer> {
    PairedTransactionDetector::default().by_related_transaction(transactions)
}
