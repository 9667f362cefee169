//! Transaction aggregator.
//!
//! Collapses the feed into one `AggregatedTransaction` per
//! (customer, authorization code) lifecycle. Steps, in order:
//!   1. partition_by_customer       (authorization codes are reused across customers)
//!   2. partition_by_authorization  (one group = one lifecycle)
//!   3. sort_lifecycle              (stable, ascending transaction_date)
//!   4. build_aggregate             (head -> identity, tail -> status/updated_at)
//!
//! Output order: first-seen customer, then first-seen authorization code
//! within that customer.

use crate::{
    grouping::group_first_seen,
    transaction::{AggregatedTransaction, TimelineEntry, Transaction},
    types::CustomerId,
};

/// Split the feed by owner, first-seen customer order.
pub fn partition_by_customer<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<(CustomerId, Vec<&'a Transaction>)> {
    group_first_seen(transactions, |t| t.customer_id)
}

/// Split one customer's transactions into lifecycles.
pub fn partition_by_authorization<'a>(
    transactions: &[&'a Transaction],
) -> Vec<(String, Vec<&'a Transaction>)> {
    group_first_seen(transactions.iter().copied(), |t| t.authorization_code.clone())
}

/// Order a lifecycle chronologically. The sort is stable: transactions with
/// equal timestamps keep their feed order.
pub fn sort_lifecycle(group: &mut [&Transaction]) {
    group.sort_by_key(|t| t.transaction_date);
}

/// Build the aggregate for a chronologically sorted lifecycle.
/// Returns `None` only for an empty group.
pub fn build_aggregate(group: &[&Transaction]) -> Option<AggregatedTransaction> {
    let head = group.first()?;
    let last = group.last()?;

    Some(AggregatedTransaction {
        created_at:         head.transaction_date,
        updated_at:         (group.len() > 1).then_some(last.transaction_date),
        customer_id:        head.customer_id,
        transaction_id:     head.transaction_id,
        authorization_code: head.authorization_code.clone(),
        status:             last.transaction_status,
        description:        head.description.clone(),
        transaction_type:   head.transaction_type,
        timeline:           group.iter().map(|t| TimelineEntry::from(*t)).collect(),
    })
}

pub fn aggregate(transactions: &[Transaction]) -> Vec<AggregatedTransaction> {
    let mut out = Vec::new();

    for (customer_id, owned) in partition_by_customer(transactions) {
        for (authorization_code, mut group) in partition_by_authorization(&owned) {
            sort_lifecycle(&mut group);
            match build_aggregate(&group) {
                Some(agg) => out.push(agg),
                None => log::warn!(
                    "dropping empty lifecycle customer={customer_id} auth={authorization_code}"
                ),
            }
        }
    }

    log::debug!(
        "aggregate: {} transactions -> {} lifecycles",
        transactions.len(),
        out.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_group_builds_nothing() {
        assert!(build_aggregate(&[]).is_none());
    }

    #[test]
    fn empty_feed_aggregates_to_nothing() {
        assert!(aggregate(&[]).is_empty());
    }
}
