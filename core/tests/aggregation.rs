//! Transaction aggregator tests.
//!
//! Tests cover: lifecycle grouping, per-customer isolation of reused
//! authorization codes, chronological ordering, the singleton rule,
//! tie-breaking on equal timestamps, and output order.

use chrono::{DateTime, Duration, FixedOffset};
use feedlens_core::{
    aggregate,
    aggregation::{partition_by_authorization, partition_by_customer, sort_lifecycle},
    validation::check_aggregate,
    Metadata, Transaction, TransactionStatus, TransactionType,
};

fn at(hours: i64) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2022-09-01T09:00:00+00:00").unwrap() + Duration::hours(hours)
}

fn txn(
    transaction_id: i64,
    customer_id: i64,
    code: &str,
    hours: i64,
    status: TransactionStatus,
) -> Transaction {
    Transaction {
        transaction_id,
        authorization_code: code.to_string(),
        transaction_date: at(hours),
        customer_id,
        transaction_type: TransactionType::Pos,
        transaction_status: status,
        description: format!("Purchase {transaction_id}"),
        amount: -10.0 * transaction_id as f64,
        metadata: Metadata::default(),
    }
}

/// PENDING -> SETTLED -> RETURNED at hours 0, 1, 2 collapses into one record.
#[test]
fn three_step_lifecycle_collapses_into_one_aggregate() {
    let feed = vec![
        txn(1, 1, "F00001", 0, TransactionStatus::Pending),
        txn(2, 1, "F00001", 1, TransactionStatus::Settled),
        txn(3, 1, "F00001", 2, TransactionStatus::Returned),
        txn(4, 1, "F00002", 3, TransactionStatus::Settled),
    ];

    let aggregates = aggregate(&feed);
    assert_eq!(aggregates.len(), 2);

    let lifecycle = &aggregates[0];
    assert_eq!(lifecycle.authorization_code, "F00001");
    assert_eq!(lifecycle.created_at, at(0));
    assert_eq!(lifecycle.updated_at, Some(at(2)));
    assert_eq!(lifecycle.status, TransactionStatus::Returned);
    assert_eq!(lifecycle.transaction_id, 1);
    assert_eq!(lifecycle.description, "Purchase 1");
    assert_eq!(lifecycle.timeline.len(), 3);
    let statuses: Vec<_> = lifecycle.timeline.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            TransactionStatus::Pending,
            TransactionStatus::Settled,
            TransactionStatus::Returned
        ]
    );
    assert_eq!(lifecycle.timeline[1].amount, -20.0);

    let single = &aggregates[1];
    assert_eq!(single.authorization_code, "F00002");
    assert_eq!(single.updated_at, None);
    assert_eq!(single.timeline.len(), 1);
    assert_eq!(single.status, TransactionStatus::Settled);
}

/// Identity comes from the earliest record even when the feed is out of order.
#[test]
fn out_of_order_feed_is_sorted_chronologically() {
    let feed = vec![
        txn(30, 1, "F00009", 2, TransactionStatus::Returned),
        txn(10, 1, "F00009", 0, TransactionStatus::Pending),
        txn(20, 1, "F00009", 1, TransactionStatus::Settled),
    ];

    let aggregates = aggregate(&feed);
    assert_eq!(aggregates.len(), 1);
    let agg = &aggregates[0];
    assert_eq!(agg.transaction_id, 10);
    assert_eq!(agg.created_at, at(0));
    assert_eq!(agg.updated_at, Some(at(2)));
    assert_eq!(agg.status, TransactionStatus::Returned);
    assert!(agg.timeline.windows(2).all(|w| w[0].created_at <= w[1].created_at));
}

/// The same authorization code on two customers is two lifecycles.
#[test]
fn reused_authorization_code_is_split_by_customer() {
    let feed = vec![
        txn(1, 1, "F00001", 0, TransactionStatus::Pending),
        txn(1, 2, "F00001", 0, TransactionStatus::Settled),
        txn(2, 1, "F00001", 1, TransactionStatus::Settled),
    ];

    let aggregates = aggregate(&feed);
    assert_eq!(aggregates.len(), 2);

    assert_eq!(aggregates[0].customer_id, 1);
    assert_eq!(aggregates[0].timeline.len(), 2);
    assert_eq!(aggregates[0].status, TransactionStatus::Settled);

    assert_eq!(aggregates[1].customer_id, 2);
    assert_eq!(aggregates[1].timeline.len(), 1);
    assert_eq!(aggregates[1].updated_at, None);
}

/// Every feed record lands in exactly one aggregate timeline.
#[test]
fn every_transaction_lands_in_exactly_one_lifecycle() {
    let feed = vec![
        txn(1, 1, "F00001", 0, TransactionStatus::Pending),
        txn(2, 2, "F00001", 1, TransactionStatus::Pending),
        txn(3, 1, "F00002", 2, TransactionStatus::Settled),
        txn(4, 2, "F00001", 3, TransactionStatus::Settled),
        txn(5, 1, "F00001", 4, TransactionStatus::Settled),
        txn(6, 3, "F00003", 5, TransactionStatus::Settled),
    ];

    let aggregates = aggregate(&feed);
    let total_entries: usize = aggregates.iter().map(|a| a.timeline.len()).sum();
    assert_eq!(total_entries, feed.len());

    for t in &feed {
        let owners = aggregates
            .iter()
            .filter(|a| {
                a.customer_id == t.customer_id
                    && a.authorization_code == t.authorization_code
                    && a.timeline.iter().any(|e| e.created_at == t.transaction_date)
            })
            .count();
        assert_eq!(owners, 1, "transaction {} not in exactly one lifecycle", t.transaction_id);
    }

    for agg in &aggregates {
        assert!(check_aggregate(agg).is_empty(), "invariants broken: {agg:?}");
    }
}

/// Output follows first-seen customer, then first-seen code within it.
#[test]
fn output_order_is_first_seen_customer_then_code() {
    let feed = vec![
        txn(1, 7, "F00002", 0, TransactionStatus::Settled),
        txn(2, 3, "F00001", 1, TransactionStatus::Settled),
        txn(3, 7, "F00001", 2, TransactionStatus::Settled),
        txn(4, 3, "F00003", 3, TransactionStatus::Settled),
    ];

    let keys: Vec<(i64, String)> = aggregate(&feed)
        .into_iter()
        .map(|a| (a.customer_id, a.authorization_code))
        .collect();
    assert_eq!(
        keys,
        vec![
            (7, "F00002".to_string()),
            (7, "F00001".to_string()),
            (3, "F00001".to_string()),
            (3, "F00003".to_string()),
        ]
    );
}

/// Equal timestamps keep feed order: the later record decides the status.
#[test]
fn equal_timestamps_keep_feed_order() {
    let feed = vec![
        txn(1, 1, "F00001", 0, TransactionStatus::Pending),
        txn(2, 1, "F00001", 0, TransactionStatus::Settled),
    ];

    let owned = partition_by_customer(&feed);
    let mut groups = partition_by_authorization(&owned[0].1);
    sort_lifecycle(&mut groups[0].1);
    let ids: Vec<i64> = groups[0].1.iter().map(|t| t.transaction_id).collect();
    assert_eq!(ids, vec![1, 2]);

    let aggregates = aggregate(&feed);
    assert_eq!(aggregates[0].transaction_id, 1);
    assert_eq!(aggregates[0].status, TransactionStatus::Settled);
    // Same instant at both ends: the ordering invariant cannot hold.
    assert_eq!(aggregates[0].updated_at, Some(aggregates[0].created_at));
}

#[test]
fn aggregation_is_deterministic() {
    let feed = vec![
        txn(1, 1, "F00001", 0, TransactionStatus::Pending),
        txn(2, 2, "F00002", 1, TransactionStatus::Settled),
        txn(3, 1, "F00001", 2, TransactionStatus::Settled),
    ];
    assert_eq!(aggregate(&feed), aggregate(&feed));
}

#[test]
fn empty_feed_yields_no_aggregates() {
    assert!(aggregate(&[]).is_empty());
}
