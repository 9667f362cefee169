//! Device-sharing detector.
//!
//! Customers whose transactions carry the same device id are related.
//!   1. with_device     drop transactions without a device id
//!   2. group_by_device first-seen device order
//!   3. shared_devices  drop devices seen on fewer than 2 transactions
//!   4. device_edges    T -> U for every pair of members with different owners
//!
//! A device used by a single customer, however often, yields no edges.
//! Repeated transactions by the same customer repeat their edges; the
//! query layer decides whether to collapse them.

use crate::{
    detector::RelationDetector,
    grouping::group_first_seen,
    transaction::{RelatedCustomer, Transaction},
};

const MIN_DEVICE_GROUP: usize = 2;

pub struct DeviceDetector;

pub fn with_device(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(|t| t.device_id().is_some())
}

pub fn group_by_device<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<(String, Vec<&'a Transaction>)> {
    group_first_seen(transactions, |t| t.device_id().unwrap_or_default().to_string())
}

pub fn shared_devices<'a>(
    groups: Vec<(String, Vec<&'a Transaction>)>,
) -> Vec<(String, Vec<&'a Transaction>)> {
    groups
        .into_iter()
        .filter(|(_, members)| members.len() >= MIN_DEVICE_GROUP)
        .collect()
}

/// Fully connected directed edges between the distinct owners on one device.
pub fn device_edges(members: &[&Transaction]) -> Vec<RelatedCustomer> {
    let mut edges = Vec::new();
    for t in members {
        for u in members {
            if u.customer_id != t.customer_id {
                edges.push(RelatedCustomer::device(t.customer_id, u.customer_id));
            }
        }
    }
    edges
}

pub fn by_device(transactions: &[Transaction]) -> Vec<RelatedCustomer> {
    shared_devices(group_by_device(with_device(transactions)))
        .iter()
        .flat_map(|(_, members)| device_edges(members))
        .collect()
}

impl RelationDetector for DeviceDetector {
    fn name(&self) -> &'static str {
        "device"
    }

    fn detect(&self, transactions: &[Transaction]) -> Vec<RelatedCustomer> {
        by_device(transactions)
    }
}
