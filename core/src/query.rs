//! Query layer: per-customer views over aggregator and detector output.

use crate::{
    config::RelationDedup,
    transaction::{AggregatedTransaction, RelatedCustomer, RelationType},
    types::CustomerId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Slim relation record returned per customer: the owner is implied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRelationView {
    pub related_customer_id: CustomerId,
    pub relation_type: RelationType,
}

impl From<&RelatedCustomer> for CustomerRelationView {
    fn from(r: &RelatedCustomer) -> Self {
        Self {
            related_customer_id: r.related_customer_id,
            relation_type: r.relation_type,
        }
    }
}

pub fn aggregates_for_customer(
    aggregates: &[AggregatedTransaction],
    customer_id: CustomerId,
) -> Vec<AggregatedTransaction> {
    aggregates
        .iter()
        .filter(|a| a.customer_id == customer_id)
        .cloned()
        .collect()
}

/// Collapse edges sharing (customer, related customer, relation type),
/// keeping the first occurrence and input order.
pub fn dedupe_relations(relations: &[RelatedCustomer]) -> Vec<RelatedCustomer> {
    let mut seen = HashSet::new();
    relations
        .iter()
        .filter(|r| seen.insert((r.customer_id, r.related_customer_id, r.relation_type)))
        .cloned()
        .collect()
}

pub fn relations_for_customer(
    relations: &[RelatedCustomer],
    customer_id: CustomerId,
    dedup: RelationDedup,
) -> Vec<RelatedCustomer> {
    let owned: Vec<RelatedCustomer> = relations
        .iter()
        .filter(|r| r.customer_id == customer_id)
        .cloned()
        .collect();
    match dedup {
        RelationDedup::Preserve => owned,
        RelationDedup::Collapse => dedupe_relations(&owned),
    }
}

pub fn relation_views(relations: &[RelatedCustomer]) -> Vec<CustomerRelationView> {
    relations.iter().map(CustomerRelationView::from).collect()
}
