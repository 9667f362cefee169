//! The analysis engine — runs the aggregator and the relation detectors
//! over one feed snapshot.
//!
//! RULES:
//!   - The snapshot is read-only for the whole run.
//!   - Aggregator and detector union never see each other's output,
//!     so they run on separate scoped threads without synchronization.
//!   - Aggregates are checked against the lifecycle invariants after the
//!     fact. Strict configs turn a violation into FeedError; otherwise it
//!     is logged. Equal timestamps inside one lifecycle are the usual cause.

use crate::{
    aggregation,
    config::{AnalysisConfig, RelationDedup},
    detector::RelationUnion,
    error::FeedResult,
    query,
    snapshot::FeedSnapshot,
    transaction::{AggregatedTransaction, RelatedCustomer, Transaction},
    types::{CustomerId, SnapshotVersion},
    validation::validate_aggregates,
};
use serde::{Deserialize, Serialize};
use std::thread;

/// Everything derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedReport {
    pub snapshot_version: SnapshotVersion,
    pub aggregates: Vec<AggregatedTransaction>,
    pub relations: Vec<RelatedCustomer>,
}

/// One customer's slice of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReport {
    pub customer_id: CustomerId,
    pub transactions: Vec<AggregatedTransaction>,
    pub related_customers: Vec<query::CustomerRelationView>,
}

impl FeedReport {
    pub fn for_customer(&self, customer_id: CustomerId, dedup: RelationDedup) -> CustomerReport {
        let relations = query::relations_for_customer(&self.relations, customer_id, dedup);
        CustomerReport {
            customer_id,
            transactions: query::aggregates_for_customer(&self.aggregates, customer_id),
            related_customers: query::relation_views(&relations),
        }
    }
}

pub struct FeedAnalyzer {
    pub config: AnalysisConfig,
    detectors: RelationUnion,
}

impl FeedAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        let detectors = RelationUnion::standard(config.paired_window());
        Self { config, detectors }
    }

    /// Swap in a custom detector set.
    pub fn with_detectors(mut self, detectors: RelationUnion) -> Self {
        self.detectors = detectors;
        self
    }

    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.detector_names()
    }

    pub fn aggregate(&self, transactions: &[Transaction]) -> Vec<AggregatedTransaction> {
        aggregation::aggregate(transactions)
    }

    pub fn detect_relations(&self, transactions: &[Transaction]) -> Vec<RelatedCustomer> {
        self.detectors.detect(transactions)
    }

    /// Aggregate and detect concurrently over the same snapshot.
    pub fn analyze(&self, snapshot: &FeedSnapshot) -> FeedResult<FeedReport> {
        let transactions = snapshot.transactions();

        let (aggregates, relations) = thread::scope(|s| {
            let aggregator = s.spawn(|| self.aggregate(transactions));
            let relations = self.detect_relations(transactions);
            let aggregates = aggregator
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (aggregates, relations)
        });

        if let Err(e) = validate_aggregates(&aggregates) {
            if self.config.strict_invariants {
                return Err(e);
            }
            log::warn!("snapshot v{}: {e}", snapshot.version);
        }

        log::debug!(
            "snapshot v{}: {} aggregates, {} relation edges",
            snapshot.version,
            aggregates.len(),
            relations.len()
        );

        Ok(FeedReport {
            snapshot_version: snapshot.version,
            aggregates,
            relations,
        })
    }
}

impl Default for FeedAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
