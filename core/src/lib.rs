//! feedlens-core: lifecycle aggregation and related-customer detection
//! over an already-validated transaction feed.
//!
//! Entry points:
//!   - `aggregate`         one record per (customer, authorization code)
//!   - `detect_relations`  device-sharing + paired-transfer edges
//!   - `engine::FeedAnalyzer` for both at once over a `FeedSnapshot`

pub mod aggregation;
pub mod config;
pub mod detector;
pub mod device_detector;
pub mod engine;
pub mod error;
pub mod feed_generator;
mod grouping;
pub mod paired_detector;
pub mod query;
pub mod rng;
pub mod snapshot;
pub mod transaction;
pub mod types;
pub mod validation;

pub use error::{FeedError, FeedResult};
pub use transaction::{
    AggregatedTransaction, Metadata, RelatedCustomer, RelationType, TimelineEntry, Transaction,
    TransactionStatus, TransactionType,
};

/// Collapse the feed into authorization lifecycles.
pub fn aggregate(transactions: &[Transaction]) -> Vec<AggregatedTransaction> {
    aggregation::aggregate(transactions)
}

/// Device edges followed by paired-transaction edges (one-hour window).
/// Multiplicity is preserved.
pub fn detect_relations(transactions: &[Transaction]) -> Vec<RelatedCustomer> {
    detector::RelationUnion::default().detect(transactions)
}
