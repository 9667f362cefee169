use thiserror::Error;

use crate::{
    types::TransactionId,
    validation::{AggregateInvariant, FieldIssue},
};

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid transaction at index {index} (transactionId {transaction_id}): {}", join_issues(.issues))]
    InvalidRecord {
        index: usize,
        transaction_id: TransactionId,
        issues: Vec<FieldIssue>,
    },

    #[error("Aggregate for transactionId {transaction_id} violates invariants: {}", join_invariants(.violations))]
    AggregateInvariant {
        transaction_id: TransactionId,
        violations: Vec<AggregateInvariant>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type FeedResult<T> = Result<T, FeedError>;

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_invariants(violations: &[AggregateInvariant]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
