//! Validation layer.
//!
//! Two concerns live here, both outside the aggregation/detection core:
//!   1. Feed records are checked against `FeedLimits` before a snapshot is
//!      accepted. One bad record rejects the whole feed.
//!   2. Aggregates can be checked post hoc against the lifecycle
//!      invariants. The aggregator never produces a violation itself;
//!      this catches pre-aggregated data injected by a caller.

use crate::{
    config::FeedLimits,
    error::{FeedError, FeedResult},
    transaction::{AggregatedTransaction, Transaction},
};
use thiserror::Error;

// ── Feed records ─────────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldIssue {
    #[error("Unknown authorizationCode '{code}' (expected prefix '{prefix}').")]
    AuthorizationPrefix { code: String, prefix: String },

    #[error("Transaction description is too long ({len} > {max}).")]
    DescriptionTooLong { len: usize, max: usize },

    #[error("Transaction amount {amount} is outside [-{max}, {max}].")]
    AmountOutOfRange { amount: f64, max: f64 },
}

pub fn validate_transaction(t: &Transaction, limits: &FeedLimits) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    if !t.authorization_code.starts_with(limits.authorization_prefix.as_str()) {
        issues.push(FieldIssue::AuthorizationPrefix {
            code: t.authorization_code.clone(),
            prefix: limits.authorization_prefix.clone(),
        });
    }

    let len = t.description.chars().count();
    if len > limits.max_description_len {
        issues.push(FieldIssue::DescriptionTooLong {
            len,
            max: limits.max_description_len,
        });
    }

    // NaN fails the range check too.
    if !(t.amount.abs() <= limits.max_abs_amount) {
        issues.push(FieldIssue::AmountOutOfRange {
            amount: t.amount,
            max: limits.max_abs_amount,
        });
    }

    issues
}

/// Reject the feed at the first invalid record.
pub fn validate_feed(transactions: &[Transaction], limits: &FeedLimits) -> FeedResult<()> {
    for (index, t) in transactions.iter().enumerate() {
        let issues = validate_transaction(t, limits);
        if !issues.is_empty() {
            return Err(FeedError::InvalidRecord {
                index,
                transaction_id: t.transaction_id,
                issues,
            });
        }
    }
    Ok(())
}

// ── Aggregate invariants ─────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateInvariant {
    #[error("status does not match transactionStatus of last transaction.")]
    StatusMismatch,

    #[error("createdAt cannot be older than updatedAt.")]
    CreatedAtAfterUpdatedAt,

    #[error("createdAt does not match transactionDate of first transaction.")]
    CreatedAtMismatch,

    #[error("updatedAt does not match transactionDate of last transaction.")]
    UpdatedAtMismatch,
}

/// Every invariant the aggregate breaks, in check order.
pub fn check_aggregate(agg: &AggregatedTransaction) -> Vec<AggregateInvariant> {
    let mut violations = Vec::new();
    let first = agg.timeline.first();
    let last = agg.timeline.last();

    if last.map(|e| e.status) != Some(agg.status) {
        violations.push(AggregateInvariant::StatusMismatch);
    }

    if let Some(updated_at) = agg.updated_at {
        if agg.created_at >= updated_at {
            violations.push(AggregateInvariant::CreatedAtAfterUpdatedAt);
        }
    }

    if first.map(|e| e.created_at) != Some(agg.created_at) {
        violations.push(AggregateInvariant::CreatedAtMismatch);
    }

    // Singletons carry no updatedAt, so there is nothing to compare.
    if agg.timeline.len() >= 2 && last.map(|e| e.created_at) != agg.updated_at {
        violations.push(AggregateInvariant::UpdatedAtMismatch);
    }

    violations
}

pub fn validate_aggregates(aggregates: &[AggregatedTransaction]) -> FeedResult<()> {
    for agg in aggregates {
        let violations = check_aggregate(agg);
        if !violations.is_empty() {
            return Err(FeedError::AggregateInvariant {
                transaction_id: agg.transaction_id,
                violations,
            });
        }
    }
    Ok(())
}
