//! Feed snapshots — the immutable input every analysis runs against.
//!
//! RULE: Nothing in the core reads process-wide feed state.
//! Callers load a snapshot, pass it in, and decide when to refresh.
//! A refresh builds a new snapshot and swaps it into a SnapshotCell;
//! analyses already holding the old Arc keep running on it.

use crate::{
    config::FeedLimits,
    error::FeedResult,
    transaction::Transaction,
    types::SnapshotVersion,
    validation::validate_feed,
};
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub version: SnapshotVersion,
    pub loaded_at: DateTime<Utc>,
    transactions: Arc<[Transaction]>,
}

impl FeedSnapshot {
    /// Validate and freeze an in-memory feed.
    pub fn from_transactions(
        version: SnapshotVersion,
        transactions: Vec<Transaction>,
        limits: &FeedLimits,
    ) -> FeedResult<Self> {
        if let Err(e) = validate_feed(&transactions, limits) {
            log::warn!("Rejected feed snapshot v{version}: {e}");
            return Err(e);
        }
        log::info!(
            "Loaded feed snapshot v{version} with {} transactions",
            transactions.len()
        );
        Ok(Self {
            version,
            loaded_at: Utc::now(),
            transactions: transactions.into(),
        })
    }

    /// Parse a JSON array of feed records.
    pub fn from_json(version: SnapshotVersion, json: &str, limits: &FeedLimits) -> FeedResult<Self> {
        let transactions: Vec<Transaction> = serde_json::from_str(json)?;
        Self::from_transactions(version, transactions, limits)
    }

    pub fn from_path(version: SnapshotVersion, path: &str, limits: &FeedLimits) -> FeedResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(version, &content, limits)
    }

    pub fn empty(version: SnapshotVersion) -> Self {
        Self {
            version,
            loaded_at: Utc::now(),
            transactions: Arc::from(Vec::new()),
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Holder for the current snapshot. Readers get a cheap Arc clone;
/// writers swap in a whole new snapshot.
#[derive(Debug)]
pub struct SnapshotCell {
    current: RwLock<Arc<FeedSnapshot>>,
}

impl SnapshotCell {
    pub fn new(initial: FeedSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    pub fn current(&self) -> Arc<FeedSnapshot> {
        // The lock only guards an Arc swap, so a poisoned lock still holds
        // a complete snapshot.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Install `next` and return the snapshot it replaced.
    pub fn replace(&self, next: FeedSnapshot) -> Arc<FeedSnapshot> {
        let next = Arc::new(next);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        log::info!(
            "Replacing feed snapshot v{} with v{}",
            guard.version,
            next.version
        );
        std::mem::replace(&mut *guard, next)
    }
}
