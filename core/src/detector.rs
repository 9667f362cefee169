//! Relation detector trait and the union that runs the registered detectors.
//!
//! RULE: Detectors are pure. They read the feed, never mutate it, and
//! never read each other's output. The union only concatenates.

use crate::{
    device_detector::DeviceDetector,
    paired_detector::PairedTransactionDetector,
    transaction::{RelatedCustomer, Transaction},
};
use std::thread;

/// The contract every relation sub-detector must fulfill.
pub trait RelationDetector: Send + Sync {
    /// Unique stable name for this detector.
    fn name(&self) -> &'static str;

    /// Derive directed relation edges from the feed.
    fn detect(&self, transactions: &[Transaction]) -> Vec<RelatedCustomer>;
}

/// Concatenation of several detectors' output, in registration order.
/// No deduplication happens here.
pub struct RelationUnion {
    detectors: Vec<Box<dyn RelationDetector>>,
}

impl RelationUnion {
    pub fn new() -> Self {
        Self { detectors: Vec::new() }
    }

    /// Device detector followed by the paired-transaction detector.
    pub fn standard(window: chrono::Duration) -> Self {
        let mut union = Self::new();
        union.register(Box::new(DeviceDetector));
        union.register(Box::new(PairedTransactionDetector::new(window)));
        union
    }

    pub fn register(&mut self, detector: Box<dyn RelationDetector>) {
        self.detectors.push(detector);
    }

    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Run every detector on its own scoped thread over the same feed and
    /// join the results in registration order.
    pub fn detect(&self, transactions: &[Transaction]) -> Vec<RelatedCustomer> {
        let per_detector: Vec<Vec<RelatedCustomer>> = thread::scope(|s| {
            let handles: Vec<_> = self
                .detectors
                .iter()
                .map(|d| s.spawn(move || d.detect(transactions)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        for (detector, edges) in self.detectors.iter().zip(&per_detector) {
            log::debug!("detector {}: {} edges", detector.name(), edges.len());
        }

        per_detector.into_iter().flatten().collect()
    }
}

impl Default for RelationUnion {
    fn default() -> Self {
        Self::standard(crate::paired_detector::default_window())
    }
}
