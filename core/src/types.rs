//! Shared primitive types used across the entire crate.

/// Owner of a transaction in the feed.
pub type CustomerId = i64;

/// Feed-assigned transaction number. Unique within one customer's
/// authorization lifecycle, not across the feed.
pub type TransactionId = i64;

/// Opaque device fingerprint attached to a transaction.
pub type DeviceId = String;

/// Monotonic version stamped on each loaded feed snapshot.
pub type SnapshotVersion = u64;
