//! Feed data model: raw transactions and the records derived from them.
//!
//! Field names serialize in camelCase and enum values in
//! SCREAMING_SNAKE_CASE, matching the upstream feed JSON.

use crate::types::{CustomerId, DeviceId, TransactionId};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

// ── Enums ────────────────────────────────────────────────────────────────────

/// Kind of money movement a transaction records.
///
/// Incoming/outgoing pairs (ACH, WIRE, P2P) describe the same transfer
/// from the two ledgers involved; the detector labels paired edges with
/// the counterpart's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    AchIncoming,
    AchOutgoing,
    WireIncoming,
    WireOutgoing,
    P2pSend,
    P2pReceive,
    Pos,
    Fee,
}

impl TransactionType {
    pub const ALL: [TransactionType; 8] = [
        Self::AchIncoming,
        Self::AchOutgoing,
        Self::WireIncoming,
        Self::WireOutgoing,
        Self::P2pSend,
        Self::P2pReceive,
        Self::Pos,
        Self::Fee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AchIncoming  => "ACH_INCOMING",
            Self::AchOutgoing  => "ACH_OUTGOING",
            Self::WireIncoming => "WIRE_INCOMING",
            Self::WireOutgoing => "WIRE_OUTGOING",
            Self::P2pSend      => "P2P_SEND",
            Self::P2pReceive   => "P2P_RECEIVE",
            Self::Pos          => "POS",
            Self::Fee          => "FEE",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Point in an authorization lifecycle.
/// Normal progression: PENDING -> SETTLED -> (optionally) RETURNED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Settled,
    Returned,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending  => "PENDING",
            Self::Settled  => "SETTLED",
            Self::Returned => "RETURNED",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING"  => Ok(Self::Pending),
            "SETTLED"  => Ok(Self::Settled),
            "RETURNED" => Ok(Self::Returned),
            other      => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant '{0}'")]
pub struct UnknownVariant(pub String);

// ── Transaction ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<DeviceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_transaction_id: Option<TransactionId>,
}

/// One immutable feed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: TransactionId,
    /// Conventionally prefixed "F". Reused across customers, so never a
    /// grouping key on its own.
    pub authorization_code: String,
    pub transaction_date: DateTime<FixedOffset>,
    pub customer_id: CustomerId,
    pub transaction_type: TransactionType,
    pub transaction_status: TransactionStatus,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Transaction {
    pub fn device_id(&self) -> Option<&str> {
        self.metadata.device_id.as_deref()
    }

    pub fn related_transaction_id(&self) -> Option<TransactionId> {
        self.metadata.related_transaction_id
    }
}

// ── Derived records ──────────────────────────────────────────────────────────

/// One lifecycle step inside an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub status: TransactionStatus,
    pub created_at: DateTime<FixedOffset>,
    pub amount: f64,
}

impl From<&Transaction> for TimelineEntry {
    fn from(t: &Transaction) -> Self {
        Self {
            status:     t.transaction_status,
            created_at: t.transaction_date,
            amount:     t.amount,
        }
    }
}

/// One (customer, authorization code) lifecycle collapsed into a record.
///
/// Identity fields come from the earliest transaction, `status` and
/// `updated_at` from the latest. `updated_at` is only set when the
/// lifecycle has more than one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedTransaction {
    pub created_at: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub customer_id: CustomerId,
    pub transaction_id: TransactionId,
    pub authorization_code: String,
    pub status: TransactionStatus,
    pub description: String,
    pub transaction_type: TransactionType,
    pub timeline: Vec<TimelineEntry>,
}

// ── Relations ────────────────────────────────────────────────────────────────

/// Label on a relation edge: shared device, or the counterpart's
/// transaction type for paired transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationType {
    Device,
    Transfer(TransactionType),
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Device      => "DEVICE",
            Self::Transfer(t) => t.as_str(),
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "DEVICE" {
            return Ok(Self::Device);
        }
        s.parse().map(Self::Transfer)
    }
}

impl Serialize for RelationType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RelationType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Directed relation edge. Symmetric relations are stored as two edges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedCustomer {
    pub customer_id: CustomerId,
    pub related_customer_id: CustomerId,
    pub relation_type: RelationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_transaction_id: Option<TransactionId>,
}

impl RelatedCustomer {
    pub fn device(customer_id: CustomerId, related_customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            related_customer_id,
            relation_type: RelationType::Device,
            transaction_id: None,
            related_transaction_id: None,
        }
    }
}
