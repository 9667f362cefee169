//! Synthetic feed generation for demos and tests.
//!
//! Produces a feed shaped like the upstream one: authorization lifecycles
//! (PENDING -> SETTLED -> optionally RETURNED, one hour apart), devices
//! shared by several customers, and reciprocal transfer pairs.
//! All generation is deterministic (same seed = same feed).

use crate::{
    rng::{StreamRng, StreamSlot},
    transaction::{Metadata, Transaction, TransactionStatus, TransactionType},
    types::{CustomerId, TransactionId},
};
use chrono::{DateTime, Duration, FixedOffset};

// ── Constants ────────────────────────────────────────────────────────────────

const FEED_SPAN_MINUTES: u64 = 30 * 24 * 60;
const SETTLE_PROBABILITY: f64 = 0.80;
const RETURN_PROBABILITY: f64 = 0.10;
const IMMEDIATE_SETTLE_PROBABILITY: f64 = 0.20;
const PERSONAL_DEVICE_PROBABILITY: f64 = 0.30;
const MAX_TRANSFER_LAG_MINUTES: u64 = 30;

const LIFECYCLE_TYPES: [TransactionType; 4] = [
    TransactionType::Pos,
    TransactionType::AchIncoming,
    TransactionType::AchOutgoing,
    TransactionType::Fee,
];

const MERCHANTS: [&str; 8] = [
    "Amazon", "Walmart", "Target", "Costco", "Starbucks", "Shell", "Uber", "Netflix",
];

#[derive(Debug, Clone)]
pub struct GeneratorParams {
    pub customers: u64,
    pub lifecycles: u64,
    pub shared_devices: u64,
    pub transfers: u64,
    pub start: DateTime<FixedOffset>,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            customers: 20,
            lifecycles: 60,
            shared_devices: 3,
            transfers: 5,
            // Fixed epoch keeps generated feeds independent of the wall clock.
            start: DateTime::parse_from_rfc3339("2022-09-01T00:00:00+00:00")
                .unwrap_or_default(),
        }
    }
}

pub struct FeedGenerator {
    seed: u64,
    params: GeneratorParams,
    next_transaction_id: TransactionId,
    next_authorization: u64,
}

impl FeedGenerator {
    pub fn new(seed: u64, params: GeneratorParams) -> Self {
        Self {
            seed,
            params,
            next_transaction_id: 1,
            next_authorization: 1,
        }
    }

    /// Build the whole feed, ordered by transaction date (ties keep
    /// generation order).
    pub fn generate(mut self) -> Vec<Transaction> {
        let mut feed = Vec::new();

        let mut rng = StreamRng::new(self.seed, StreamSlot::Lifecycle);
        for _ in 0..self.params.lifecycles {
            feed.extend(self.lifecycle(&mut rng));
        }

        if self.params.customers >= 2 {
            let mut rng = StreamRng::new(self.seed, StreamSlot::Device);
            for device in 0..self.params.shared_devices {
                feed.extend(self.shared_device(device, &mut rng));
            }

            let mut rng = StreamRng::new(self.seed, StreamSlot::Transfer);
            for _ in 0..self.params.transfers {
                feed.extend(self.transfer_pair(&mut rng));
            }
        }

        feed.sort_by_key(|t| t.transaction_date);
        log::debug!("generated feed: seed={} {} transactions", self.seed, feed.len());
        feed
    }

    fn lifecycle(&mut self, rng: &mut StreamRng) -> Vec<Transaction> {
        let customer_id = self.random_customer(rng);
        let transaction_type = *rng.pick(&LIFECYCLE_TYPES);
        let description = rng.pick(&MERCHANTS).to_string();
        let amount = signed_amount(transaction_type, rng.amount_between(1.0, 2_000.0));
        let opened_at = self.random_instant(rng);
        let authorization_code = self.next_authorization_code();
        let metadata = Metadata {
            device_id: rng
                .chance(PERSONAL_DEVICE_PROBABILITY)
                .then(|| format!("device-c{customer_id}")),
            related_transaction_id: None,
        };

        let statuses: Vec<TransactionStatus> = if rng.chance(IMMEDIATE_SETTLE_PROBABILITY) {
            vec![TransactionStatus::Settled]
        } else {
            let mut steps = vec![TransactionStatus::Pending];
            if rng.chance(SETTLE_PROBABILITY) {
                steps.push(TransactionStatus::Settled);
                if rng.chance(RETURN_PROBABILITY) {
                    steps.push(TransactionStatus::Returned);
                }
            }
            steps
        };

        statuses
            .into_iter()
            .enumerate()
            .map(|(step, status)| Transaction {
                transaction_id: self.next_id(),
                authorization_code: authorization_code.clone(),
                transaction_date: opened_at + Duration::hours(step as i64),
                customer_id,
                transaction_type,
                transaction_status: status,
                description: description.clone(),
                amount,
                metadata: metadata.clone(),
            })
            .collect()
    }

    /// Two or three distinct customers transacting from one device.
    fn shared_device(&mut self, device: u64, rng: &mut StreamRng) -> Vec<Transaction> {
        let device_id = format!("shared-device-{device}");
        let first = self.random_customer(rng);
        let mut owners = vec![first, self.other_customer(first, rng)];
        if self.params.customers >= 3 && rng.chance(0.5) {
            let candidate = self.other_customer(first, rng);
            if !owners.contains(&candidate) {
                owners.push(candidate);
            }
        }

        owners
            .into_iter()
            .map(|customer_id| Transaction {
                transaction_id: self.next_id(),
                authorization_code: self.next_authorization_code(),
                transaction_date: self.random_instant(rng),
                customer_id,
                transaction_type: TransactionType::Pos,
                transaction_status: TransactionStatus::Settled,
                description: rng.pick(&MERCHANTS).to_string(),
                amount: -rng.amount_between(1.0, 500.0),
                metadata: Metadata {
                    device_id: Some(device_id.clone()),
                    related_transaction_id: None,
                },
            })
            .collect()
    }

    /// One transfer recorded on both ledgers, each side pointing at the other.
    fn transfer_pair(&mut self, rng: &mut StreamRng) -> Vec<Transaction> {
        let sender = self.random_customer(rng);
        let receiver = self.other_customer(sender, rng);
        let (send_type, receive_type) = if rng.chance(0.5) {
            (TransactionType::P2pSend, TransactionType::P2pReceive)
        } else {
            (TransactionType::WireOutgoing, TransactionType::WireIncoming)
        };
        let amount = rng.amount_between(10.0, 5_000.0);
        let sent_at = self.random_instant(rng);
        let lag = Duration::minutes(rng.next_u64_below(MAX_TRANSFER_LAG_MINUTES + 1) as i64);
        let send_id = self.next_id();
        let receive_id = self.next_id();

        let leg = |transaction_id: TransactionId,
                   counterpart: TransactionId,
                   customer_id: CustomerId,
                   transaction_type: TransactionType,
                   amount: f64,
                   at: DateTime<FixedOffset>,
                   code: String| {
            Transaction {
                transaction_id,
                authorization_code: code,
                transaction_date: at,
                customer_id,
                transaction_type,
                transaction_status: TransactionStatus::Settled,
                description: format!("Transfer {send_id}"),
                amount,
                metadata: Metadata {
                    device_id: None,
                    related_transaction_id: Some(counterpart),
                },
            }
        };

        let send_code = self.next_authorization_code();
        let receive_code = self.next_authorization_code();
        vec![
            leg(send_id, receive_id, sender, send_type, -amount, sent_at, send_code),
            leg(receive_id, send_id, receiver, receive_type, amount, sent_at + lag, receive_code),
        ]
    }

    fn next_id(&mut self) -> TransactionId {
        let id = self.next_transaction_id;
        self.next_transaction_id += 1;
        id
    }

    fn next_authorization_code(&mut self) -> String {
        let code = format!("F{:05}", self.next_authorization);
        self.next_authorization += 1;
        code
    }

    fn random_customer(&self, rng: &mut StreamRng) -> CustomerId {
        1 + rng.next_u64_below(self.params.customers.max(1)) as CustomerId
    }

    /// A customer guaranteed to differ from `not`. Requires >= 2 customers.
    fn other_customer(&self, not: CustomerId, rng: &mut StreamRng) -> CustomerId {
        let n = self.params.customers;
        let offset = 1 + rng.next_u64_below(n - 1);
        let zero_based = (not as u64 - 1 + offset) % n;
        zero_based as CustomerId + 1
    }

    fn random_instant(&self, rng: &mut StreamRng) -> DateTime<FixedOffset> {
        self.params.start + Duration::minutes(rng.next_u64_below(FEED_SPAN_MINUTES) as i64)
    }
}

fn signed_amount(transaction_type: TransactionType, magnitude: f64) -> f64 {
    match transaction_type {
        TransactionType::AchIncoming
        | TransactionType::WireIncoming
        | TransactionType::P2pReceive => magnitude,
        _ => -magnitude,
    }
}
