//! Append-only notification log
//!
//! Every externally observable effect of the core is recorded here in
//! submission order. Off-chain consumers either poll `events_since` or
//! subscribe to the broadcast channel; a lagging subscriber misses
//! events rather than blocking the writer.

use crate::config::SlashDisposition;
use crate::types::{Address, Amount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default broadcast channel capacity
const BROADCAST_CAPACITY: usize = 1024;

/// Externally observable notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Escrow released and partitioned into pending balances
    PaymentSplit {
        /// Order whose escrow was released
        order_id: u64,
        /// Restaurant payee
        restaurant: Address,
        /// Deliverer payee
        deliverer: Address,
        /// Platform payee
        platform: Address,
        /// Restaurant share (70%)
        restaurant_share: Amount,
        /// Deliverer share (20%)
        deliverer_share: Amount,
        /// Platform share (remainder, absorbs rounding)
        platform_share: Amount,
    },

    /// Pending balance paid out to its owner
    Withdrawal {
        /// Payee
        payee: Address,
        /// Amount transferred
        amount: Amount,
    },

    /// Deliverer collateral returned in full
    Unstaked {
        /// Deliverer whose stake was zeroed
        deliverer: Address,
        /// Amount returned
        amount: Amount,
    },

    /// Deliverer collateral forcibly reduced
    Slashed {
        /// Penalized deliverer
        deliverer: Address,
        /// Amount actually removed (clamped at the stake)
        amount: Amount,
        /// Where the forfeited funds went
        disposition: SlashDisposition,
    },

    /// Platform drained the forfeiture reserve
    ForfeitureCollected {
        /// Collecting platform address
        platform: Address,
        /// Amount collected
        amount: Amount,
    },

    /// Reward tokens minted to a client
    RewardMinted {
        /// Recipient
        to: Address,
        /// Minted amount
        amount: Amount,
    },

    /// New order escrowed
    OrderCreated {
        /// Allocated order id
        order_id: u64,
        /// Paying client
        client: Address,
        /// Receiving restaurant
        restaurant: Address,
        /// Total escrow held by the ledger
        total_escrowed: Amount,
    },

    /// Order advanced one state
    OrderTransition {
        /// Order id
        order_id: u64,
        /// Previous state code
        from: String,
        /// New state code
        to: String,
    },

    /// Order cancelled before preparation; escrow refunded
    OrderCancelled {
        /// Order id
        order_id: u64,
        /// Refunded client
        client: Address,
        /// Refund amount
        refund: Amount,
    },
}

/// Event with its position in the log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Sequence number (starts at 0, gapless)
    pub seq: u64,

    /// Append timestamp
    pub at: DateTime<Utc>,

    /// The notification itself
    pub event: Event,
}

/// Append-only event log with broadcast fan-out
#[derive(Debug)]
pub struct EventLog {
    records: Vec<EventRecord>,
    sender: broadcast::Sender<EventRecord>,
}

impl EventLog {
    /// Create empty log
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            records: Vec::new(),
            sender,
        }
    }

    /// Append an event, returning its sequence number
    pub fn append(&mut self, event: Event) -> u64 {
        let seq = self.records.len() as u64;
        let record = EventRecord {
            seq,
            at: Utc::now(),
            event,
        };
        tracing::debug!(seq, event = ?record.event, "event appended");
        // Send fails only when there are no subscribers; polling still works.
        let _ = self.sender.send(record.clone());
        self.records.push(record);
        seq
    }

    /// Events at or after `seq` (polling interface)
    pub fn events_since(&self, seq: u64) -> &[EventRecord] {
        let start = (seq as usize).min(self.records.len());
        &self.records[start..]
    }

    /// Number of events appended
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing has been appended
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
