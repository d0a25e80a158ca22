use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{journey::Leg, network::NetworkId};

/// 32-byte hash/topic as extracted from the message bytes.
pub type MessageHash = [u8; 32];

/// Correlation identity of one logical cross-chain message.
///
/// `hash` is always present and derived from the message bytes. `id` is the
/// optional protocol-level topic set by the sender; hash-only and hash+id
/// observers coexist indefinitely, so both fields participate in matching.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageIdentity {
    pub hash: MessageHash,
    pub id: Option<MessageHash>,
}

impl MessageIdentity {
    pub fn from_hash(hash: MessageHash) -> Self {
        Self { hash, id: None }
    }

    pub fn with_id(hash: MessageHash, id: MessageHash) -> Self {
        Self { hash, id: Some(id) }
    }

    /// Whether two independently produced identities denote the same message:
    /// the hashes match, or both carry a topic id and the ids match.
    pub fn matches(&self, other: &MessageIdentity) -> bool {
        if self.hash == other.hash {
            return true;
        }
        matches!((&self.id, &other.id), (Some(a), Some(b)) if a == b)
    }

    /// Combine the knowledge of both sides of a match. The hash is shared;
    /// the topic id is taken from whichever side observed it.
    pub fn merge(&self, other: &MessageIdentity) -> MessageIdentity {
        MessageIdentity {
            hash: self.hash,
            id: self.id.or(other.id),
        }
    }
}

impl fmt::Display for MessageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.hash))?;
        if let Some(id) = &self.id {
            write!(f, " (topic 0x{})", hex::encode(id))?;
        }
        Ok(())
    }
}

/// Outcome of processing a message at a waypoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Fail,
    Unknown,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Fail => "fail",
            Outcome::Unknown => "unknown",
        }
    }
}

/// Assets that failed to be claimed at the destination and remain
/// recoverable on-chain. The decoded payload is carried to the sink intact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrappedAssets {
    pub assets: serde_json::Value,
    pub origin: Option<String>,
}

/// Immutable snapshot of where and when an observation was made.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub network: NetworkId,
    pub block_number: u64,
    pub block_hash: String,
    pub timestamp: Option<NaiveDateTime>,
    pub outcome: Outcome,
    pub error: Option<String>,
    pub trapped: Option<TrappedAssets>,
}

impl Waypoint {
    /// A failed receipt with trapped assets is the signal for a Trapped
    /// notification on top of the plain match.
    pub fn has_trapped_assets(&self) -> bool {
        self.outcome == Outcome::Fail && self.trapped.is_some()
    }
}

/// Produced when a chain emits a "message sent" event and the outbound
/// program has been resolved into a leg plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutboundObservation {
    pub identity: MessageIdentity,
    /// Final destination chain, in the same canonical form inbound observers
    /// report for themselves.
    pub recipient: NetworkId,
    pub legs: Vec<Leg>,
    pub sent: Waypoint,
    /// Opaque reference to the subscription that requested tracking.
    pub subscription: String,
}

/// Produced when a chain emits a "message processed" event, success or not.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InboundObservation {
    pub identity: MessageIdentity,
    pub network: NetworkId,
    pub waypoint: Waypoint,
}

/// Observation of a message passing a relay chain on a specific leg.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelayObservation {
    pub identity: MessageIdentity,
    /// Destination of the tracked message, read from the relayed envelope.
    /// Must match the recipient the outbound side was keyed with.
    pub recipient: NetworkId,
    pub leg_index: usize,
    pub waypoint: Waypoint,
}

/// Observation of a message entering or leaving an intermediate hop chain.
///
/// `network` is the chain the observation is keyed by: the leg's destination
/// chain. Outbound-direction observers resolve it from the envelope,
/// inbound-direction observers use their own chain id; both must agree for
/// the leg keys to line up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegObservation {
    pub identity: MessageIdentity,
    pub network: NetworkId,
    pub leg_index: usize,
    pub waypoint: Waypoint,
}

/// Hop observation crossing a consensus boundary, with the bridge flavor
/// reported by the decoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BridgeObservation {
    pub identity: MessageIdentity,
    pub network: NetworkId,
    pub leg_index: usize,
    pub waypoint: Waypoint,
    pub bridge_type: String,
}

/// Direction of a leg-scoped observation relative to the observed chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}
