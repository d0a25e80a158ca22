use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{
    Direction, Journey, MessageIdentity, NetworkId, TrappedAssets, Waypoint,
};

/// Correlated events handed to the notification collaborator.
///
/// Leg-scoped events (`Relayed`, `Hop`, `Bridge`) are telemetry annotations;
/// downstream consumers stitch them into a full multi-hop record by `identity`.
/// The engine itself never aggregates across legs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JourneyEvent {
    /// Origin and destination are both observed.
    Matched(Journey),
    /// The match delivered, but execution reverted with assets trapped on
    /// chain. Emitted in addition to `Matched`.
    Trapped {
        journey: Journey,
        assets: TrappedAssets,
    },
    Relayed {
        identity: MessageIdentity,
        leg_index: usize,
        waypoint: Waypoint,
    },
    Hop {
        identity: MessageIdentity,
        leg_index: usize,
        direction: Direction,
        waypoint: Waypoint,
    },
    Bridge {
        identity: MessageIdentity,
        leg_index: usize,
        direction: Direction,
        bridge_type: String,
        waypoint: Waypoint,
    },
    /// An entry expired before its counterpart arrived.
    Timeout {
        identity: MessageIdentity,
        network: NetworkId,
    },
}

impl JourneyEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            JourneyEvent::Matched(_) => "matched",
            JourneyEvent::Trapped { .. } => "trapped",
            JourneyEvent::Relayed { .. } => "relayed",
            JourneyEvent::Hop { .. } => "hop",
            JourneyEvent::Bridge { .. } => "bridge",
            JourneyEvent::Timeout { .. } => "timeout",
        }
    }
}

/// Downstream delivery collaborator (webhooks, streams, persistence).
///
/// Failures are logged by the engine and never retried; a rejected event must
/// not stall correlation of other messages.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: JourneyEvent) -> anyhow::Result<()>;
}
