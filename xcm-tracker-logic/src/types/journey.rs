use serde::{Deserialize, Serialize};

use super::{
    message::{MessageIdentity, Waypoint},
    network::NetworkId,
};

/// How a single leg moves between its two endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegKind {
    /// Parachain to parachain within one consensus, routed via the relay.
    Hrmp,
    /// Between a parachain and its relay chain.
    Vmp,
    /// Across a consensus boundary.
    Bridge,
    /// Intermediate leg whose destination forwards the message onward.
    Hop,
}

/// One hop of the planned path. The sequence is fixed at planning time; the
/// matching engine only annotates observed status alongside it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub from: NetworkId,
    pub to: NetworkId,
    pub relay: Option<NetworkId>,
    pub kind: LegKind,
}

/// Observed progress of a planned leg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegStatus {
    #[default]
    Pending,
    Relayed,
    Received,
}

/// Completion state of a journey. Advances monotonically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    Pending,
    Matched,
    TimedOut,
}

/// The correlated record of one message's path, assembled at match time and
/// handed to the notification sink. The engine keeps no journey state beyond
/// the unmatched observations themselves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub identity: MessageIdentity,
    pub origin: Waypoint,
    pub destination: Waypoint,
    pub legs: Vec<Leg>,
    pub leg_status: Vec<LegStatus>,
    pub status: JourneyStatus,
}
