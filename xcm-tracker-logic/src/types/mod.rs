mod journey;
mod message;
mod network;
mod program;

pub use journey::{Journey, JourneyStatus, Leg, LegKind, LegStatus};
pub use message::{
    BridgeObservation, Direction, InboundObservation, LegObservation, MessageHash,
    MessageIdentity, OutboundObservation, Outcome, RelayObservation, TrappedAssets, Waypoint,
};
pub use network::{NetworkId, ParseNetworkIdError};
pub use program::{Instruction, Location};
