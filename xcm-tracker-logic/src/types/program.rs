use serde::{Deserialize, Serialize};

use super::{message::MessageHash, network::NetworkId};

/// Destination location as decoded from an instruction, relative to the
/// chain executing the program.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// The executing chain itself.
    Here,
    /// The relay chain of the executing chain's consensus.
    Parent,
    /// A parachain under the same relay.
    Parachain(u32),
    /// A chain under a foreign consensus.
    Global { consensus: String, chain_index: u64 },
}

impl Location {
    /// Resolve to the canonical network identifier, relative to `origin`.
    pub fn resolve(&self, origin: &NetworkId) -> NetworkId {
        match self {
            Location::Here => origin.clone(),
            Location::Parent => origin.relay(),
            Location::Parachain(index) => {
                NetworkId::new(origin.consensus.clone(), u64::from(*index))
            }
            Location::Global {
                consensus,
                chain_index,
            } => NetworkId::new(consensus.clone(), *chain_index),
        }
    }
}

/// Decoded program instruction, reduced to the shape the planner needs.
///
/// The external decoder produces these from raw message bytes. Only the
/// instructions that move execution to another chain carry data here;
/// everything else is collapsed into [`Instruction::Other`] and skipped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    DepositReserveAsset {
        dest: Location,
        xcm: Vec<Instruction>,
    },
    InitiateReserveWithdraw {
        reserve: Location,
        xcm: Vec<Instruction>,
    },
    InitiateTeleport {
        dest: Location,
        xcm: Vec<Instruction>,
    },
    TransferReserveAsset {
        dest: Location,
        xcm: Vec<Instruction>,
    },
    /// Hands the nested program to a bridge towards a foreign consensus.
    ExportMessage {
        network: String,
        destination: Location,
        xcm: Vec<Instruction>,
    },
    /// Sets the protocol-level topic id. Identity extraction happens in the
    /// decoder; the planner ignores it.
    SetTopic(MessageHash),
    /// Any instruction without routing significance.
    Other,
}

impl Instruction {
    /// The next stop and nested program this instruction implies, if any.
    ///
    /// `ExportMessage` resolves its destination within the foreign consensus
    /// rather than relative to the executing chain.
    pub fn stop(&self, origin: &NetworkId) -> Option<(NetworkId, &[Instruction])> {
        match self {
            Instruction::DepositReserveAsset { dest, xcm }
            | Instruction::InitiateTeleport { dest, xcm }
            | Instruction::TransferReserveAsset { dest, xcm } => {
                Some((dest.resolve(origin), xcm.as_slice()))
            }
            Instruction::InitiateReserveWithdraw { reserve, xcm } => {
                Some((reserve.resolve(origin), xcm.as_slice()))
            }
            Instruction::ExportMessage {
                network,
                destination,
                xcm,
            } => {
                let foreign_relay = NetworkId::relay_of(network.clone());
                Some((destination.resolve(&foreign_relay), xcm.as_slice()))
            }
            Instruction::SetTopic(_) | Instruction::Other => None,
        }
    }
}
