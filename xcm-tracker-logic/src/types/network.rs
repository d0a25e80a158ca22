use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Consensus-qualified chain identifier.
///
/// Canonical string form is `<consensus>:<chain_index>`, e.g. `polkadot:2034`.
/// Chain index `0` always denotes the relay chain of its consensus. Both the
/// outbound recipient resolution and inbound observers must produce this
/// canonical form, otherwise matching keys will never line up.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NetworkId {
    pub consensus: String,
    pub chain_index: u64,
}

impl NetworkId {
    pub fn new(consensus: impl Into<String>, chain_index: u64) -> Self {
        Self {
            consensus: consensus.into(),
            chain_index,
        }
    }

    /// The relay chain of the given consensus.
    pub fn relay_of(consensus: impl Into<String>) -> Self {
        Self::new(consensus, 0)
    }

    pub fn is_relay(&self) -> bool {
        self.chain_index == 0
    }

    /// The relay chain of this network's own consensus.
    pub fn relay(&self) -> NetworkId {
        NetworkId::relay_of(self.consensus.clone())
    }

    pub fn same_consensus(&self, other: &NetworkId) -> bool {
        self.consensus == other.consensus
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.consensus, self.chain_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid network id `{0}`, expected `<consensus>:<chain_index>`")]
pub struct ParseNetworkIdError(String);

impl FromStr for NetworkId {
    type Err = ParseNetworkIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (consensus, index) = s
            .rsplit_once(':')
            .ok_or_else(|| ParseNetworkIdError(s.to_string()))?;
        if consensus.is_empty() {
            return Err(ParseNetworkIdError(s.to_string()));
        }
        let chain_index = index
            .parse::<u64>()
            .map_err(|_| ParseNetworkIdError(s.to_string()))?;
        Ok(NetworkId::new(consensus, chain_index))
    }
}

impl TryFrom<String> for NetworkId {
    type Error = ParseNetworkIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NetworkId> for String {
    fn from(value: NetworkId) -> Self {
        value.to_string()
    }
}
