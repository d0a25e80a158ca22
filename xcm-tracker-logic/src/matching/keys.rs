//! Deterministic store keys, computable from either side of a match.
//!
//! The outbound side keys by the recipient it resolved at planning time; the
//! inbound side keys by its own chain id. Both refer to the same chain in the
//! same canonical form, so the keys line up. Identities with a topic id get a
//! second key so that id-aware and hash-only observers still meet.

use crate::types::{MessageHash, MessageIdentity, NetworkId};

fn main_key(part: &MessageHash, network: &NetworkId) -> String {
    format!("{}:{}", hex::encode(part), network)
}

fn leg_key(part: &MessageHash, leg_index: usize, network: &NetworkId) -> String {
    format!("{}:{}:{}", hex::encode(part), leg_index, network)
}

/// The keys one observation can be looked up or stored under.
///
/// Lookup probes the id key before the hash key. That order is not a semantic
/// preference, it mirrors what id-unaware observers historically wrote; keep
/// it as an explicit two-step so the matching logic stays auditable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CandidateKeys {
    id: Option<String>,
    hash: String,
}

impl CandidateKeys {
    pub fn main(identity: &MessageIdentity, network: &NetworkId) -> Self {
        Self {
            id: identity
                .id
                .as_ref()
                .filter(|id| **id != identity.hash)
                .map(|id| main_key(id, network)),
            hash: main_key(&identity.hash, network),
        }
    }

    pub fn leg(identity: &MessageIdentity, leg_index: usize, network: &NetworkId) -> Self {
        Self {
            id: identity
                .id
                .as_ref()
                .filter(|id| **id != identity.hash)
                .map(|id| leg_key(id, leg_index, network)),
            hash: leg_key(&identity.hash, leg_index, network),
        }
    }

    /// Keys in lookup order: id first when the identity carries a distinct
    /// one, hash always.
    pub fn lookup_order(&self) -> impl Iterator<Item = &str> {
        self.id.as_deref().into_iter().chain(Some(self.hash.as_str()))
    }

    /// All keys an entry is stored under (and must be deleted from).
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.lookup_order()
    }
}
