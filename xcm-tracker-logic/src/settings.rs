use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::planner::MAX_PLAN_DEPTH;

#[serde_as]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingSettings {
    /// How long an unmatched inbound or parked entry may wait before the
    /// expiry collaborator sweeps it into a timeout.
    #[serde(default = "default_expiry_ttl")]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub expiry_ttl: Duration,
}

fn default_expiry_ttl() -> Duration {
    // Receipts normally land within a couple of block times; two hours is
    // far past any legitimate delivery.
    Duration::from_secs(2 * 60 * 60)
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            expiry_ttl: default_expiry_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerSettings {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    MAX_PLAN_DEPTH
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}
