pub mod expiry;
pub mod matching;
pub mod metrics;
pub mod notify;
pub mod planner;
pub mod settings;
#[cfg(test)]
pub mod test_utils;
pub mod types;

pub use expiry::ExpiryScheduler;
pub use matching::{InMemoryStore, KvStore, MatchingEngine, MatchingStore, Namespace, StoreError};
pub use notify::{JourneyEvent, NotificationSink};
pub use planner::{plan_legs, plan_legs_bounded, PlanError, MAX_PLAN_DEPTH};
pub use settings::{MatchingSettings, PlannerSettings};
