use lazy_static::lazy_static;
use prometheus::{
    register_int_counter_vec, IntCounterVec,
};

// Keep labels low-cardinality: namespaces, event kinds and outcomes only,
// never identities or chains.
lazy_static! {
    /// Matches produced, labeled by the destination outcome.
    pub static ref MATCHED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "xcm_tracker_matched_total",
        "correlated journeys emitted",
        &["outcome"],
    )
    .unwrap();

    /// Counterpart lookups, labeled by namespace and hit/miss.
    pub static ref LOOKUP_TOTAL: IntCounterVec = register_int_counter_vec!(
        "xcm_tracker_lookup_total",
        "counterpart lookups against the matching store",
        &["namespace", "result"],
    )
    .unwrap();

    /// Observations stored while waiting for a counterpart, per namespace.
    pub static ref STORED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "xcm_tracker_stored_total",
        "observations parked in the matching store",
        &["namespace"],
    )
    .unwrap();

    /// Events handed to the notification sink, per kind.
    pub static ref NOTIFICATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "xcm_tracker_notifications_total",
        "journey events handed to the notification sink",
        &["event"],
    )
    .unwrap();

    /// Expired entries swept into timeouts, per namespace.
    pub static ref TIMEOUT_TOTAL: IntCounterVec = register_int_counter_vec!(
        "xcm_tracker_timeout_total",
        "entries swept after expiring unmatched",
        &["namespace"],
    )
    .unwrap();
}
