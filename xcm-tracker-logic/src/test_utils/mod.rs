//! In-process doubles for the engine's collaborators, plus fixture builders.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    expiry::ExpiryScheduler,
    notify::{JourneyEvent, NotificationSink},
    types::{
        InboundObservation, Leg, LegKind, MessageHash, MessageIdentity, NetworkId, Outcome,
        OutboundObservation, TrappedAssets, Waypoint,
    },
};

/// Install a compact subscriber for a test run. Safe to call repeatedly.
pub fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// Records every event the engine emits.
#[derive(Default)]
pub struct MockSink {
    events: Mutex<Vec<JourneyEvent>>,
}

impl MockSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<JourneyEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_of_kind(&self, kind: &str) -> Vec<JourneyEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.kind() == kind)
            .collect()
    }
}

#[async_trait]
impl NotificationSink for MockSink {
    async fn notify(&self, event: JourneyEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Records expiry requests without ever firing them; tests drive sweeps by
/// calling the engine directly with the captured keys.
#[derive(Default)]
pub struct MockExpiry {
    scheduled: Mutex<Vec<(Duration, Vec<String>)>>,
}

impl MockExpiry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn scheduled_keys(&self) -> Vec<String> {
        self.scheduled
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, keys)| keys.clone())
            .collect()
    }
}

#[async_trait]
impl ExpiryScheduler for MockExpiry {
    async fn schedule(&self, ttl: Duration, keys: Vec<String>) -> anyhow::Result<()> {
        self.scheduled.lock().unwrap().push((ttl, keys));
        Ok(())
    }
}

pub fn hash(byte: u8) -> MessageHash {
    [byte; 32]
}

pub fn para(index: u32) -> NetworkId {
    NetworkId::new("polkadot", u64::from(index))
}

pub fn waypoint(network: &NetworkId, outcome: Outcome) -> Waypoint {
    Waypoint {
        network: network.clone(),
        block_number: 100,
        block_hash: "0xb10c".to_string(),
        timestamp: None,
        outcome,
        error: None,
        trapped: None,
    }
}

pub fn failed_waypoint_with_trapped(network: &NetworkId) -> Waypoint {
    Waypoint {
        outcome: Outcome::Fail,
        error: Some("FailedToTransactAsset".to_string()),
        trapped: Some(TrappedAssets {
            assets: serde_json::json!([{"fungible": "1000000000"}]),
            origin: Some(network.to_string()),
        }),
        ..waypoint(network, Outcome::Fail)
    }
}

pub fn hrmp_leg(from: &NetworkId, to: &NetworkId) -> Leg {
    Leg {
        from: from.clone(),
        to: to.clone(),
        relay: Some(from.relay()),
        kind: LegKind::Hrmp,
    }
}

pub fn outbound(identity: MessageIdentity, from: &NetworkId, to: &NetworkId) -> OutboundObservation {
    OutboundObservation {
        identity,
        recipient: to.clone(),
        legs: vec![hrmp_leg(from, to)],
        sent: waypoint(from, Outcome::Success),
        subscription: "sub-1".to_string(),
    }
}

pub fn inbound(identity: MessageIdentity, network: &NetworkId) -> InboundObservation {
    InboundObservation {
        identity,
        network: network.clone(),
        waypoint: waypoint(network, Outcome::Success),
    }
}
