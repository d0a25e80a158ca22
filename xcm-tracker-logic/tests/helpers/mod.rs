use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use xcm_tracker_logic::{
    types::{MessageIdentity, NetworkId, Outcome, Waypoint},
    ExpiryScheduler, InMemoryStore, JourneyEvent, MatchingEngine, MatchingSettings, MatchingStore,
    NotificationSink,
};

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<JourneyEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<JourneyEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn of_kind(&self, kind: &str) -> Vec<JourneyEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.kind() == kind)
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, event: JourneyEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingExpiry {
    keys: Mutex<Vec<String>>,
}

impl RecordingExpiry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExpiryScheduler for RecordingExpiry {
    async fn schedule(&self, _ttl: Duration, keys: Vec<String>) -> anyhow::Result<()> {
        self.keys.lock().unwrap().extend(keys);
        Ok(())
    }
}

pub struct TestEnv {
    pub engine: Arc<MatchingEngine>,
    pub sink: Arc<RecordingSink>,
    pub expiry: Arc<RecordingExpiry>,
    pub store: Arc<InMemoryStore>,
}

pub fn test_env() -> TestEnv {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();

    let store = Arc::new(InMemoryStore::new());
    let sink = RecordingSink::new();
    let expiry = RecordingExpiry::new();
    let engine = Arc::new(MatchingEngine::new(
        MatchingStore::new(store.clone()),
        sink.clone(),
        expiry.clone(),
        MatchingSettings::default(),
    ));
    TestEnv {
        engine,
        sink,
        expiry,
        store,
    }
}

pub fn para(index: u32) -> NetworkId {
    NetworkId::new("polkadot", u64::from(index))
}

pub fn identity(byte: u8) -> MessageIdentity {
    MessageIdentity::from_hash([byte; 32])
}

pub fn waypoint(network: &NetworkId, outcome: Outcome) -> Waypoint {
    Waypoint {
        network: network.clone(),
        block_number: 42,
        block_hash: "0xabcd".to_string(),
        timestamp: None,
        outcome,
        error: None,
        trapped: None,
    }
}
