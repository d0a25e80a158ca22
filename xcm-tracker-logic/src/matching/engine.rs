use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{
    keys::CandidateKeys,
    store::{MatchingStore, Namespace, StoreError},
};
use crate::{
    expiry::ExpiryScheduler,
    metrics,
    notify::{JourneyEvent, NotificationSink},
    settings::MatchingSettings,
    types::{
        BridgeObservation, Direction, InboundObservation, Journey, JourneyStatus, LegObservation,
        LegStatus, MessageIdentity, NetworkId, OutboundObservation, RelayObservation,
        TrappedAssets, Waypoint,
    },
};

/// Outbound observation as stored: the plan plus per-leg progress. The leg
/// sequence itself is never mutated, only the status alongside it.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct TrackedOutbound {
    observation: OutboundObservation,
    leg_status: Vec<LegStatus>,
}

impl TrackedOutbound {
    fn new(observation: OutboundObservation) -> Self {
        let leg_status = vec![LegStatus::Pending; observation.legs.len()];
        Self {
            observation,
            leg_status,
        }
    }
}

/// Hop or bridge passage waiting for its counterpart direction.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct TrackedLeg {
    identity: MessageIdentity,
    network: NetworkId,
    leg_index: usize,
    waypoint: Waypoint,
    direction: Direction,
    bridge_type: Option<String>,
}

/// Tagged union of everything the store can hold, so a swept key can be
/// decoded without knowing which operation wrote it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StoredEntry {
    Outbound(TrackedOutbound),
    Inbound(InboundObservation),
    Relay(RelayObservation),
    Leg(TrackedLeg),
}

impl StoredEntry {
    fn identity(&self) -> &MessageIdentity {
        match self {
            StoredEntry::Outbound(tracked) => &tracked.observation.identity,
            StoredEntry::Inbound(observation) => &observation.identity,
            StoredEntry::Relay(observation) => &observation.identity,
            StoredEntry::Leg(leg) => &leg.identity,
        }
    }

    fn network(&self) -> &NetworkId {
        match self {
            StoredEntry::Outbound(tracked) => &tracked.observation.recipient,
            StoredEntry::Inbound(observation) => &observation.network,
            StoredEntry::Relay(observation) => &observation.recipient,
            StoredEntry::Leg(leg) => &leg.network,
        }
    }

    /// Every key this entry was stored under; deletions must cover all of
    /// them or an orphaned twin would match again later.
    fn candidate_keys(&self) -> CandidateKeys {
        match self {
            StoredEntry::Outbound(tracked) => CandidateKeys::main(
                &tracked.observation.identity,
                &tracked.observation.recipient,
            ),
            StoredEntry::Inbound(observation) => {
                CandidateKeys::main(&observation.identity, &observation.network)
            }
            StoredEntry::Relay(observation) => CandidateKeys::leg(
                &observation.identity,
                observation.leg_index,
                &observation.recipient,
            ),
            StoredEntry::Leg(leg) => {
                CandidateKeys::leg(&leg.identity, leg.leg_index, &leg.network)
            }
        }
    }
}

/// Correlates independently observed sides of a cross-chain message.
///
/// All operations serialize on one async mutex around their full
/// read-check-write sequence; see the module docs for why that guard is a
/// correctness requirement and not a tuning knob.
pub struct MatchingEngine {
    store: MatchingStore,
    sink: Arc<dyn NotificationSink>,
    expiry: Arc<dyn ExpiryScheduler>,
    settings: MatchingSettings,
    guard: Mutex<()>,
}

impl MatchingEngine {
    pub fn new(
        store: MatchingStore,
        sink: Arc<dyn NotificationSink>,
        expiry: Arc<dyn ExpiryScheduler>,
        settings: MatchingSettings,
    ) -> Self {
        Self {
            store,
            sink,
            expiry,
            settings,
            guard: Mutex::new(()),
        }
    }

    /// A chain reported a message sent. Matches a waiting receipt or parks
    /// the observation until one arrives.
    pub async fn on_outbound(&self, observation: OutboundObservation) -> Result<()> {
        let _guard = self.guard.lock().await;

        let keys = CandidateKeys::main(&observation.identity, &observation.recipient);
        let counterpart = self
            .first_hit(Namespace::Inbound, &keys)
            .await
            .context("looking up inbound counterpart")?;

        match counterpart {
            Some(StoredEntry::Inbound(inbound)) => {
                self.remove_entry(Namespace::Inbound, &StoredEntry::Inbound(inbound.clone()))
                    .await
                    .context("clearing matched inbound entry")?;
                self.emit_matched(TrackedOutbound::new(observation), inbound)
                    .await;
            }
            Some(other) => {
                tracing::warn!(
                    hash = %other.identity(),
                    "unexpected entry under inbound key, leaving it in place"
                );
            }
            None => {
                let mut tracked = TrackedOutbound::new(observation);
                let merged = self
                    .merge_parked_relays(&mut tracked)
                    .await
                    .context("merging parked relay passages")?;
                self.put_all(Namespace::Outbound, &keys, &StoredEntry::Outbound(tracked.clone()))
                    .await
                    .context("storing outbound observation")?;
                tracing::debug!(
                    hash = %tracked.observation.identity,
                    recipient = %tracked.observation.recipient,
                    legs = tracked.observation.legs.len(),
                    "outbound stored, waiting for receipt"
                );
                for relay in merged {
                    let identity = tracked.observation.identity.merge(&relay.identity);
                    self.emit(JourneyEvent::Relayed {
                        identity,
                        leg_index: relay.leg_index,
                        waypoint: relay.waypoint,
                    })
                    .await;
                }
            }
        }
        Ok(())
    }

    /// A chain reported a message processed. Matches a waiting outbound or
    /// parks the receipt with an expiry request, since a receipt with no
    /// send observation may represent a message that was never tracked.
    pub async fn on_inbound(&self, observation: InboundObservation) -> Result<()> {
        let _guard = self.guard.lock().await;

        let keys = CandidateKeys::main(&observation.identity, &observation.network);
        let counterpart = self
            .first_hit(Namespace::Outbound, &keys)
            .await
            .context("looking up outbound counterpart")?;

        match counterpart {
            Some(StoredEntry::Outbound(tracked)) => {
                self.remove_entry(Namespace::Outbound, &StoredEntry::Outbound(tracked.clone()))
                    .await
                    .context("clearing matched outbound entry")?;
                self.emit_matched(tracked, observation).await;
            }
            Some(other) => {
                tracing::warn!(
                    hash = %other.identity(),
                    "unexpected entry under outbound key, leaving it in place"
                );
            }
            None => {
                tracing::debug!(
                    hash = %observation.identity,
                    chain = %observation.network,
                    outcome = observation.waypoint.outcome.as_str(),
                    "receipt stored, waiting for outbound"
                );
                self.put_all(
                    Namespace::Inbound,
                    &keys,
                    &StoredEntry::Inbound(observation),
                )
                .await
                .context("storing inbound observation")?;
                self.request_expiry(Namespace::Inbound, &keys).await;
            }
        }
        Ok(())
    }

    /// The relay chain carried the message on one of its legs. Annotates the
    /// stored outbound when present, otherwise parks the passage until the
    /// outbound arrives.
    pub async fn on_relayed(&self, observation: RelayObservation) -> Result<()> {
        let _guard = self.guard.lock().await;

        let main_keys = CandidateKeys::main(&observation.identity, &observation.recipient);
        let counterpart = self
            .first_hit(Namespace::Outbound, &main_keys)
            .await
            .context("looking up outbound for relay passage")?;

        match counterpart {
            Some(StoredEntry::Outbound(mut tracked)) => {
                if let Some(status) = tracked.leg_status.get_mut(observation.leg_index) {
                    if *status == LegStatus::Pending {
                        *status = LegStatus::Relayed;
                    }
                } else {
                    tracing::warn!(
                        hash = %observation.identity,
                        leg = observation.leg_index,
                        legs = tracked.observation.legs.len(),
                        "relay passage for a leg outside the plan"
                    );
                }
                let keys = CandidateKeys::main(
                    &tracked.observation.identity,
                    &tracked.observation.recipient,
                );
                self.put_all(Namespace::Outbound, &keys, &StoredEntry::Outbound(tracked))
                    .await
                    .context("rewriting annotated outbound entry")?;
                let identity = observation.identity;
                self.emit(JourneyEvent::Relayed {
                    identity,
                    leg_index: observation.leg_index,
                    waypoint: observation.waypoint,
                })
                .await;
            }
            Some(other) => {
                tracing::warn!(
                    hash = %other.identity(),
                    "unexpected entry under outbound key, leaving it in place"
                );
            }
            None => {
                let keys = CandidateKeys::leg(
                    &observation.identity,
                    observation.leg_index,
                    &observation.recipient,
                );
                self.put_all(Namespace::Relay, &keys, &StoredEntry::Relay(observation))
                    .await
                    .context("parking relay passage")?;
                self.request_expiry(Namespace::Relay, &keys).await;
            }
        }
        Ok(())
    }

    /// A message entered or left an intermediate hop chain.
    pub async fn on_hop(&self, observation: LegObservation, direction: Direction) -> Result<()> {
        let tracked = TrackedLeg {
            identity: observation.identity,
            network: observation.network,
            leg_index: observation.leg_index,
            waypoint: observation.waypoint,
            direction,
            bridge_type: None,
        };
        self.on_leg(tracked).await.context("processing hop leg")
    }

    /// A message crossed a consensus boundary over a bridge.
    pub async fn on_bridge(
        &self,
        observation: BridgeObservation,
        direction: Direction,
    ) -> Result<()> {
        let tracked = TrackedLeg {
            identity: observation.identity,
            network: observation.network,
            leg_index: observation.leg_index,
            waypoint: observation.waypoint,
            direction,
            bridge_type: Some(observation.bridge_type),
        };
        self.on_leg(tracked).await.context("processing bridge leg")
    }

    /// Shared store-or-merge for leg-scoped observations. Matching a leg
    /// never touches the main outbound/inbound tracking: legs correlate
    /// independently and downstream consumers stitch the journey together,
    /// which keeps the engine's footprint bounded by unmatched single-leg
    /// entries rather than in-flight multi-hop journeys.
    async fn on_leg(&self, observation: TrackedLeg) -> Result<()> {
        let _guard = self.guard.lock().await;

        let keys = CandidateKeys::leg(
            &observation.identity,
            observation.leg_index,
            &observation.network,
        );
        let (read_ns, write_ns) = match observation.direction {
            Direction::In => (Namespace::Outbound, Namespace::Inbound),
            Direction::Out => (Namespace::Inbound, Namespace::Outbound),
        };

        let counterpart = self.first_hit(read_ns, &keys).await?;
        match counterpart {
            Some(entry @ StoredEntry::Leg(_)) => {
                self.remove_entry(read_ns, &entry).await?;
                let identity = observation.identity.merge(entry.identity());
                let event = match observation.bridge_type {
                    Some(bridge_type) => JourneyEvent::Bridge {
                        identity,
                        leg_index: observation.leg_index,
                        direction: observation.direction,
                        bridge_type,
                        waypoint: observation.waypoint,
                    },
                    None => JourneyEvent::Hop {
                        identity,
                        leg_index: observation.leg_index,
                        direction: observation.direction,
                        waypoint: observation.waypoint,
                    },
                };
                self.emit(event).await;
            }
            Some(other) => {
                tracing::warn!(
                    hash = %other.identity(),
                    "unexpected entry under leg key, leaving it in place"
                );
            }
            None => {
                let schedule = observation.direction == Direction::In;
                self.put_all(write_ns, &keys, &StoredEntry::Leg(observation))
                    .await?;
                if schedule {
                    self.request_expiry(write_ns, &keys).await;
                }
            }
        }
        Ok(())
    }

    /// Expiry callback for a previously scheduled key. A concurrent late
    /// match may already have removed the entry; that is not an error and
    /// produces no event.
    pub async fn on_timeout_sweep(&self, key: &str) -> Result<()> {
        let _guard = self.guard.lock().await;

        let Some((namespace, bare)) = MatchingStore::split_key(key) else {
            tracing::warn!(key, "sweep for a key outside any known namespace");
            return Ok(());
        };

        let entry: Option<StoredEntry> = self
            .store
            .get(namespace, bare)
            .await
            .context("loading entry for timeout sweep")?;
        match entry {
            Some(entry) => {
                self.remove_entry(namespace, &entry)
                    .await
                    .context("removing expired entry")?;
                metrics::TIMEOUT_TOTAL
                    .with_label_values(&[namespace.prefix()])
                    .inc();
                tracing::info!(
                    hash = %entry.identity(),
                    chain = %entry.network(),
                    namespace = namespace.prefix(),
                    "entry expired unmatched"
                );
                self.emit(JourneyEvent::Timeout {
                    identity: entry.identity().clone(),
                    network: entry.network().clone(),
                })
                .await;
            }
            None => {
                tracing::debug!(key, "swept key already cleared, nothing to do");
            }
        }
        Ok(())
    }

    /// Probe the candidate keys in lookup order and return the first entry.
    async fn first_hit(
        &self,
        namespace: Namespace,
        keys: &CandidateKeys,
    ) -> Result<Option<StoredEntry>, StoreError> {
        for key in keys.lookup_order() {
            if let Some(entry) = self.store.get::<StoredEntry>(namespace, key).await? {
                metrics::LOOKUP_TOTAL
                    .with_label_values(&[namespace.prefix(), "hit"])
                    .inc();
                return Ok(Some(entry));
            }
        }
        metrics::LOOKUP_TOTAL
            .with_label_values(&[namespace.prefix(), "miss"])
            .inc();
        Ok(None)
    }

    async fn put_all(
        &self,
        namespace: Namespace,
        keys: &CandidateKeys,
        entry: &StoredEntry,
    ) -> Result<(), StoreError> {
        for key in keys.all() {
            self.store.put(namespace, key, entry).await?;
        }
        metrics::STORED_TOTAL
            .with_label_values(&[namespace.prefix()])
            .inc();
        Ok(())
    }

    async fn remove_entry(
        &self,
        namespace: Namespace,
        entry: &StoredEntry,
    ) -> Result<(), StoreError> {
        for key in entry.candidate_keys().all() {
            self.store.delete(namespace, key).await?;
        }
        Ok(())
    }

    /// Collect parked relay passages for every relayed leg of a fresh
    /// outbound, annotating the plan and clearing the parking space.
    async fn merge_parked_relays(
        &self,
        tracked: &mut TrackedOutbound,
    ) -> Result<Vec<RelayObservation>, StoreError> {
        let mut merged = Vec::new();
        let relayed_legs: Vec<usize> = tracked
            .observation
            .legs
            .iter()
            .enumerate()
            .filter(|(_, leg)| leg.relay.is_some())
            .map(|(index, _)| index)
            .collect();

        for index in relayed_legs {
            let keys = CandidateKeys::leg(
                &tracked.observation.identity,
                index,
                &tracked.observation.recipient,
            );
            if let Some(entry @ StoredEntry::Relay(_)) = self.first_hit(Namespace::Relay, &keys).await? {
                self.remove_entry(Namespace::Relay, &entry).await?;
                if let StoredEntry::Relay(observation) = entry {
                    if let Some(status) = tracked.leg_status.get_mut(index) {
                        *status = LegStatus::Relayed;
                    }
                    merged.push(observation);
                }
            }
        }
        Ok(merged)
    }

    async fn request_expiry(&self, namespace: Namespace, keys: &CandidateKeys) {
        let qualified: Vec<String> = keys
            .all()
            .map(|key| MatchingStore::qualified_key(namespace, key))
            .collect();
        if let Err(error) = self
            .expiry
            .schedule(self.settings.expiry_ttl, qualified)
            .await
        {
            tracing::error!(error = ?error, "failed to schedule expiry sweep");
        }
    }

    /// Assemble the journey and notify. Deletion of both sides has already
    /// happened under the same guard, so the match is emitted at most once
    /// even under duplicate delivery.
    async fn emit_matched(&self, tracked: TrackedOutbound, inbound: InboundObservation) {
        let TrackedOutbound {
            observation,
            mut leg_status,
        } = tracked;
        if let Some(last) = leg_status.last_mut() {
            *last = LegStatus::Received;
        }

        let identity = observation.identity.merge(&inbound.identity);
        let trapped: Option<TrappedAssets> = inbound
            .waypoint
            .has_trapped_assets()
            .then(|| inbound.waypoint.trapped.clone())
            .flatten();

        metrics::MATCHED_TOTAL
            .with_label_values(&[inbound.waypoint.outcome.as_str()])
            .inc();
        tracing::info!(
            hash = %identity,
            origin = %observation.sent.network,
            destination = %inbound.network,
            outcome = inbound.waypoint.outcome.as_str(),
            "journey matched"
        );

        let journey = Journey {
            identity,
            origin: observation.sent,
            destination: inbound.waypoint,
            legs: observation.legs,
            leg_status,
            status: JourneyStatus::Matched,
        };

        self.emit(JourneyEvent::Matched(journey.clone())).await;
        if let Some(assets) = trapped {
            self.emit(JourneyEvent::Trapped { journey, assets }).await;
        }
    }

    async fn emit(&self, event: JourneyEvent) {
        metrics::NOTIFICATIONS_TOTAL
            .with_label_values(&[event.kind()])
            .inc();
        if let Err(error) = self.sink.notify(event).await {
            // Delivery is downstream's concern; a rejected event must not
            // stall correlation of other messages.
            tracing::error!(error = ?error, "notification sink rejected journey event");
        }
    }
}
