//! Matching engine for cross-chain message journeys.
//!
//! # Why this exists
//! A single message is observed on multiple chains by independent producers
//! with no global ordering: the sent event, the receipt, and any relay or hop
//! passages arrive in any order, possibly concurrently, possibly never. The
//! engine stores whichever side arrives first and merges the counterpart when
//! it shows up, emitting each correlated event exactly once.
//!
//! # Storage
//! Observations live behind the [`KvStore`] abstraction in two disjoint
//! namespaces (outbound and inbound) plus a parking space for relay passages
//! seen before their outbound. The same engine logic runs against the
//! in-memory backend (tests, single-node deployments) or any persistent
//! key-value backend.
//!
//! # Concurrency model
//! Every operation takes one global async mutex around its full
//! read-check-write(-delete) sequence. Two producers racing on the same key
//! therefore serialize: the second one sees the effect of the first, which is
//! what makes the at-most-once match guarantee hold. Do not weaken this
//! without re-deriving that guarantee.
//!
//! # Expiry
//! The engine never times itself. Entries without a guaranteed counterpart
//! (inbound receipts, parked relay and leg entries) are reported to the
//! expiry collaborator, which eventually calls back [`MatchingEngine::on_timeout_sweep`].
//! A sweep racing a late match is a benign no-op on either side.

mod engine;
mod keys;
mod memory;
mod store;

pub use engine::MatchingEngine;
pub use memory::InMemoryStore;
pub use store::{KvStore, MatchingStore, Namespace, StoreError};
