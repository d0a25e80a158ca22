use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failed: {0}")]
    Backend(String),
    #[error("stored payload could not be decoded: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Minimal key-value interface the matching engine runs against.
///
/// Implementations must be safe for concurrent use; the engine provides its
/// own serialization on top. Backend failures surface as
/// [`StoreError::Backend`] and are never retried by the engine.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// The disjoint key spaces of the matching store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Namespace {
    Outbound,
    Inbound,
    /// Relay passages observed before their outbound counterpart.
    Relay,
}

impl Namespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Outbound => "out",
            Namespace::Inbound => "in",
            Namespace::Relay => "relay",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Namespace> {
        match prefix {
            "out" => Some(Namespace::Outbound),
            "in" => Some(Namespace::Inbound),
            "relay" => Some(Namespace::Relay),
            _ => None,
        }
    }
}

/// Typed, namespaced view over a [`KvStore`]. Values are stored as JSON.
#[derive(Clone)]
pub struct MatchingStore {
    kv: Arc<dyn KvStore>,
}

impl MatchingStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Fully qualified form of a key, as handed to the expiry collaborator
    /// and received back in [`super::MatchingEngine::on_timeout_sweep`].
    pub fn qualified_key(namespace: Namespace, key: &str) -> String {
        format!("{}:{}", namespace.prefix(), key)
    }

    /// Split a fully qualified key back into namespace and bare key.
    pub fn split_key(qualified: &str) -> Option<(Namespace, &str)> {
        let (prefix, key) = qualified.split_once(':')?;
        Namespace::from_prefix(prefix).map(|namespace| (namespace, key))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        namespace: Namespace,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        let raw = self.kv.get(&Self::qualified_key(namespace, key)).await?;
        raw.map(|bytes| serde_json::from_slice(&bytes))
            .transpose()
            .map_err(StoreError::from)
    }

    pub async fn put<T: Serialize>(
        &self,
        namespace: Namespace,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)?;
        self.kv.put(&Self::qualified_key(namespace, key), bytes).await
    }

    pub async fn delete(&self, namespace: Namespace, key: &str) -> Result<(), StoreError> {
        self.kv.delete(&Self::qualified_key(namespace, key)).await
    }
}
