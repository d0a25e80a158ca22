use std::time::Duration;

use async_trait::async_trait;

/// Expiry collaborator boundary.
///
/// `schedule` is fire-and-forget: the collaborator guarantees an eventual
/// [`crate::MatchingEngine::on_timeout_sweep`] callback for each scheduled
/// key, at most once per schedule. Keys removed by a match in the meantime
/// sweep to nothing; the collaborator must treat that as normal.
#[async_trait]
pub trait ExpiryScheduler: Send + Sync {
    async fn schedule(&self, ttl: Duration, keys: Vec<String>) -> anyhow::Result<()>;
}
