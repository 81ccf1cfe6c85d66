//! In-memory directory.
//!
//! Useful for testing and programmatic setups.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;
use tokio::time::sleep;
use tracing::trace;

use super::{Directory, DirectoryError};
use crate::config::{
    Config, DialPlanConfig, DirectoryConfig, PolicyConfig, RouteConfig, SubscriberConfig,
};

/// In-memory directory.
///
/// Serves lookups from a snapshot held in memory and supports:
/// - Programmatic updates
/// - Simulated latency
/// - Simulated outages
///
/// # Example
///
/// ```ignore
/// use dialroute::directory::MemoryDirectory;
///
/// let directory = MemoryDirectory::new(snapshot).with_latency(Duration::from_millis(20));
///
/// // Swap the snapshot
/// directory.update(new_snapshot);
/// ```
#[derive(Debug)]
pub struct MemoryDirectory {
    snapshot: RwLock<DirectoryConfig>,
    latency: Duration,
    unavailable: AtomicBool,
    lookups: AtomicU64,
}

impl MemoryDirectory {
    /// Create a directory from a snapshot.
    pub fn new(snapshot: DirectoryConfig) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            latency: Duration::ZERO,
            unavailable: AtomicBool::new(false),
            lookups: AtomicU64::new(0),
        }
    }

    /// Create a directory from a YAML configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self, DirectoryError> {
        let config = Config::from_yaml(yaml).map_err(|e| DirectoryError::Parse(e.to_string()))?;
        Ok(Self::new(config.directory))
    }

    /// Set simulated latency per lookup.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Replace the snapshot.
    pub fn update(&self, snapshot: DirectoryConfig) {
        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        *guard = snapshot;
    }

    /// Get the current snapshot.
    pub fn current(&self) -> DirectoryConfig {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Simulate an outage: every lookup fails with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// Total lookups served (including failed ones).
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    async fn read<T>(&self, f: impl FnOnce(&DirectoryConfig) -> T) -> Result<T, DirectoryError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }

        if self.unavailable.load(Ordering::Relaxed) {
            return Err(DirectoryError::Unavailable("memory directory offline".to_string()));
        }

        let guard = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
        Ok(f(&guard))
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn subscriber(&self, identity: &str) -> Result<Option<SubscriberConfig>, DirectoryError> {
        trace!(identity, "memory directory subscriber lookup");
        self.read(|d| d.subscribers.iter().find(|s| s.identity == identity).cloned())
            .await
    }

    async fn dial_plan(&self, name: &str) -> Result<Option<DialPlanConfig>, DirectoryError> {
        self.read(|d| d.dial_plans.iter().find(|p| p.name == name).cloned())
            .await
    }

    async fn policy(&self, name: &str) -> Result<Option<PolicyConfig>, DirectoryError> {
        self.read(|d| d.policies.iter().find(|p| p.name == name).cloned())
            .await
    }

    async fn routes(&self) -> Result<Vec<RouteConfig>, DirectoryError> {
        self.read(|d| d.routes.clone()).await
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
