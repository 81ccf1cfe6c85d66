//! Directory backends.
//!
//! The directory is the source of truth for subscribers, dial plans, routing
//! policies and the route catalog. Resolution never talks to a backend
//! directly; it goes through the [`Directory`] trait so backends (file,
//! memory, a remote administration API) are interchangeable.
//!
//! # Built-in Implementations
//!
//! - [`FileDirectory`] - Snapshot file (YAML, JSON, TOML), read once per resolution
//! - [`MemoryDirectory`] - In-memory snapshot (for testing)
//!
//! # Example
//!
//! ```ignore
//! use dialroute::directory::{Directory, MemoryDirectory};
//!
//! let directory = MemoryDirectory::new(config.directory);
//! let subscriber = directory.subscriber("alice@contoso.com").await?;
//! ```

mod file;
mod memory;

pub use file::FileDirectory;
pub use memory::MemoryDirectory;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{DialPlanConfig, PolicyConfig, RouteConfig, SubscriberConfig};

/// Directory access error.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Backend could not serve the request.
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    /// Lookup did not complete in time.
    #[error("directory lookup timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Directory backend trait.
///
/// Lookups return raw records; a missing record is `Ok(None)`, not an error.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Look up a subscriber by identity.
    async fn subscriber(&self, identity: &str) -> Result<Option<SubscriberConfig>, DirectoryError>;

    /// Look up a dial plan by name.
    async fn dial_plan(&self, name: &str) -> Result<Option<DialPlanConfig>, DirectoryError>;

    /// Look up a routing policy by name.
    async fn policy(&self, name: &str) -> Result<Option<PolicyConfig>, DirectoryError>;

    /// Fetch the full route catalog, in catalog order.
    async fn routes(&self) -> Result<Vec<RouteConfig>, DirectoryError>;

    /// Take a frozen view of the backend for one resolution.
    ///
    /// All lookups of a request go through the returned view, so they see the
    /// same data. Backends whose lookups are already consistent return `None`
    /// and are queried directly.
    async fn snapshot(&self) -> Result<Option<BoxDirectory>, DirectoryError> {
        Ok(None)
    }

    /// Get the backend name for logging.
    fn name(&self) -> &'static str;
}

/// A shared directory.
pub type BoxDirectory = Arc<dyn Directory>;
