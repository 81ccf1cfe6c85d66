//! File-based directory.
//!
//! Serves lookups from a snapshot file in YAML, JSON, or TOML format.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use super::{BoxDirectory, Directory, DirectoryError, MemoryDirectory};
use crate::config::{
    loader::Format, Config, DialPlanConfig, DirectoryConfig, PolicyConfig, RouteConfig,
    SubscriberConfig,
};

/// File-based directory.
///
/// The file is re-read for every resolution so edits take effect without a
/// restart. Within one resolution all lookups share a single read (see
/// [`Directory::snapshot`]). The file is only deserialized here; bad patterns
/// and dangling references surface per request when records are compiled.
///
/// # Example
///
/// ```ignore
/// use dialroute::directory::FileDirectory;
///
/// let directory = FileDirectory::new("/etc/dialroute/directory.yaml")?;
/// let routes = directory.routes().await?;
/// ```
#[derive(Debug)]
pub struct FileDirectory {
    path: PathBuf,
    format: Format,
}

impl FileDirectory {
    /// Create a new file directory.
    ///
    /// The format is auto-detected from the file extension.
    pub fn new<P: Into<PathBuf>>(path: P) -> Result<Self, DirectoryError> {
        let path = path.into();
        let format = Format::from_path(&path).ok_or_else(|| {
            DirectoryError::Parse(format!("unsupported snapshot format: {}", path.display()))
        })?;

        debug!(path = %path.display(), format = ?format, "created file directory");

        Ok(Self { path, format })
    }

    /// Create a file directory with explicit format.
    pub fn with_format<P: Into<PathBuf>>(path: P, format: Format) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Get the snapshot file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Get the snapshot format.
    pub fn format(&self) -> Format {
        self.format
    }

    async fn read_snapshot(&self) -> Result<DirectoryConfig, DirectoryError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let config = Config::parse_unvalidated(&contents, self.format)
            .map_err(|e| DirectoryError::Parse(format!("{:#}", e)))?;

        debug!(
            path = %self.path.display(),
            subscribers = config.directory.subscribers.len(),
            routes = config.directory.routes.len(),
            "directory snapshot read"
        );

        Ok(config.directory)
    }
}

#[async_trait]
impl Directory for FileDirectory {
    async fn subscriber(&self, identity: &str) -> Result<Option<SubscriberConfig>, DirectoryError> {
        let snapshot = self.read_snapshot().await?;
        Ok(snapshot.subscribers.into_iter().find(|s| s.identity == identity))
    }

    async fn dial_plan(&self, name: &str) -> Result<Option<DialPlanConfig>, DirectoryError> {
        let snapshot = self.read_snapshot().await?;
        Ok(snapshot.dial_plans.into_iter().find(|p| p.name == name))
    }

    async fn policy(&self, name: &str) -> Result<Option<PolicyConfig>, DirectoryError> {
        let snapshot = self.read_snapshot().await?;
        Ok(snapshot.policies.into_iter().find(|p| p.name == name))
    }

    async fn routes(&self) -> Result<Vec<RouteConfig>, DirectoryError> {
        Ok(self.read_snapshot().await?.routes)
    }

    async fn snapshot(&self) -> Result<Option<BoxDirectory>, DirectoryError> {
        let snapshot = self.read_snapshot().await?;
        Ok(Some(Arc::new(MemoryDirectory::new(snapshot))))
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
