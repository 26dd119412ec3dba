//! Seam to the cloud provider API.
//!
//! `Fn::GetAZs` and `Fn::ImportValue` need live account data. The resolver
//! reaches it only through [`CloudProvider`], so everything else runs
//! offline.

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CloudError {
    #[error("Cloud provider unavailable: {0}")]
    Unavailable(String),

    #[error("Cloud request failed: {0}")]
    Request(String),
}

/// Live account data used by `Fn::GetAZs` and `Fn::ImportValue`.
///
/// Calls may be slow and may fail. Timeouts and retries belong to the
/// implementation; the resolver propagates any error as fatal.
pub trait CloudProvider {
    /// Availability zone names of `region`, in provider order.
    fn list_availability_zones(&self, region: &str) -> Result<Vec<String>, CloudError>;

    /// All stack exports visible to the account, by export name.
    fn list_exports(&self) -> Result<IndexMap<String, String>, CloudError>;
}

/// Provider backed by fixed tables. Deserializes from
/// `{"availability_zones": {region: [zone, ...]}, "exports": {name: value}}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StaticCloud {
    pub availability_zones: IndexMap<String, Vec<String>>,
    pub exports: IndexMap<String, String>,
}

impl StaticCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zones<I, S>(mut self, region: &str, zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.availability_zones
            .insert(region.to_string(), zones.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_export(mut self, name: &str, value: &str) -> Self {
        self.exports.insert(name.to_string(), value.to_string());
        self
    }
}

impl CloudProvider for StaticCloud {
    fn list_availability_zones(&self, region: &str) -> Result<Vec<String>, CloudError> {
        self.availability_zones
            .get(region)
            .cloned()
            .ok_or_else(|| CloudError::Request(format!("unknown region {}", region)))
    }

    fn list_exports(&self) -> Result<IndexMap<String, String>, CloudError> {
        Ok(self.exports.clone())
    }
}

/// Provider for environments without account access. Every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineCloud;

impl CloudProvider for OfflineCloud {
    fn list_availability_zones(&self, region: &str) -> Result<Vec<String>, CloudError> {
        Err(CloudError::Unavailable(format!(
            "cannot list availability zones of {} offline",
            region
        )))
    }

    fn list_exports(&self) -> Result<IndexMap<String, String>, CloudError> {
        Err(CloudError::Unavailable("cannot list exports offline".to_string()))
    }
}

/// Provider access scoped to one resolution.
///
/// The export table is fetched on the first `Fn::ImportValue` and reused
/// until the session is dropped.
pub struct CloudSession<'a> {
    provider: &'a dyn CloudProvider,
    exports: Option<IndexMap<String, String>>,
}

impl<'a> CloudSession<'a> {
    pub fn new(provider: &'a dyn CloudProvider) -> Self {
        CloudSession {
            provider,
            exports: None,
        }
    }

    pub fn availability_zones(&self, region: &str) -> Result<Vec<String>, CloudError> {
        debug!(region, "listing availability zones");
        self.provider.list_availability_zones(region)
    }

    /// Value of the export `name`, or `None` if no stack exports it.
    pub fn import_value(&mut self, name: &str) -> Result<Option<String>, CloudError> {
        if self.exports.is_none() {
            debug!("fetching export table");
            self.exports = Some(self.provider.list_exports()?);
        }
        Ok(self.exports.as_ref().and_then(|exports| exports.get(name).cloned()))
    }
}
