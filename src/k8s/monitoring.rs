//! Managed Prometheus scrape configuration (`monitoring.googleapis.com/v1`).

use serde::Serialize;

use super::meta::{LabelSelector, ObjectMeta};

/// PodMonitoring custom resource.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PodMonitoring {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: PodMonitoringSpec,
}

/// PodMonitoring spec.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PodMonitoringSpec {
    /// Scraped pods.
    pub selector: LabelSelector,
    /// Scrape endpoints.
    pub endpoints: Vec<ScrapeEndpoint>,
}

/// A scrape endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScrapeEndpoint {
    /// Named container port.
    pub port: String,
    /// Metrics path.
    pub path: String,
    /// Scrape interval.
    pub interval: String,
}
