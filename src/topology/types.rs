//! Topology record types.

use serde::Serialize;

use crate::config::{Controller, Resources};

/// Fully-resolved description of one service.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServiceTopology {
    /// Service name as written in the configuration.
    pub name: String,
    /// Sanitized chart name; also the base of every object name.
    pub chart_name: String,
    /// Sanitized namespace.
    pub namespace: String,
    /// Workload controller.
    pub controller: Controller,
    /// Full image reference.
    pub image: String,
    /// Static replica count, or the autoscaler minimum.
    pub replicas: u32,
    /// Autoscaling policy, if enabled.
    pub autoscale: Option<AutoscalePolicy>,
    /// Ingress exposure, if any.
    pub ingress: Option<IngressTopology>,
    /// Persistent storage, if any.
    pub storage: Option<StorageSpec>,
    /// Node pool toleration value.
    pub toleration: Option<String>,
    /// Container requests and limits.
    pub resources: Option<Resources>,
    /// Secret manager key.
    pub external_secret: Option<String>,
    /// Ports exposed by the container and the service.
    pub ports: Vec<NamedPort>,
    /// Port serving health and metrics endpoints.
    pub monitoring_port: u16,
    /// Merged application config.
    pub app_config: ApplicationConfig,
}

/// Horizontal autoscaling bounds.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AutoscalePolicy {
    /// Lower replica bound.
    pub min_replicas: u32,
    /// Upper replica bound.
    pub max_replicas: u32,
    /// Target average CPU utilization, in percent of the request.
    pub cpu_utilization: u32,
}

/// Ingress exposure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IngressTopology {
    /// Host names, primary domain first.
    pub hosts: Vec<String>,
    /// Whether an internal load balancer is used.
    pub internal: bool,
    /// Routed paths.
    pub routes: Vec<IngressRoute>,
}

/// One routed path.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IngressRoute {
    /// Path prefix.
    pub path: String,
    /// Backend service name.
    pub service: String,
    /// Backend port.
    pub port: u16,
}

/// Persistent storage.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StorageSpec {
    /// Claim size in GiB.
    pub size_gib: u32,
}

/// A named port.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NamedPort {
    /// Port name (at most 15 characters).
    pub name: String,
    /// Port number.
    pub port: u16,
}

/// Merged application config and its checksum.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApplicationConfig {
    /// Merged JSON object.
    pub document: serde_json::Value,
    /// SHA-256 of the document.
    pub checksum: String,
}

impl ServiceTopology {
    /// Returns the name of the Kubernetes secret populated by the external secret.
    #[must_use]
    pub fn secret_name(&self) -> String {
        format!("{}-secret", self.chart_name)
    }

    /// Returns the name of the application config ConfigMap.
    #[must_use]
    pub fn config_map_name(&self) -> String {
        format!("{}-config", self.chart_name)
    }
}
