//! Configuration specification types for the deployment generator.
//!
//! This module defines the structs that map to the deployment configuration
//! file. Optional sections default to "absent" so a minimal service entry
//! only needs a name, a controller and its config paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Replica ceiling used by autoscaled services that do not set `max_replicas`.
pub const DEFAULT_MAX_REPLICAS: u32 = 10;

/// The root configuration structure for a deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentConfig {
    /// Directory holding the per-service application config files.
    pub application_config_subdir: String,
    /// Services to generate, in output order.
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
    /// Chain identifier, informational only.
    #[serde(default)]
    pub chain_id: Option<String>,
    /// Image repository override (without tag).
    #[serde(default)]
    pub image: Option<String>,
}

/// Configuration for a single service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Service name, unique after sanitization.
    pub name: String,
    /// Workload controller kind (`Deployment` or `StatefulSet`, any case).
    pub controller: String,
    /// Application config files, merged in order.
    #[serde(default)]
    pub config_paths: Vec<String>,
    /// Optional ingress exposure.
    #[serde(default)]
    pub ingress: Option<IngressConfig>,
    /// Whether a horizontal pod autoscaler manages the replica count.
    #[serde(default)]
    pub autoscale: bool,
    /// Replica count (minimum replicas when autoscaled).
    #[serde(default = "default_replicas")]
    pub replicas: u32,
    /// Upper bound for the autoscaler.
    #[serde(default)]
    pub max_replicas: Option<u32>,
    /// Persistent storage size in GiB.
    #[serde(default)]
    pub storage: Option<u32>,
    /// Node pool toleration value.
    #[serde(default)]
    pub toleration: Option<String>,
    /// CPU and memory requests and limits.
    #[serde(default)]
    pub resources: Option<Resources>,
    /// Secret pulled from the cloud secret manager.
    #[serde(default)]
    pub external_secret: Option<ExternalSecretConfig>,
}

/// Workload controller kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Controller {
    /// Stateless `apps/v1` Deployment.
    Deployment,
    /// `apps/v1` StatefulSet with stable identity and per-pod storage.
    StatefulSet,
}

/// Ingress configuration for a service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngressConfig {
    /// Primary host name.
    pub domain: String,
    /// Additional host names; `null` is treated as empty.
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub alternative_names: Vec<String>,
    /// Whether the ingress uses an internal load balancer.
    #[serde(default)]
    pub internal: bool,
    /// HTTP routing rules.
    #[serde(default)]
    pub rules: Vec<IngressRule>,
}

/// A single ingress routing rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngressRule {
    /// URL path prefix.
    pub path: String,
    /// Service port traffic is routed to.
    pub port: u16,
    /// Backend service name; defaults to the service itself.
    #[serde(default)]
    pub backend: Option<String>,
}

/// Requests and limits for a service container.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resources {
    /// Guaranteed resources.
    pub requests: Resource,
    /// Resource ceiling.
    pub limits: Resource,
}

/// A CPU/memory pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource {
    /// CPU cores.
    pub cpu: u32,
    /// Memory in GiB.
    pub memory: u32,
}

/// Reference to a secret stored in Google Cloud Secret Manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalSecretConfig {
    /// Secret manager key.
    pub gcsm_key: String,
}

const fn default_replicas() -> u32 {
    1
}

fn deserialize_null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl FromStr for Controller {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deployment" => Ok(Self::Deployment),
            "statefulset" => Ok(Self::StatefulSet),
            other => Err(format!(
                "Invalid controller: {other}. Expected: deployment or statefulset"
            )),
        }
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deployment => write!(f, "Deployment"),
            Self::StatefulSet => write!(f, "StatefulSet"),
        }
    }
}

impl DeploymentConfig {
    /// Returns service names in declaration order.
    #[must_use]
    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name.as_str()).collect()
    }
}

impl ServiceConfig {
    /// Resolves the controller string into a [`Controller`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownController`] for anything other than
    /// deployment or statefulset.
    pub fn controller_kind(&self) -> Result<Controller, ConfigError> {
        self.controller
            .parse()
            .map_err(|_| ConfigError::UnknownController {
                service: self.name.clone(),
                kind: self.controller.clone(),
            })
    }

    /// Returns the autoscaler ceiling, falling back to [`DEFAULT_MAX_REPLICAS`].
    #[must_use]
    pub fn effective_max_replicas(&self) -> u32 {
        self.max_replicas.unwrap_or(DEFAULT_MAX_REPLICAS)
    }
}

impl Resource {
    /// Creates a new CPU/memory pair.
    #[must_use]
    pub const fn new(cpu: u32, memory: u32) -> Self {
        Self { cpu, memory }
    }

    /// Returns true if neither dimension exceeds `other`.
    #[must_use]
    pub const fn fits_within(&self, other: &Self) -> bool {
        self.cpu <= other.cpu && self.memory <= other.memory
    }
}
