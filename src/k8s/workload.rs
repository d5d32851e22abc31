//! Workload controllers and pod templates (`apps/v1`).

use serde::Serialize;
use std::collections::BTreeMap;

use super::meta::{LabelSelector, ObjectMeta, TemplateMeta};
use super::storage::PersistentVolumeClaim;

/// `apps/v1` Deployment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Deployment {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: DeploymentSpec,
}

/// Deployment spec.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    /// Replica count; omitted when an autoscaler owns it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    /// Pods managed by this deployment.
    pub selector: LabelSelector,
    /// Pod template.
    pub template: PodTemplateSpec,
}

/// `apps/v1` StatefulSet.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatefulSet {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: StatefulSetSpec,
}

/// StatefulSet spec.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatefulSetSpec {
    /// Replica count; omitted when an autoscaler owns it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    /// Governing service.
    pub service_name: String,
    /// Pods managed by this set.
    pub selector: LabelSelector,
    /// Pod template.
    pub template: PodTemplateSpec,
    /// Per-pod volume claims.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volume_claim_templates: Vec<PersistentVolumeClaim>,
}

/// Pod template.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PodTemplateSpec {
    /// Template metadata.
    pub metadata: TemplateMeta,
    /// Pod spec.
    pub spec: PodSpec,
}

/// Pod spec.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    /// Containers.
    pub containers: Vec<Container>,
    /// Volumes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    /// Taints the pod tolerates.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<Toleration>,
    /// Node labels the pod must be scheduled on.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,
    /// Grace period before a terminating pod is killed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_grace_period_seconds: Option<u32>,
}

/// A container.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Container name.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// Pull policy.
    pub image_pull_policy: String,
    /// Arguments.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Exposed ports.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
    /// Requests and limits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
    /// Volume mounts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
    /// Readiness probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Probe>,
    /// Liveness probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<Probe>,
}

/// A named container port.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    /// Port name, referenced by services and probes.
    pub name: String,
    /// Port number.
    pub container_port: u16,
    /// Protocol.
    pub protocol: String,
}

/// Container resource requirements.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct ResourceRequirements {
    /// Requested quantities.
    pub requests: BTreeMap<String, String>,
    /// Limit quantities.
    pub limits: BTreeMap<String, String>,
}

/// A volume mount.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    /// Volume name.
    pub name: String,
    /// Path inside the container.
    pub mount_path: String,
    /// Whether the mount is read-only.
    pub read_only: bool,
}

/// A pod volume.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Volume {
    /// Volume name.
    pub name: String,
    /// Volume source.
    #[serde(flatten)]
    pub source: VolumeSource,
}

/// Supported volume sources.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VolumeSource {
    /// Files from a ConfigMap.
    ConfigMap {
        /// ConfigMap name.
        name: String,
    },
    /// Files from a Secret.
    #[serde(rename_all = "camelCase")]
    Secret {
        /// Secret name.
        secret_name: String,
    },
    /// An existing claim.
    #[serde(rename_all = "camelCase")]
    PersistentVolumeClaim {
        /// Claim name.
        claim_name: String,
    },
}

/// A taint toleration.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Toleration {
    /// Taint key.
    pub key: String,
    /// Match operator.
    pub operator: String,
    /// Taint value.
    pub value: String,
    /// Taint effect.
    pub effect: String,
}

/// An HTTP probe.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    /// HTTP GET target.
    pub http_get: HttpGetAction,
    /// Seconds between probes.
    pub period_seconds: u32,
    /// Seconds before a probe times out.
    pub timeout_seconds: u32,
    /// Consecutive failures before the probe fails.
    pub failure_threshold: u32,
}

/// HTTP GET probe target.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HttpGetAction {
    /// Request path.
    pub path: String,
    /// Named container port.
    pub port: String,
}

impl Probe {
    /// Creates an HTTP probe against a named port.
    #[must_use]
    pub fn http(path: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            http_get: HttpGetAction {
                path: path.into(),
                port: port.into(),
            },
            period_seconds: 10,
            timeout_seconds: 5,
            failure_threshold: 5,
        }
    }
}

impl Toleration {
    /// Creates a `NoSchedule` toleration for `key=value`.
    #[must_use]
    pub fn no_schedule(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            operator: String::from("Equal"),
            value: value.into(),
            effect: String::from("NoSchedule"),
        }
    }
}
