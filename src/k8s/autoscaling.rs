//! Horizontal pod autoscaling (`autoscaling/v2`).

use serde::Serialize;

use super::meta::ObjectMeta;

/// `autoscaling/v2` HorizontalPodAutoscaler.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HorizontalPodAutoscaler {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: HorizontalPodAutoscalerSpec,
}

/// Autoscaler spec.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HorizontalPodAutoscalerSpec {
    /// Scaled workload.
    pub scale_target_ref: CrossVersionObjectReference,
    /// Lower replica bound.
    pub min_replicas: u32,
    /// Upper replica bound.
    pub max_replicas: u32,
    /// Scaling metrics.
    pub metrics: Vec<MetricSpec>,
}

/// Reference to the scaled workload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CrossVersionObjectReference {
    /// Workload API version.
    pub api_version: String,
    /// Workload kind.
    pub kind: String,
    /// Workload name.
    pub name: String,
}

/// A scaling metric.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetricSpec {
    /// Metric source type.
    #[serde(rename = "type")]
    pub metric_type: String,
    /// Container resource metric.
    pub resource: ResourceMetricSource,
}

/// Resource metric source.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResourceMetricSource {
    /// Resource name (`cpu`, `memory`).
    pub name: String,
    /// Target value.
    pub target: MetricTarget,
}

/// Utilization target.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetricTarget {
    /// Target type.
    #[serde(rename = "type")]
    pub target_type: String,
    /// Average utilization percentage of the request.
    pub average_utilization: u32,
}

impl MetricSpec {
    /// Creates a resource utilization metric.
    #[must_use]
    pub fn utilization(resource: impl Into<String>, percent: u32) -> Self {
        Self {
            metric_type: String::from("Resource"),
            resource: ResourceMetricSource {
                name: resource.into(),
                target: MetricTarget {
                    target_type: String::from("Utilization"),
                    average_utilization: percent,
                },
            },
        }
    }
}
