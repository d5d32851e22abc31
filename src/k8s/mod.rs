//! Kubernetes object model.
//!
//! Only the fields the generator emits are modelled. Every object is wrapped
//! in [`ApiObject`], which serializes `apiVersion` and `kind` ahead of the
//! object's own fields so the rendered YAML reads like a hand-written
//! manifest.

mod autoscaling;
mod meta;
mod monitoring;
mod network;
mod storage;
mod workload;

pub use autoscaling::{
    CrossVersionObjectReference, HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec,
    MetricSpec, MetricTarget, ResourceMetricSource,
};
pub use meta::{LabelSelector, ObjectMeta, TemplateMeta};
pub use monitoring::{PodMonitoring, PodMonitoringSpec, ScrapeEndpoint};
pub use network::{
    HttpIngressPath, HttpIngressRuleValue, Ingress, IngressBackend, IngressHostRule,
    IngressServiceBackend, IngressSpec, ManagedCertificate, ManagedCertificateSpec, Service,
    ServiceBackendPort, ServicePort, ServiceSpec,
};
pub use storage::{
    ConfigMap, DEFAULT_STORAGE_CLASS, ExternalSecret, ExternalSecretData, ExternalSecretSpec,
    ExternalSecretTarget, PersistentVolumeClaim, PersistentVolumeClaimSpec, RemoteRef,
    SecretStoreRef, VolumeResourceRequirements,
};
pub use workload::{
    Container, ContainerPort, Deployment, DeploymentSpec, HttpGetAction, PodSpec,
    PodTemplateSpec, Probe, ResourceRequirements, StatefulSet, StatefulSetSpec, Toleration,
    Volume, VolumeMount, VolumeSource,
};

use serde::{Serialize, Serializer};

/// Any resource the generator can emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiObject {
    /// `v1` ConfigMap.
    ConfigMap(ConfigMap),
    /// `v1` Service.
    Service(Service),
    /// `apps/v1` Deployment.
    Deployment(Deployment),
    /// `apps/v1` StatefulSet.
    StatefulSet(StatefulSet),
    /// `v1` PersistentVolumeClaim.
    PersistentVolumeClaim(PersistentVolumeClaim),
    /// `autoscaling/v2` HorizontalPodAutoscaler.
    HorizontalPodAutoscaler(HorizontalPodAutoscaler),
    /// `networking.k8s.io/v1` Ingress.
    Ingress(Ingress),
    /// `networking.gke.io/v1` ManagedCertificate.
    ManagedCertificate(ManagedCertificate),
    /// `external-secrets.io/v1beta1` ExternalSecret.
    ExternalSecret(ExternalSecret),
    /// `monitoring.googleapis.com/v1` PodMonitoring.
    PodMonitoring(PodMonitoring),
}

/// Serialization envelope adding `apiVersion` and `kind`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TypedObject<'a, T> {
    api_version: &'static str,
    kind: &'static str,
    #[serde(flatten)]
    object: &'a T,
}

impl ApiObject {
    /// Returns the object's API group version.
    #[must_use]
    pub const fn api_version(&self) -> &'static str {
        match self {
            Self::ConfigMap(_) | Self::Service(_) | Self::PersistentVolumeClaim(_) => "v1",
            Self::Deployment(_) | Self::StatefulSet(_) => "apps/v1",
            Self::HorizontalPodAutoscaler(_) => "autoscaling/v2",
            Self::Ingress(_) => "networking.k8s.io/v1",
            Self::ManagedCertificate(_) => "networking.gke.io/v1",
            Self::ExternalSecret(_) => "external-secrets.io/v1beta1",
            Self::PodMonitoring(_) => "monitoring.googleapis.com/v1",
        }
    }

    /// Returns the object's kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ConfigMap(_) => "ConfigMap",
            Self::Service(_) => "Service",
            Self::Deployment(_) => "Deployment",
            Self::StatefulSet(_) => "StatefulSet",
            Self::PersistentVolumeClaim(_) => "PersistentVolumeClaim",
            Self::HorizontalPodAutoscaler(_) => "HorizontalPodAutoscaler",
            Self::Ingress(_) => "Ingress",
            Self::ManagedCertificate(_) => "ManagedCertificate",
            Self::ExternalSecret(_) => "ExternalSecret",
            Self::PodMonitoring(_) => "PodMonitoring",
        }
    }

    /// Returns the object's metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::ConfigMap(o) => &o.metadata,
            Self::Service(o) => &o.metadata,
            Self::Deployment(o) => &o.metadata,
            Self::StatefulSet(o) => &o.metadata,
            Self::PersistentVolumeClaim(o) => &o.metadata,
            Self::HorizontalPodAutoscaler(o) => &o.metadata,
            Self::Ingress(o) => &o.metadata,
            Self::ManagedCertificate(o) => &o.metadata,
            Self::ExternalSecret(o) => &o.metadata,
            Self::PodMonitoring(o) => &o.metadata,
        }
    }

    /// Returns the object's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata().name
    }

    /// Returns a `Kind/name` identifier for logs and errors.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}/{}", self.kind(), self.name())
    }

    /// Returns the manifest file name for this object.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}.k8s.yaml", self.kind(), self.name())
    }

    /// Renders the object as a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be serialized.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl Serialize for ApiObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let api_version = self.api_version();
        let kind = self.kind();

        macro_rules! typed {
            ($object:expr) => {
                TypedObject {
                    api_version,
                    kind,
                    object: $object,
                }
                .serialize(serializer)
            };
        }

        match self {
            Self::ConfigMap(o) => typed!(o),
            Self::Service(o) => typed!(o),
            Self::Deployment(o) => typed!(o),
            Self::StatefulSet(o) => typed!(o),
            Self::PersistentVolumeClaim(o) => typed!(o),
            Self::HorizontalPodAutoscaler(o) => typed!(o),
            Self::Ingress(o) => typed!(o),
            Self::ManagedCertificate(o) => typed!(o),
            Self::ExternalSecret(o) => typed!(o),
            Self::PodMonitoring(o) => typed!(o),
        }
    }
}

macro_rules! impl_from_object {
    ($($kind:ident),* $(,)?) => {
        $(
            impl From<$kind> for ApiObject {
                fn from(object: $kind) -> Self {
                    Self::$kind(object)
                }
            }
        )*
    };
}

impl_from_object!(
    ConfigMap,
    Service,
    Deployment,
    StatefulSet,
    PersistentVolumeClaim,
    HorizontalPodAutoscaler,
    Ingress,
    ManagedCertificate,
    ExternalSecret,
    PodMonitoring,
);
