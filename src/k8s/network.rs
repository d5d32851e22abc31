//! Services and ingresses.

use serde::Serialize;
use std::collections::BTreeMap;

use super::meta::ObjectMeta;

/// `v1` Service.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Service {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: ServiceSpec,
}

/// Service spec.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServiceSpec {
    /// Service type.
    #[serde(rename = "type")]
    pub service_type: String,
    /// Pods receiving traffic.
    pub selector: BTreeMap<String, String>,
    /// Exposed ports.
    pub ports: Vec<ServicePort>,
}

/// A service port.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    /// Port name.
    pub name: String,
    /// Service port.
    pub port: u16,
    /// Named container port.
    pub target_port: String,
    /// Protocol.
    pub protocol: String,
}

/// `networking.k8s.io/v1` Ingress.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Ingress {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: IngressSpec,
}

/// Ingress spec.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IngressSpec {
    /// Host rules.
    pub rules: Vec<IngressHostRule>,
}

/// `networking.gke.io/v1` ManagedCertificate.
///
/// Google provisions and renews the certificate; the Ingress picks it up
/// through the `networking.gke.io/managed-certificates` annotation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ManagedCertificate {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: ManagedCertificateSpec,
}

/// ManagedCertificate spec.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ManagedCertificateSpec {
    /// Domains covered by the certificate.
    pub domains: Vec<String>,
}

/// Rules for one host.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IngressHostRule {
    /// Host name.
    pub host: String,
    /// HTTP paths.
    pub http: HttpIngressRuleValue,
}

/// HTTP paths of a host rule.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HttpIngressRuleValue {
    /// Paths.
    pub paths: Vec<HttpIngressPath>,
}

/// One routed path.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HttpIngressPath {
    /// Path prefix.
    pub path: String,
    /// Path match type.
    pub path_type: String,
    /// Destination.
    pub backend: IngressBackend,
}

/// Ingress destination.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IngressBackend {
    /// Backend service.
    pub service: IngressServiceBackend,
}

/// Backend service and port.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IngressServiceBackend {
    /// Service name.
    pub name: String,
    /// Service port.
    pub port: ServiceBackendPort,
}

/// Numeric service port.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServiceBackendPort {
    /// Port number.
    pub number: u16,
}

impl HttpIngressPath {
    /// Creates a prefix route to `service:port`.
    #[must_use]
    pub fn prefix(path: impl Into<String>, service: impl Into<String>, port: u16) -> Self {
        Self {
            path: path.into(),
            path_type: String::from("Prefix"),
            backend: IngressBackend {
                service: IngressServiceBackend {
                    name: service.into(),
                    port: ServiceBackendPort { number: port },
                },
            },
        }
    }
}
