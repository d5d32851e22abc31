//! Configuration and storage objects: ConfigMaps, claims and external secrets.

use serde::Serialize;
use std::collections::BTreeMap;

use super::meta::ObjectMeta;

/// Storage class used for persistent claims.
pub const DEFAULT_STORAGE_CLASS: &str = "premium-rwo";

/// `v1` ConfigMap.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConfigMap {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// String entries.
    pub data: BTreeMap<String, String>,
}

/// `v1` PersistentVolumeClaim; also used as a StatefulSet claim template.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PersistentVolumeClaim {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Claim spec.
    pub spec: PersistentVolumeClaimSpec,
}

/// Claim spec.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersistentVolumeClaimSpec {
    /// Access modes.
    pub access_modes: Vec<String>,
    /// Storage class.
    pub storage_class_name: String,
    /// Requested size.
    pub resources: VolumeResourceRequirements,
}

/// Requested claim size.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VolumeResourceRequirements {
    /// Requested quantities.
    pub requests: BTreeMap<String, String>,
}

/// `external-secrets.io/v1beta1` ExternalSecret.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExternalSecret {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: ExternalSecretSpec,
}

/// ExternalSecret spec.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretSpec {
    /// How often the secret is re-read from the store.
    pub refresh_interval: String,
    /// Store the secret is read from.
    pub secret_store_ref: SecretStoreRef,
    /// Kubernetes secret that receives the data.
    pub target: ExternalSecretTarget,
    /// Individual keys to copy.
    pub data: Vec<ExternalSecretData>,
}

/// Reference to a secret store.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SecretStoreRef {
    /// Store kind.
    pub kind: String,
    /// Store name.
    pub name: String,
}

/// Target Kubernetes secret.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretTarget {
    /// Secret name.
    pub name: String,
    /// Ownership of the created secret.
    pub creation_policy: String,
}

/// One copied key.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretData {
    /// Key inside the Kubernetes secret.
    pub secret_key: String,
    /// Key in the remote store.
    pub remote_ref: RemoteRef,
}

/// Remote secret key.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RemoteRef {
    /// Remote key.
    pub key: String,
}

impl PersistentVolumeClaim {
    /// Creates a `ReadWriteOnce` claim of `size_gib` GiB.
    #[must_use]
    pub fn read_write_once(metadata: ObjectMeta, size_gib: u32) -> Self {
        Self {
            metadata,
            spec: PersistentVolumeClaimSpec {
                access_modes: vec![String::from("ReadWriteOnce")],
                storage_class_name: String::from(DEFAULT_STORAGE_CLASS),
                resources: VolumeResourceRequirements {
                    requests: BTreeMap::from([(String::from("storage"), format!("{size_gib}Gi"))]),
                },
            },
        }
    }
}
