//! Deterministic hashing for generated names and checksums.
//!
//! Hashes derived here end up in chart names, Grafana uids and pod template
//! annotations. They must be stable across runs so that re-running the
//! generator produces byte-identical output.

use sha2::{Digest, Sha256};

/// Number of hex characters kept by [`ConfigHasher::short_hash`].
pub const SHORT_HASH_LEN: usize = 8;

/// Hasher for computing name suffixes and configuration checksums.
#[derive(Debug, Default)]
pub struct ConfigHasher;

impl ConfigHasher {
    /// Creates a new configuration hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the full SHA-256 hex digest of a string.
    #[must_use]
    pub fn hash_str(&self, input: &str) -> String {
        hex::encode(Sha256::digest(input.as_bytes()))
    }

    /// Computes the short suffix used for the monitoring chart of a
    /// cluster/namespace pair.
    #[must_use]
    pub fn monitoring_suffix(&self, cluster: &str, namespace: &str) -> String {
        self.short_hash(&self.hash_str(&format!("{cluster}-{namespace}")))
    }

    /// Computes a stable uid for an alert rule.
    #[must_use]
    pub fn alert_uid(&self, cluster: &str, namespace: &str, alert_name: &str) -> String {
        self.short_hash(&self.hash_str(&format!("{cluster}-{namespace}-{alert_name}")))
    }

    /// Computes a checksum of a JSON document.
    ///
    /// Object keys are serialized in sorted order, so logically equal
    /// documents hash identically.
    #[must_use]
    pub fn hash_json(&self, value: &serde_json::Value) -> String {
        self.hash_str(&value.to_string())
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(&self, hash: &str) -> String {
        hash.chars().take(SHORT_HASH_LEN).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_monitoring_suffix_deterministic() {
        let hasher = ConfigHasher::new();

        let first = hasher.monitoring_suffix("sequencer-dev", "integration");
        let second = hasher.monitoring_suffix("sequencer-dev", "integration");

        assert_eq!(first, second);
        assert_eq!(first.len(), SHORT_HASH_LEN);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_monitoring_suffix_differs_by_pair() {
        let hasher = ConfigHasher::new();
        assert_ne!(
            hasher.monitoring_suffix("cluster-a", "ns"),
            hasher.monitoring_suffix("cluster-b", "ns")
        );
    }

    #[test]
    fn test_hash_json_ignores_key_order() {
        let hasher = ConfigHasher::new();
        let a: serde_json::Value = serde_json::from_str(r#"{"a": 1, "b": 2}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{"b": 2, "a": 1}"#).unwrap();

        assert_eq!(hasher.hash_json(&a), hasher.hash_json(&b));
        assert_ne!(hasher.hash_json(&a), hasher.hash_json(&json!({"a": 1})));
    }

    #[test]
    fn test_short_hash() {
        let hasher = ConfigHasher::new();
        let full_hash = "abcdef1234567890abcdef1234567890";
        let short = hasher.short_hash(full_hash);

        assert_eq!(short, "abcdef12");
        assert_eq!(short.len(), 8);
    }

    proptest! {
        #[test]
        fn test_monitoring_suffix_stable(cluster in "[a-z0-9-]{1,20}", namespace in "[a-z0-9-]{1,20}") {
            let hasher = ConfigHasher::new();
            prop_assert_eq!(
                hasher.monitoring_suffix(&cluster, &namespace),
                ConfigHasher::new().monitoring_suffix(&cluster, &namespace)
            );
        }
    }
}
