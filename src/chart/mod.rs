//! Charts: named units of Kubernetes objects.
//!
//! A service chart is emitted from one [`ServiceTopology`](crate::topology::ServiceTopology);
//! the monitoring chart carries the assembled Grafana dashboard and alert
//! rules. Charts are registered with the [`App`](crate::synth::App) and
//! written on synthesis.

mod monitoring;
mod service;

pub use monitoring::{ALERTS_KEY, DASHBOARD_KEY, emit_monitoring_chart};
pub use service::{
    APP_CONFIG_KEY, CONFIG_MOUNT_PATH, ChartEmitter, DATA_MOUNT_PATH,
    MANAGED_CERTIFICATES_ANNOTATION, METRICS_PATH, SECRET_FILE_NAME, SECRETS_MOUNT_PATH,
    TOLERATION_KEY,
};

use crate::k8s::ApiObject;

/// A named, namespaced list of Kubernetes objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    name: String,
    namespace: String,
    objects: Vec<ApiObject>,
}

impl Chart {
    /// Creates an empty chart.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            objects: Vec::new(),
        }
    }

    /// Appends an object.
    pub fn add(&mut self, object: impl Into<ApiObject>) {
        self.objects.push(object.into());
    }

    /// Returns the chart name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the namespace every object lives in.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the objects in emission order.
    #[must_use]
    pub fn objects(&self) -> &[ApiObject] {
        &self.objects
    }

    /// Returns the number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the chart holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns the object with the given kind and name.
    #[must_use]
    pub fn find(&self, kind: &str, name: &str) -> Option<&ApiObject> {
        self.objects
            .iter()
            .find(|o| o.kind() == kind && o.name() == name)
    }
}
