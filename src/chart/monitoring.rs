//! Monitoring chart emission.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, SynthesisError};
use crate::k8s::{ConfigMap, ObjectMeta};
use crate::monitoring::AssembledDashboard;

use super::Chart;

/// ConfigMap key holding the dashboard JSON.
pub const DASHBOARD_KEY: &str = "dashboard.json";

/// ConfigMap key holding the alert rules JSON array.
pub const ALERTS_KEY: &str = "alerts.json";

/// Emits the monitoring chart carrying a dashboard and its alert rules.
///
/// The ConfigMaps follow the Grafana sidecar provisioning labels, so a
/// cluster running the sidecar picks them up without further tooling.
///
/// # Errors
///
/// Returns an error if the dashboard or alerts cannot be serialized.
pub fn emit_monitoring_chart(
    chart_name: &str,
    namespace: &str,
    cluster: &str,
    assembled: &AssembledDashboard,
) -> Result<Chart> {
    let mut chart = Chart::new(chart_name, namespace);

    let dashboard_name = format!("{chart_name}-dashboard");
    let dashboard = serde_json::to_string_pretty(&assembled.dashboard).map_err(|e| {
        SynthesisError::serialization(format!("ConfigMap/{dashboard_name}"), e.to_string())
    })?;

    chart.add(ConfigMap {
        metadata: ObjectMeta::namespaced(dashboard_name.as_str(), namespace)
            .with_labels(BTreeMap::from([(
                String::from("grafana_dashboard"),
                String::from("1"),
            )]))
            .with_annotation("grafana_folder", cluster),
        data: BTreeMap::from([(String::from(DASHBOARD_KEY), dashboard)]),
    });

    if !assembled.alerts.is_empty() {
        let alerts_name = format!("{chart_name}-alerts");
        let alerts = serde_json::to_string_pretty(&assembled.alerts).map_err(|e| {
            SynthesisError::serialization(format!("ConfigMap/{alerts_name}"), e.to_string())
        })?;

        chart.add(ConfigMap {
            metadata: ObjectMeta::namespaced(alerts_name.as_str(), namespace).with_labels(
                BTreeMap::from([(String::from("grafana_alert"), String::from("1"))]),
            ),
            data: BTreeMap::from([(String::from(ALERTS_KEY), alerts)]),
        });
    }

    debug!("Emitted monitoring chart {} with {} object(s)", chart_name, chart.len());
    Ok(chart)
}
