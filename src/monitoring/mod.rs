//! Grafana dashboards and alert rules.
//!
//! A [`DashboardDefinition`] lists rows, panels and alerts. The
//! [`DashboardAssembler`] merges it into the fixed Grafana templates of
//! [`grafana`], keyed by a hash of the cluster and namespace so repeated runs
//! update the same dashboard instead of creating a new one.

mod assembly;
mod definition;
pub mod grafana;

pub use assembly::{AssembledDashboard, DashboardAssembler, MONITORING_CHART_PREFIX};
pub use definition::{
    AlertDefinition, Comparison, DEFAULT_DATASOURCE_UID, DEFAULT_RULE_GROUP, DashboardDefinition,
    PanelDefinition, PanelType, RowDefinition,
};
pub use grafana::{AlertRule, Dashboard};
