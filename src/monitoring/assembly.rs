//! Merges a dashboard definition into the Grafana templates.

use tracing::debug;

use crate::config::{ConfigHasher, sanitize_name};

use super::definition::{AlertDefinition, DashboardDefinition, RowDefinition};
use super::grafana::{
    ALERT_CONDITION_REF_ID, AlertQuery, AlertRule, Dashboard, DashboardPanel, DatasourceRef,
    GridPos, Panel, Row, Target,
};

/// Prefix of the monitoring chart name and the dashboard uid.
pub const MONITORING_CHART_PREFIX: &str = "sequencer-monitoring";

const DEFAULT_REFRESH: &str = "5s";
const PANELS_PER_LINE: u32 = 3;
const PANEL_WIDTH: u32 = 8;
const PANEL_HEIGHT: u32 = 8;
const ROW_HEIGHT: u32 = 1;

/// A dashboard and its alert rules, ready to be published.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledDashboard {
    /// Dashboard JSON model.
    pub dashboard: Dashboard,
    /// Alert rules.
    pub alerts: Vec<AlertRule>,
}

/// Builds dashboards and alerts for one cluster/namespace pair.
#[derive(Debug)]
pub struct DashboardAssembler {
    cluster: String,
    namespace: String,
    hash: String,
    hasher: ConfigHasher,
}

impl DashboardAssembler {
    /// Creates an assembler for a cluster and namespace.
    #[must_use]
    pub fn new(cluster: impl Into<String>, namespace: impl Into<String>) -> Self {
        let cluster = cluster.into();
        let namespace = namespace.into();
        let hasher = ConfigHasher::new();
        let hash = hasher.monitoring_suffix(&cluster, &namespace);

        Self {
            cluster,
            namespace,
            hash,
            hasher,
        }
    }

    /// Returns the 8-hex suffix shared by the chart name and dashboard uid.
    #[must_use]
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Returns the monitoring chart name.
    #[must_use]
    pub fn chart_name(&self) -> String {
        sanitize_name(&format!("{MONITORING_CHART_PREFIX}-{}", self.hash))
    }

    /// Returns the dashboard uid.
    #[must_use]
    pub fn dashboard_uid(&self) -> String {
        format!("sequencer-{}", self.hash)
    }

    /// Assembles the dashboard and alert rules of a validated definition.
    #[must_use]
    pub fn assemble(&self, definition: &DashboardDefinition) -> AssembledDashboard {
        let datasource = DatasourceRef::prometheus(definition.datasource_uid.as_str());
        let refresh = definition.refresh.as_deref().unwrap_or(DEFAULT_REFRESH);

        let mut dashboard = Dashboard::new(definition.title.as_str(), self.dashboard_uid(), refresh);
        let mut layout = Layout::default();
        for row in &definition.rows {
            layout.place_row(row, &datasource, &mut dashboard.panels);
        }

        let folder_uid = definition
            .folder_uid
            .clone()
            .unwrap_or_else(|| sanitize_name(&self.cluster));

        let alerts: Vec<AlertRule> = definition
            .alerts
            .iter()
            .map(|alert| self.alert_rule(alert, &definition.datasource_uid, &folder_uid))
            .collect();

        debug!(
            "Assembled dashboard {} with {} top-level panel(s) and {} alert(s)",
            dashboard.uid,
            dashboard.panels.len(),
            alerts.len()
        );

        AssembledDashboard { dashboard, alerts }
    }

    fn alert_rule(&self, alert: &AlertDefinition, datasource_uid: &str, folder_uid: &str) -> AlertRule {
        AlertRule {
            name: alert.name.clone(),
            title: alert.title.clone(),
            org_id: 1,
            condition: String::from(ALERT_CONDITION_REF_ID),
            interval: alert.interval.clone(),
            uid: self
                .hasher
                .alert_uid(&self.cluster, &self.namespace, &alert.name),
            data: vec![
                AlertQuery::prometheus(datasource_uid, alert.expr.as_str()),
                AlertQuery::threshold(alert.comparison.evaluator_type(), alert.threshold_params()),
            ],
            for_duration: alert.for_duration.clone(),
            exec_err_state: String::from("Error"),
            no_data_state: String::from("NoData"),
            folder_uid: folder_uid.to_string(),
            rule_group: alert.rule_group.clone(),
            annotations: alert.annotations.clone(),
            labels: alert.labels.clone(),
            is_paused: false,
        }
    }
}

/// Grid cursor and panel id counter.
#[derive(Debug, Default)]
struct Layout {
    y: u32,
    next_id: u32,
}

impl Layout {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn place_row(
        &mut self,
        row: &RowDefinition,
        datasource: &DatasourceRef,
        panels: &mut Vec<DashboardPanel>,
    ) {
        let mut grafana_row = Row::new(self.next_id(), row.title.as_str(), row.collapsed, self.y);
        let first_line = self.y + ROW_HEIGHT;

        let placed: Vec<Panel> = (0u32..)
            .zip(&row.panels)
            .map(|(index, panel)| {
                let grid_pos = GridPos {
                    h: PANEL_HEIGHT,
                    w: PANEL_WIDTH,
                    x: (index % PANELS_PER_LINE) * PANEL_WIDTH,
                    y: first_line + (index / PANELS_PER_LINE) * PANEL_HEIGHT,
                };
                Panel {
                    datasource: datasource.clone(),
                    description: panel.description.clone(),
                    grid_pos,
                    id: self.next_id(),
                    targets: panel
                        .exprs
                        .iter()
                        .zip(ref_ids())
                        .map(|(expr, ref_id)| Target::new(datasource.clone(), expr.as_str(), ref_id))
                        .collect(),
                    title: panel.title.clone(),
                    panel_type: panel.panel_type.to_string(),
                }
            })
            .collect();

        if row.collapsed {
            // Collapsed rows hold their panels and take a single grid line.
            grafana_row.panels = placed;
            panels.push(DashboardPanel::Row(grafana_row));
            self.y = first_line;
        } else {
            let lines = u32::try_from(placed.len())
                .unwrap_or(u32::MAX)
                .div_ceil(PANELS_PER_LINE);
            panels.push(DashboardPanel::Row(grafana_row));
            panels.extend(placed.into_iter().map(DashboardPanel::Panel));
            self.y = first_line + lines * PANEL_HEIGHT;
        }
    }
}

/// Yields `A`, `B`, ..., `Z`, `AA`, `AB`, ...
fn ref_ids() -> impl Iterator<Item = String> {
    (0usize..).map(|mut n| {
        let mut id = Vec::new();
        loop {
            id.push(b'A' + u8::try_from(n % 26).unwrap_or(0));
            if n < 26 {
                break;
            }
            n = n / 26 - 1;
        }
        id.reverse();
        String::from_utf8_lossy(&id).into_owned()
    })
}
