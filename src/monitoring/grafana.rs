//! Typed Grafana 10 dashboard and alerting records.
//!
//! Field names follow the Grafana JSON model exactly. Values that the
//! dashboard definition cannot influence are filled in by the constructors.

use serde::Serialize;
use std::collections::BTreeMap;

/// Dashboard schema version written into every dashboard.
pub const SCHEMA_VERSION: u32 = 38;

/// Datasource uid of Grafana server-side expressions.
pub const EXPRESSION_DATASOURCE_UID: &str = "__expr__";

/// Query refId evaluated by every alert rule.
pub const ALERT_CONDITION_REF_ID: &str = "B";

const ALERT_QUERY_REF_ID: &str = "A";
const INTERVAL_MS: u32 = 1000;
const MAX_DATA_POINTS: u32 = 43_200;
const ALERT_LOOKBACK_SECONDS: u32 = 600;

/// A complete dashboard.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Annotation sources.
    pub annotations: AnnotationList,
    /// Whether the dashboard is editable in the UI.
    pub editable: bool,
    /// First month of the fiscal year.
    pub fiscal_year_start_month: u32,
    /// Shared crosshair mode.
    pub graph_tooltip: u32,
    /// Dashboard links.
    pub links: Vec<serde_json::Value>,
    /// Whether panels stream live data.
    pub live_now: bool,
    /// Rows and panels in grid order.
    pub panels: Vec<DashboardPanel>,
    /// Auto-refresh interval.
    pub refresh: String,
    /// Dashboard JSON schema version.
    pub schema_version: u32,
    /// Theme.
    pub style: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Template variables.
    pub templating: Templating,
    /// Default time window.
    pub time: TimeRange,
    /// Time picker settings.
    pub timepicker: BTreeMap<String, serde_json::Value>,
    /// Time zone; empty means browser default.
    pub timezone: String,
    /// Title.
    pub title: String,
    /// Stable uid.
    pub uid: String,
    /// Dashboard version.
    pub version: u32,
    /// First day of the week.
    pub week_start: String,
}

/// Dashboard annotation list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AnnotationList {
    /// Entries.
    pub list: Vec<Annotation>,
}

/// A dashboard annotation source.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Whether this is the built-in annotation source.
    pub built_in: u32,
    /// Datasource.
    pub datasource: DatasourceRef,
    /// Whether the source is enabled.
    pub enable: bool,
    /// Whether the toggle is hidden.
    pub hide: bool,
    /// Marker color.
    pub icon_color: String,
    /// Display name.
    pub name: String,
    /// Source type.
    #[serde(rename = "type")]
    pub annotation_type: String,
}

/// Template variables.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct Templating {
    /// Variables.
    pub list: Vec<serde_json::Value>,
}

/// Default time window.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TimeRange {
    /// Window start.
    pub from: String,
    /// Window end.
    pub to: String,
}

/// Reference to a datasource.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DatasourceRef {
    /// Datasource plugin type.
    #[serde(rename = "type")]
    pub datasource_type: String,
    /// Datasource uid.
    pub uid: String,
}

/// Panel placement on the 24-column grid.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct GridPos {
    /// Height.
    pub h: u32,
    /// Width.
    pub w: u32,
    /// Column.
    pub x: u32,
    /// Line.
    pub y: u32,
}

/// Top-level dashboard panel entry: a row or a panel following an expanded row.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum DashboardPanel {
    /// A row.
    Row(Row),
    /// A visualization panel.
    Panel(Panel),
}

/// A dashboard row.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    /// Whether the row is collapsed.
    pub collapsed: bool,
    /// Grid placement.
    pub grid_pos: GridPos,
    /// Panel id.
    pub id: u32,
    /// Panels nested in a collapsed row; empty for expanded rows.
    pub panels: Vec<Panel>,
    /// Title.
    pub title: String,
    /// Always `row`.
    #[serde(rename = "type")]
    pub row_type: String,
}

/// A visualization panel.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    /// Datasource queried by every target.
    pub datasource: DatasourceRef,
    /// Panel description.
    pub description: String,
    /// Grid placement.
    pub grid_pos: GridPos,
    /// Panel id.
    pub id: u32,
    /// Queries.
    pub targets: Vec<Target>,
    /// Title.
    pub title: String,
    /// Visualization type.
    #[serde(rename = "type")]
    pub panel_type: String,
}

/// A panel query.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// Datasource.
    pub datasource: DatasourceRef,
    /// Query editor mode.
    pub editor_mode: String,
    /// PromQL expression.
    pub expr: String,
    /// Legend format.
    pub legend_format: String,
    /// Whether this is a range query.
    pub range: bool,
    /// Query identifier.
    pub ref_id: String,
}

/// A Grafana-managed alert rule.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    /// Rule name.
    pub name: String,
    /// Rule title.
    pub title: String,
    /// Owning organization.
    pub org_id: u32,
    /// `refId` of the query that decides firing.
    pub condition: String,
    /// Evaluation interval of the rule group.
    pub interval: String,
    /// Stable uid.
    pub uid: String,
    /// Queries and expressions.
    pub data: Vec<AlertQuery>,
    /// How long the condition must hold before firing.
    #[serde(rename = "for")]
    pub for_duration: String,
    /// State on evaluation error.
    pub exec_err_state: String,
    /// State when the query returns no data.
    pub no_data_state: String,
    /// Folder holding the rule.
    #[serde(rename = "folderUID")]
    pub folder_uid: String,
    /// Rule group.
    pub rule_group: String,
    /// Annotations attached to notifications.
    pub annotations: BTreeMap<String, String>,
    /// Labels attached to notifications.
    pub labels: BTreeMap<String, String>,
    /// Whether evaluation is paused.
    pub is_paused: bool,
}

/// One query of an alert rule.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlertQuery {
    /// Query identifier.
    pub ref_id: String,
    /// Query window.
    pub relative_time_range: RelativeTimeRange,
    /// Datasource uid.
    pub datasource_uid: String,
    /// Query type; empty for default.
    pub query_type: String,
    /// Query model.
    pub model: AlertQueryModel,
}

/// Seconds before and after evaluation time covered by a query.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RelativeTimeRange {
    /// Seconds before evaluation.
    pub from: u32,
    /// Seconds after evaluation.
    pub to: u32,
}

/// Model of an alert query.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum AlertQueryModel {
    /// PromQL instant query.
    Prometheus(PrometheusQuery),
    /// Server-side threshold expression.
    Threshold(ThresholdExpression),
}

/// PromQL instant query model.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusQuery {
    /// Query editor mode.
    pub editor_mode: String,
    /// PromQL expression.
    pub expr: String,
    /// Whether this is an instant query.
    pub instant: bool,
    /// Step in milliseconds.
    pub interval_ms: u32,
    /// Legend format.
    pub legend_format: String,
    /// Point limit.
    pub max_data_points: u32,
    /// Whether this is a range query.
    pub range: bool,
    /// Query identifier.
    pub ref_id: String,
}

/// Threshold expression model.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdExpression {
    /// Evaluated conditions.
    pub conditions: Vec<ThresholdCondition>,
    /// Expression datasource.
    pub datasource: DatasourceRef,
    /// `refId` of the evaluated query.
    pub expression: String,
    /// Step in milliseconds.
    pub interval_ms: u32,
    /// Point limit.
    pub max_data_points: u32,
    /// Query identifier.
    pub ref_id: String,
    /// Always `threshold`.
    #[serde(rename = "type")]
    pub expression_type: String,
}

/// Threshold evaluation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ThresholdCondition {
    /// Comparison.
    pub evaluator: Evaluator,
    /// Combination with other conditions.
    pub operator: TypeOnly,
    /// Evaluated queries.
    pub query: QueryParams,
    /// Series reducer.
    pub reducer: Reducer,
    /// Always `query`.
    #[serde(rename = "type")]
    pub condition_type: String,
}

/// Threshold evaluator.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Evaluator {
    /// Threshold values.
    pub params: Vec<f64>,
    /// Comparison kind.
    #[serde(rename = "type")]
    pub evaluator_type: String,
}

/// An object carrying only a `type`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TypeOnly {
    /// Type name.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Queries a condition applies to.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueryParams {
    /// Parameters.
    pub params: Vec<String>,
}

/// Series reducer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Reducer {
    /// Parameters.
    pub params: Vec<String>,
    /// Reducer kind.
    #[serde(rename = "type")]
    pub reducer_type: String,
}

impl DatasourceRef {
    /// References a Prometheus datasource.
    #[must_use]
    pub fn prometheus(uid: impl Into<String>) -> Self {
        Self {
            datasource_type: String::from("prometheus"),
            uid: uid.into(),
        }
    }

    /// References the server-side expression engine.
    #[must_use]
    pub fn expression() -> Self {
        Self {
            datasource_type: String::from(EXPRESSION_DATASOURCE_UID),
            uid: String::from(EXPRESSION_DATASOURCE_UID),
        }
    }
}

impl Dashboard {
    /// Creates an empty dashboard with the given title, uid and refresh.
    #[must_use]
    pub fn new(title: impl Into<String>, uid: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            annotations: AnnotationList {
                list: vec![Annotation {
                    built_in: 1,
                    datasource: DatasourceRef {
                        datasource_type: String::from("grafana"),
                        uid: String::from("-- Grafana --"),
                    },
                    enable: true,
                    hide: true,
                    icon_color: String::from("rgba(0, 211, 255, 1)"),
                    name: String::from("Annotations & Alerts"),
                    annotation_type: String::from("dashboard"),
                }],
            },
            editable: true,
            fiscal_year_start_month: 0,
            graph_tooltip: 0,
            links: Vec::new(),
            live_now: false,
            panels: Vec::new(),
            refresh: refresh.into(),
            schema_version: SCHEMA_VERSION,
            style: String::from("dark"),
            tags: Vec::new(),
            templating: Templating::default(),
            time: TimeRange {
                from: String::from("now-6h"),
                to: String::from("now"),
            },
            timepicker: BTreeMap::new(),
            timezone: String::new(),
            title: title.into(),
            uid: uid.into(),
            version: 0,
            week_start: String::new(),
        }
    }
}

impl Row {
    /// Creates an empty full-width row at height `y`.
    #[must_use]
    pub fn new(id: u32, title: impl Into<String>, collapsed: bool, y: u32) -> Self {
        Self {
            collapsed,
            grid_pos: GridPos { h: 1, w: 24, x: 0, y },
            id,
            panels: Vec::new(),
            title: title.into(),
            row_type: String::from("row"),
        }
    }
}

impl Target {
    /// Creates a range query target.
    #[must_use]
    pub fn new(datasource: DatasourceRef, expr: impl Into<String>, ref_id: impl Into<String>) -> Self {
        Self {
            datasource,
            editor_mode: String::from("code"),
            expr: expr.into(),
            legend_format: String::from("__auto"),
            range: true,
            ref_id: ref_id.into(),
        }
    }
}

impl AlertQuery {
    /// Creates the PromQL query (`A`) of an alert rule; `expr` is kept verbatim.
    #[must_use]
    pub fn prometheus(datasource_uid: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            ref_id: String::from(ALERT_QUERY_REF_ID),
            relative_time_range: RelativeTimeRange {
                from: ALERT_LOOKBACK_SECONDS,
                to: 0,
            },
            datasource_uid: datasource_uid.into(),
            query_type: String::new(),
            model: AlertQueryModel::Prometheus(PrometheusQuery {
                editor_mode: String::from("code"),
                expr: expr.into(),
                instant: true,
                interval_ms: INTERVAL_MS,
                legend_format: String::from("__auto"),
                max_data_points: MAX_DATA_POINTS,
                range: false,
                ref_id: String::from(ALERT_QUERY_REF_ID),
            }),
        }
    }

    /// Creates the threshold expression (`B`) evaluated over query `A`.
    #[must_use]
    pub fn threshold(evaluator_type: impl Into<String>, params: Vec<f64>) -> Self {
        Self {
            ref_id: String::from(ALERT_CONDITION_REF_ID),
            relative_time_range: RelativeTimeRange {
                from: ALERT_LOOKBACK_SECONDS,
                to: 0,
            },
            datasource_uid: String::from(EXPRESSION_DATASOURCE_UID),
            query_type: String::new(),
            model: AlertQueryModel::Threshold(ThresholdExpression {
                conditions: vec![ThresholdCondition {
                    evaluator: Evaluator {
                        params,
                        evaluator_type: evaluator_type.into(),
                    },
                    operator: TypeOnly {
                        kind: String::from("and"),
                    },
                    query: QueryParams {
                        params: vec![String::from(ALERT_CONDITION_REF_ID)],
                    },
                    reducer: Reducer {
                        params: Vec::new(),
                        reducer_type: String::from("last"),
                    },
                    condition_type: String::from("query"),
                }],
                datasource: DatasourceRef::expression(),
                expression: String::from(ALERT_QUERY_REF_ID),
                interval_ms: INTERVAL_MS,
                max_data_points: MAX_DATA_POINTS,
                ref_id: String::from(ALERT_CONDITION_REF_ID),
                expression_type: String::from("threshold"),
            }),
        }
    }
}

impl AlertRule {
    /// Returns the PromQL expression of the rule's query, if any.
    #[must_use]
    pub fn expr(&self) -> Option<&str> {
        self.data.iter().find_map(|query| match &query.model {
            AlertQueryModel::Prometheus(model) => Some(model.expr.as_str()),
            AlertQueryModel::Threshold(_) => None,
        })
    }

    /// Returns true if `condition` names one of the rule's queries.
    #[must_use]
    pub fn condition_is_resolvable(&self) -> bool {
        self.data.iter().any(|query| query.ref_id == self.condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_keys() {
        let value = serde_json::to_value(Dashboard::new("Sequencer", "sequencer-abc", "5s")).unwrap();

        assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
        assert_eq!(value["fiscalYearStartMonth"], 0);
        assert_eq!(value["templating"]["list"], serde_json::json!([]));
        assert_eq!(value["timepicker"], serde_json::json!({}));
        assert_eq!(value["annotations"]["list"][0]["builtIn"], 1);
        assert_eq!(value["uid"], "sequencer-abc");
    }

    #[test]
    fn test_threshold_query_shape() {
        let value = serde_json::to_value(AlertQuery::threshold("gt", vec![0.0])).unwrap();

        assert_eq!(value["refId"], "B");
        assert_eq!(value["datasourceUid"], "__expr__");
        assert_eq!(value["relativeTimeRange"]["from"], 600);
        assert_eq!(value["model"]["type"], "threshold");
        assert_eq!(value["model"]["expression"], "A");
        assert_eq!(value["model"]["conditions"][0]["evaluator"]["type"], "gt");
    }

    #[test]
    fn test_prometheus_query_shape() {
        let value =
            serde_json::to_value(AlertQuery::prometheus("PBFA97CFB590B2093", "up{}")).unwrap();

        assert_eq!(value["model"]["expr"], "up{}");
        assert_eq!(value["model"]["maxDataPoints"], 43_200);
        assert_eq!(value["model"]["instant"], true);
        assert_eq!(value["queryType"], "");
    }
}
