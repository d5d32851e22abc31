//! Dashboard definition file format.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use crate::config::ConfigParser;
use crate::error::{ConfigError, Result};

/// Datasource uid used when the definition does not name one.
pub const DEFAULT_DATASOURCE_UID: &str = "prometheus";

/// Rule group used when an alert does not name one.
pub const DEFAULT_RULE_GROUP: &str = "sequencer";

/// A dashboard definition: rows of panels plus alert rules.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DashboardDefinition {
    /// Dashboard title.
    pub title: String,
    /// Prometheus datasource queried by panels and alerts.
    #[serde(default = "default_datasource_uid")]
    pub datasource_uid: String,
    /// Folder for alert rules; defaults to the sanitized cluster name.
    #[serde(default)]
    pub folder_uid: Option<String>,
    /// Auto-refresh interval.
    #[serde(default)]
    pub refresh: Option<String>,
    /// Rows in display order.
    #[serde(default)]
    pub rows: Vec<RowDefinition>,
    /// Alert rules.
    #[serde(default)]
    pub alerts: Vec<AlertDefinition>,
}

/// A row of panels.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RowDefinition {
    /// Row title.
    pub title: String,
    /// Whether the row starts collapsed.
    #[serde(default = "default_collapsed")]
    pub collapsed: bool,
    /// Panels in display order.
    #[serde(default)]
    pub panels: Vec<PanelDefinition>,
}

/// A panel.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PanelDefinition {
    /// Panel title.
    pub title: String,
    /// Panel description.
    #[serde(default)]
    pub description: String,
    /// Visualization.
    #[serde(rename = "type", default)]
    pub panel_type: PanelType,
    /// PromQL expressions, one target each.
    #[serde(default)]
    pub exprs: Vec<String>,
}

/// Supported visualizations.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PanelType {
    /// Single value.
    Stat,
    /// Time series graph.
    #[default]
    Timeseries,
    /// Gauge.
    Gauge,
    /// Table.
    Table,
    /// Static text.
    Text,
}

/// An alert rule.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AlertDefinition {
    /// Unique rule name.
    pub name: String,
    /// Rule title.
    pub title: String,
    /// Rule group.
    #[serde(default = "default_rule_group")]
    pub rule_group: String,
    /// PromQL expression, used verbatim.
    pub expr: String,
    /// How the expression is compared against the threshold.
    #[serde(default)]
    pub comparison: Comparison,
    /// Threshold, or lower bound for range comparisons.
    pub threshold: f64,
    /// Upper bound for range comparisons.
    #[serde(default)]
    pub threshold_upper: Option<f64>,
    /// How long the condition must hold before firing.
    #[serde(rename = "for", default = "default_for")]
    pub for_duration: String,
    /// Evaluation interval.
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Notification labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Notification annotations.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

/// Threshold comparison.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Fires above the threshold.
    #[default]
    Gt,
    /// Fires below the threshold.
    Lt,
    /// Fires inside `[threshold, threshold_upper]`.
    WithinRange,
    /// Fires outside `[threshold, threshold_upper]`.
    OutsideRange,
}

fn default_datasource_uid() -> String {
    String::from(DEFAULT_DATASOURCE_UID)
}

fn default_rule_group() -> String {
    String::from(DEFAULT_RULE_GROUP)
}

fn default_for() -> String {
    String::from("5m")
}

fn default_interval() -> String {
    String::from("1m")
}

const fn default_collapsed() -> bool {
    true
}

impl PanelType {
    /// Returns the Grafana panel type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stat => "stat",
            Self::Timeseries => "timeseries",
            Self::Gauge => "gauge",
            Self::Table => "table",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for PanelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Comparison {
    /// Returns the Grafana evaluator type.
    #[must_use]
    pub const fn evaluator_type(self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::WithinRange => "within_range",
            Self::OutsideRange => "outside_range",
        }
    }

    /// Returns true for comparisons needing two bounds.
    #[must_use]
    pub const fn is_range(self) -> bool {
        matches!(self, Self::WithinRange | Self::OutsideRange)
    }
}

impl AlertDefinition {
    /// Returns the evaluator parameters for this alert.
    #[must_use]
    pub fn threshold_params(&self) -> Vec<f64> {
        match (self.comparison.is_range(), self.threshold_upper) {
            (true, Some(upper)) => vec![self.threshold, upper],
            _ => vec![self.threshold],
        }
    }
}

impl DashboardDefinition {
    /// Loads and validates a definition from a JSON or YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(parser: &ConfigParser, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading dashboard definition from: {}", path.display());

        let definition: Self = parser.load_document(path)?;
        definition.validate()?;

        debug!(
            "Dashboard '{}': {} row(s), {} alert(s)",
            definition.title,
            definition.rows.len(),
            definition.alerts.len()
        );
        Ok(definition)
    }

    /// Checks titles, expressions and alert names.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::ValidationError`] for an empty title, an
    /// empty expression, a range comparison without upper bound, or
    /// duplicate alert names.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::validation("Dashboard title cannot be empty", "title"));
        }

        if self.datasource_uid.trim().is_empty() {
            return Err(ConfigError::validation(
                "Datasource UID cannot be empty",
                "datasource_uid",
            ));
        }

        if self
            .folder_uid
            .as_deref()
            .is_some_and(|uid| uid.trim().is_empty())
        {
            return Err(ConfigError::validation(
                "Folder UID cannot be empty when set",
                "folder_uid",
            ));
        }

        for (r, row) in self.rows.iter().enumerate() {
            for (p, panel) in row.panels.iter().enumerate() {
                let field = format!("rows[{r}].panels[{p}]");
                if panel.title.trim().is_empty() {
                    return Err(ConfigError::validation(
                        "Panel title cannot be empty",
                        format!("{field}.title"),
                    ));
                }
                if panel.panel_type != PanelType::Text && panel.exprs.is_empty() {
                    return Err(ConfigError::validation(
                        format!("Panel '{}' has no expressions", panel.title),
                        format!("{field}.exprs"),
                    ));
                }
                if panel.exprs.iter().any(|e| e.trim().is_empty()) {
                    return Err(ConfigError::validation(
                        format!("Panel '{}' has an empty expression", panel.title),
                        format!("{field}.exprs"),
                    ));
                }
            }
        }

        let mut names = HashSet::new();
        for (i, alert) in self.alerts.iter().enumerate() {
            let field = format!("alerts[{i}]");
            if alert.name.trim().is_empty() {
                return Err(ConfigError::validation(
                    "Alert name cannot be empty",
                    format!("{field}.name"),
                ));
            }
            if alert.title.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("Alert '{}' has an empty title", alert.name),
                    format!("{field}.title"),
                ));
            }
            if alert.expr.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("Alert '{}' has an empty expression", alert.name),
                    format!("{field}.expr"),
                ));
            }
            if alert.comparison.is_range() && alert.threshold_upper.is_none() {
                return Err(ConfigError::validation(
                    format!(
                        "Alert '{}' uses {} but has no threshold_upper",
                        alert.name,
                        alert.comparison.evaluator_type()
                    ),
                    format!("{field}.threshold_upper"),
                ));
            }
            if !names.insert(alert.name.as_str()) {
                return Err(ConfigError::DuplicateName {
                    resource_type: String::from("alert"),
                    name: alert.name.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentFormat;

    const DEFINITION: &str = r#"
title: Sequencer Node Dashboard
rows:
  - title: Batcher
    panels:
      - title: proposals started
        type: stat
        exprs: ["batcher_proposal_started{}"]
alerts:
  - name: batcher_stalled
    title: Batcher stalled
    expr: "increase(batcher_proposal_started[5m])"
    comparison: lt
    threshold: 1
"#;

    fn parse(content: &str) -> DashboardDefinition {
        ConfigParser::parse_str(content, DocumentFormat::Yaml, None).unwrap()
    }

    #[test]
    fn test_defaults() {
        let definition = parse(DEFINITION);

        assert_eq!(definition.datasource_uid, DEFAULT_DATASOURCE_UID);
        assert!(definition.rows[0].collapsed);
        assert_eq!(definition.rows[0].panels[0].panel_type, PanelType::Stat);

        let alert = &definition.alerts[0];
        assert_eq!(alert.rule_group, DEFAULT_RULE_GROUP);
        assert_eq!(alert.for_duration, "5m");
        assert_eq!(alert.interval, "1m");
        assert_eq!(alert.comparison, Comparison::Lt);
        assert!(definition.validate().is_ok());
    }

    #[test]
    fn test_duplicate_alert_names() {
        let mut definition = parse(DEFINITION);
        definition.alerts.push(definition.alerts[0].clone());

        assert!(matches!(
            definition.validate(),
            Err(ConfigError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_empty_alert_expr() {
        let mut definition = parse(DEFINITION);
        definition.alerts[0].expr = String::from("  ");
        assert!(definition.validate().is_err());
    }

    #[test]
    fn test_empty_title() {
        let mut definition = parse(DEFINITION);
        definition.title = String::new();
        assert!(definition.validate().is_err());
    }

    #[test]
    fn test_blank_datasource_uid() {
        let definition = parse(&format!("datasource_uid: \"\"\n{DEFINITION}"));
        assert!(matches!(
            definition.validate(),
            Err(ConfigError::ValidationError { ref field, .. }) if field.as_deref() == Some("datasource_uid")
        ));
    }

    #[test]
    fn test_blank_folder_uid() {
        let mut definition = parse(&format!("folder_uid: \" \"\n{DEFINITION}"));
        assert!(matches!(
            definition.validate(),
            Err(ConfigError::ValidationError { ref field, .. }) if field.as_deref() == Some("folder_uid")
        ));

        definition.folder_uid = None;
        assert!(definition.validate().is_ok());
    }

    #[test]
    fn test_range_needs_upper_bound() {
        let mut definition = parse(DEFINITION);
        definition.alerts[0].comparison = Comparison::WithinRange;
        assert!(definition.validate().is_err());

        definition.alerts[0].threshold_upper = Some(10.0);
        assert!(definition.validate().is_ok());
        assert_eq!(definition.alerts[0].threshold_params(), vec![1.0, 10.0]);
    }

    #[test]
    fn test_text_panel_without_exprs() {
        let definition = parse(
            r"
title: Notes
rows:
  - title: About
    panels:
      - title: readme
        type: text
",
        );
        assert!(definition.validate().is_ok());
    }
}
