//! Output formatting for the run summary.
//!
//! Formatting returns strings; the binary decides where they go.

use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::synth::SynthesisReport;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Chart row for table display.
#[derive(Tabled)]
struct ChartRow {
    #[tabled(rename = "Chart")]
    name: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Resources")]
    resources: usize,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a synthesis report.
    #[must_use]
    pub fn format_report(&self, report: &SynthesisReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => Self::format_report_text(report),
        }
    }

    fn format_report_text(report: &SynthesisReport) -> String {
        let mut output = String::new();

        if report.charts.is_empty() {
            let _ = writeln!(
                output,
                "{} No charts generated; {} is empty.",
                "!".yellow(),
                report.output_dir.display()
            );
            return output;
        }

        let rows: Vec<ChartRow> = report
            .charts
            .iter()
            .map(|c| ChartRow {
                name: c.name.clone(),
                namespace: c.namespace.clone(),
                resources: c.resources,
            })
            .collect();
        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        let verb = if report.dry_run { "Planned" } else { "Wrote" };
        let _ = writeln!(
            output,
            "\n{} {} {} manifest(s) in {} chart(s) to {}",
            "✓".green(),
            verb,
            report.total_resources().to_string().green(),
            report.charts.len(),
            report.output_dir.display()
        );

        output
    }

    /// Formats an error message.
    #[must_use]
    pub fn error(&self, message: &str) -> String {
        self.message("error", &format!("{} {message}", "✗".red()), message)
    }

    fn message(&self, status: &str, text: &str, message: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string(&StatusJson { status, message }).unwrap_or_default()
            }
            OutputFormat::Text => text.to_string(),
        }
    }
}

#[derive(Serialize)]
struct StatusJson<'a> {
    status: &'a str,
    message: &'a str,
}
