//! Synthesis: turns registered charts into an on-disk manifest tree.
//!
//! Every object is rendered to YAML before anything is written, so a
//! rendering failure leaves the output directory untouched. The tree has one
//! folder per chart and one `<Kind>.<name>.k8s.yaml` file per object.

mod report;

pub use report::{ChartReport, SynthesisReport};

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::chart::Chart;
use crate::error::{Result, SynthesisError};

/// The output tree: charts in registration order.
#[derive(Debug, Default)]
pub struct App {
    charts: Vec<Chart>,
}

/// A chart rendered in memory.
#[derive(Debug)]
struct RenderedChart<'a> {
    chart: &'a Chart,
    files: Vec<(String, String)>,
}

impl App {
    /// Creates an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self { charts: Vec::new() }
    }

    /// Registers a chart.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::DuplicateChart`] if a chart with the same name
    /// is already registered.
    pub fn add_chart(&mut self, chart: Chart) -> Result<()> {
        if self.charts.iter().any(|c| c.name() == chart.name()) {
            return Err(SynthesisError::DuplicateChart {
                name: chart.name().to_string(),
            }
            .into());
        }

        info!("Registered chart {} ({} object(s))", chart.name(), chart.len());
        self.charts.push(chart);
        Ok(())
    }

    /// Returns the registered charts.
    #[must_use]
    pub fn charts(&self) -> &[Chart] {
        &self.charts
    }

    /// Renders every chart and reports the files `synth` would write.
    ///
    /// # Errors
    ///
    /// Returns an error if an object cannot be rendered or two objects of a
    /// chart map to the same file.
    pub fn plan(&self, out_dir: impl AsRef<Path>) -> Result<SynthesisReport> {
        let out_dir = out_dir.as_ref();
        let rendered = self.render()?;
        Ok(report(out_dir, &rendered, true))
    }

    /// Renders every chart, then writes the tree under `out_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or a directory or file cannot be
    /// written.
    pub fn synth(&self, out_dir: impl AsRef<Path>) -> Result<SynthesisReport> {
        let out_dir = out_dir.as_ref();
        let rendered = self.render()?;

        create_dir(out_dir)?;
        for chart in &rendered {
            let chart_dir = out_dir.join(chart.chart.name());
            create_dir(&chart_dir)?;

            for (file_name, content) in &chart.files {
                write_file(&chart_dir.join(file_name), content)?;
            }
        }

        let report = report(out_dir, &rendered, false);
        info!(
            "Wrote {} manifest(s) for {} chart(s) to {}",
            report.total_resources(),
            report.charts.len(),
            out_dir.display()
        );
        Ok(report)
    }

    fn render(&self) -> Result<Vec<RenderedChart<'_>>> {
        self.charts.iter().map(render_chart).collect()
    }
}

fn render_chart(chart: &Chart) -> Result<RenderedChart<'_>> {
    let mut seen = HashSet::new();
    let mut files = Vec::with_capacity(chart.len());

    for object in chart.objects() {
        let file_name = object.file_name();
        if !seen.insert(file_name.clone()) {
            return Err(SynthesisError::DuplicateResource {
                chart: chart.name().to_string(),
                file: file_name,
            }
            .into());
        }

        let content = object
            .to_yaml()
            .map_err(|e| SynthesisError::serialization(object.id(), e.to_string()))?;
        files.push((file_name, content));
    }

    debug!("Rendered chart {}", chart.name());
    Ok(RenderedChart { chart, files })
}

fn report(out_dir: &Path, rendered: &[RenderedChart<'_>], dry_run: bool) -> SynthesisReport {
    SynthesisReport {
        output_dir: out_dir.to_path_buf(),
        dry_run,
        charts: rendered
            .iter()
            .map(|r| ChartReport {
                name: r.chart.name().to_string(),
                namespace: r.chart.namespace().to_string(),
                resources: r.files.len(),
                files: r
                    .files
                    .iter()
                    .map(|(file_name, _)| out_dir.join(r.chart.name()).join(file_name))
                    .collect::<Vec<PathBuf>>(),
            })
            .collect(),
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| SynthesisError::OutputDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    let write_err = |source: std::io::Error| SynthesisError::Write {
        path: path.to_path_buf(),
        source,
    };

    // Write to a temporary file first, then rename into place
    let temp_path = path.with_extension("tmp");
    let written = fs::File::create(&temp_path).and_then(|mut file| {
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    });

    if let Err(source) = written {
        // Best effort; the original error is what gets reported.
        let _ = fs::remove_file(&temp_path);
        return Err(write_err(source).into());
    }

    debug!("Wrote {}", path.display());
    Ok(())
}
