//! Synthesis results.

use serde::Serialize;
use std::path::PathBuf;

/// Outcome of a synthesis run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SynthesisReport {
    /// Root of the output tree.
    pub output_dir: PathBuf,
    /// Whether files were only planned, not written.
    pub dry_run: bool,
    /// Charts in registration order.
    pub charts: Vec<ChartReport>,
}

/// Files produced for one chart.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChartReport {
    /// Chart name; also the folder name.
    pub name: String,
    /// Namespace of the chart's objects.
    pub namespace: String,
    /// Number of objects.
    pub resources: usize,
    /// Manifest paths, one per object.
    pub files: Vec<PathBuf>,
}

impl SynthesisReport {
    /// Returns the total number of manifests.
    #[must_use]
    pub fn total_resources(&self) -> usize {
        self.charts.iter().map(|c| c.resources).sum()
    }

    /// Returns every manifest path.
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.charts.iter().flat_map(|c| c.files.iter())
    }
}
