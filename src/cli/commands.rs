//! CLI argument definitions.
//!
//! Every flag can also be supplied through a `SEQUENCER_DEPLOY_*` environment
//! variable; explicit flags win.

use clap::Parser;
use std::path::PathBuf;

use crate::error::ArgumentError;
use crate::generator::{GenerateOptions, MonitoringOptions};

/// Generates Kubernetes manifests and Grafana dashboards for sequencer nodes.
#[derive(Parser, Debug)]
#[command(name = "sequencer-deploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the deployment configuration file (JSON or YAML).
    #[arg(long, env = "SEQUENCER_DEPLOY_CONFIG")]
    pub deployment_config_file: PathBuf,

    /// Kubernetes namespace for every generated object.
    #[arg(long, env = "SEQUENCER_DEPLOY_NAMESPACE")]
    pub namespace: String,

    /// Image tag deployed by every service.
    #[arg(long, env = "SEQUENCER_DEPLOY_IMAGE_TAG", default_value = "dev")]
    pub deployment_image_tag: String,

    /// Image repository; overrides the configuration's `image`.
    #[arg(long, env = "SEQUENCER_DEPLOY_IMAGE_REPOSITORY")]
    pub image_repository: Option<String>,

    /// Cluster name; required with --monitoring-dashboard-file.
    #[arg(long, env = "SEQUENCER_DEPLOY_CLUSTER")]
    pub cluster: Option<String>,

    /// Dashboard definition file (JSON or YAML).
    #[arg(long, env = "SEQUENCER_DEPLOY_DASHBOARD_FILE")]
    pub monitoring_dashboard_file: Option<PathBuf>,

    /// Directory the manifest tree is written to.
    #[arg(long, env = "SEQUENCER_DEPLOY_OUTPUT_DIR", default_value = "dist")]
    pub output_dir: PathBuf,

    /// Render everything and report the files without writing them.
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Checks flag combinations that clap cannot express.
    ///
    /// Runs before any file is read or written.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::ClusterRequired`] when a dashboard file is
    /// given without a cluster, and [`ArgumentError::Empty`] for blank values.
    pub fn validate(&self) -> Result<(), ArgumentError> {
        if self.namespace.trim().is_empty() {
            return Err(ArgumentError::Empty { flag: "namespace" });
        }

        if self.deployment_image_tag.trim().is_empty() {
            return Err(ArgumentError::Empty {
                flag: "deployment-image-tag",
            });
        }

        if self
            .image_repository
            .as_deref()
            .is_some_and(|repo| repo.trim().is_empty())
        {
            return Err(ArgumentError::Empty {
                flag: "image-repository",
            });
        }

        if self.monitoring_dashboard_file.is_some() && self.cluster().is_none() {
            return Err(ArgumentError::ClusterRequired);
        }

        Ok(())
    }

    /// Converts validated arguments into generation options.
    #[must_use]
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            deployment_config_file: self.deployment_config_file.clone(),
            namespace: self.namespace.trim().to_string(),
            image_tag: self.deployment_image_tag.trim().to_string(),
            image_repository: self.image_repository.clone(),
            monitoring: self
                .monitoring_dashboard_file
                .clone()
                .zip(self.cluster())
                .map(|(dashboard_file, cluster)| MonitoringOptions {
                    cluster: cluster.to_string(),
                    dashboard_file,
                }),
            output_dir: self.output_dir.clone(),
            dry_run: self.dry_run,
        }
    }

    /// Returns the cluster name, treating a blank value as unset.
    #[must_use]
    pub fn cluster(&self) -> Option<&str> {
        self.cluster
            .as_deref()
            .map(str::trim)
            .filter(|cluster| !cluster.is_empty())
    }
}
