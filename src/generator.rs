//! End-to-end generation pipeline.
//!
//! Loads the deployment configuration, builds one chart per service plus the
//! optional monitoring chart, and hands the tree to synthesis. Every input
//! file is read and every chart built before anything is written.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::chart::{ChartEmitter, emit_monitoring_chart};
use crate::config::{ConfigParser, ConfigValidator, DeploymentConfig, sanitize_name};
use crate::error::Result;
use crate::monitoring::{DashboardAssembler, DashboardDefinition};
use crate::synth::{App, SynthesisReport};
use crate::topology::{DEFAULT_IMAGE_REPOSITORY, GlobalParams, TopologyBuilder};

/// Inputs of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Deployment configuration file.
    pub deployment_config_file: PathBuf,
    /// Target namespace (sanitized before use).
    pub namespace: String,
    /// Image tag.
    pub image_tag: String,
    /// Image repository override.
    pub image_repository: Option<String>,
    /// Dashboard generation, if requested.
    pub monitoring: Option<MonitoringOptions>,
    /// Output directory.
    pub output_dir: PathBuf,
    /// Report files without writing them.
    pub dry_run: bool,
}

/// Dashboard generation inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringOptions {
    /// Cluster the dashboards belong to.
    pub cluster: String,
    /// Dashboard definition file.
    pub dashboard_file: PathBuf,
}

/// Runs the generation pipeline.
#[derive(Debug, Default)]
pub struct Generator {
    parser: ConfigParser,
    validator: ConfigValidator,
}

impl Generator {
    /// Creates a generator resolving relative paths against the working directory.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            parser: ConfigParser::new(),
            validator: ConfigValidator::new(),
        }
    }

    /// Builds the chart tree without writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if an input file is missing or invalid, or a chart
    /// cannot be built or registered.
    pub fn build(&self, options: &GenerateOptions) -> Result<App> {
        let config = self.parser.load_file(&options.deployment_config_file)?;
        let validation = self.validator.validate(&config)?;
        debug!("Validation finished with {} warning(s)", validation.warning_count());

        // Read the dashboard definition up front so a bad file fails the run
        // before any chart is built.
        let dashboard = options
            .monitoring
            .as_ref()
            .map(|m| DashboardDefinition::load(&self.parser, &m.dashboard_file))
            .transpose()?;

        let params = GlobalParams {
            namespace: options.namespace.clone(),
            image_repository: image_repository(options, &config),
            image_tag: options.image_tag.clone(),
        };
        info!(
            "Generating {} service chart(s) with image {}",
            config.services.len(),
            params.image()
        );

        let builder = TopologyBuilder::new(params);
        let emitter = ChartEmitter::new(options.monitoring.is_some());
        let mut app = App::new();

        for service in &config.services {
            let app_config = self
                .parser
                .load_application_config(&config.application_config_subdir, &service.config_paths)?;
            let topology = builder.build(service, app_config)?;
            app.add_chart(emitter.emit(&topology)?)?;
        }

        if let (Some(monitoring), Some(definition)) = (&options.monitoring, &dashboard) {
            let namespace = sanitize_name(&options.namespace);
            let assembler = DashboardAssembler::new(monitoring.cluster.as_str(), options.namespace.as_str());
            let assembled = assembler.assemble(definition);
            app.add_chart(emit_monitoring_chart(
                &assembler.chart_name(),
                &namespace,
                &monitoring.cluster,
                &assembled,
            )?)?;
        }

        Ok(app)
    }

    /// Builds the chart tree and writes it, or only plans it on a dry run.
    ///
    /// # Errors
    ///
    /// Returns an error if building or synthesis fails.
    pub fn generate(&self, options: &GenerateOptions) -> Result<SynthesisReport> {
        let app = self.build(options)?;

        if options.dry_run {
            info!("Dry run: nothing will be written");
            app.plan(&options.output_dir)
        } else {
            app.synth(&options.output_dir)
        }
    }
}

/// Picks the CLI override, then the configuration's image, then the default.
fn image_repository(options: &GenerateOptions, config: &DeploymentConfig) -> String {
    options
        .image_repository
        .clone()
        .or_else(|| config.image.clone())
        .unwrap_or_else(|| String::from(DEFAULT_IMAGE_REPOSITORY))
}
