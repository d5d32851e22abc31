//! Shared testing utilities for sequencer-deploy CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "SEQUENCER_DEPLOY_CONFIG",
    "SEQUENCER_DEPLOY_NAMESPACE",
    "SEQUENCER_DEPLOY_IMAGE_TAG",
    "SEQUENCER_DEPLOY_IMAGE_REPOSITORY",
    "SEQUENCER_DEPLOY_CLUSTER",
    "SEQUENCER_DEPLOY_DASHBOARD_FILE",
    "SEQUENCER_DEPLOY_OUTPUT_DIR",
];

/// Isolated working directory for CLI invocations.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
}

#[allow(dead_code)]
impl TestContext {
    /// Create a new isolated environment.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        Self { root }
    }

    /// Workspace directory the binary runs in.
    pub fn work_dir(&self) -> &Path {
        self.root.path()
    }

    /// Default output directory, relative to the work directory.
    pub fn dist(&self) -> PathBuf {
        self.work_dir().join("dist")
    }

    /// Build a command for the compiled binary with a clean environment.
    pub fn cli(&self) -> Command {
        let mut cmd =
            Command::cargo_bin("sequencer-deploy").expect("Failed to locate sequencer-deploy binary");
        cmd.current_dir(self.work_dir());
        for var in ENV_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Write a file relative to the work directory.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.work_dir().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(path, content).expect("Failed to write test file");
    }

    /// Write a deployment config listing the given services as JSON.
    pub fn write_deployment(&self, services: &str) {
        self.write(
            "deployment.json",
            &format!(
                r#"{{"application_config_subdir": "app_configs", "services": {services}}}"#
            ),
        );
    }

    /// Write the application configs used by the sample services.
    pub fn write_app_configs(&self) {
        self.write(
            "app_configs/base.json",
            r#"{"monitoring_endpoint_config.port": 8082, "chain_id": "SN_INTEGRATION"}"#,
        );
        self.write(
            "app_configs/gateway.json",
            r#"{"http_server_config.port": 8080}"#,
        );
    }

    /// Write a small dashboard definition.
    pub fn write_dashboard(&self) {
        self.write(
            "dashboard.yaml",
            r#"title: Sequencer Node Dashboard
rows:
  - title: Gateway
    panels:
      - title: requests
        exprs: ["gateway_requests_total{}"]
alerts:
  - name: gateway_down
    title: Gateway down
    expr: "sum(up{job=\"gateway\"}) == 0"
    threshold: 0
"#,
        );
    }

    /// Files under a chart folder of the default output directory, sorted.
    pub fn chart_files(&self, chart: &str) -> Vec<String> {
        let mut files: Vec<String> = fs::read_dir(self.dist().join(chart))
            .expect("Failed to read chart directory")
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        files.sort();
        files
    }

    /// Every file under the default output directory with its content, sorted.
    pub fn snapshot(&self) -> Vec<(PathBuf, String)> {
        let mut files = Vec::new();
        for chart in fs::read_dir(self.dist()).expect("Failed to read output directory") {
            let chart = chart.unwrap().path();
            for file in fs::read_dir(&chart).unwrap() {
                let path = file.unwrap().path();
                let content = fs::read_to_string(&path).unwrap();
                files.push((path, content));
            }
        }
        files.sort();
        files
    }
}
