mod common;

use common::TestContext;
use predicates::prelude::*;
use sequencer_deploy::monitoring::DashboardAssembler;
use std::fs;

const GATEWAY: &str = r#"{
    "name": "Gateway",
    "controller": "Deployment",
    "config_paths": ["base.json", "gateway.json"],
    "autoscale": true,
    "replicas": 2,
    "max_replicas": 4,
    "resources": {"requests": {"cpu": 1, "memory": 2}, "limits": {"cpu": 2, "memory": 4}},
    "ingress": {
        "domain": "sw-dev.io",
        "alternative_names": null,
        "internal": true,
        "rules": [{"path": "/gateway", "port": 8080}]
    },
    "external_secret": {"gcsm_key": "apollo-integration"},
    "toleration": "apollo-general-service"
}"#;

const CORE: &str = r#"{
    "name": "Core",
    "controller": "statefulset",
    "config_paths": ["base.json"],
    "replicas": 1,
    "storage": 500
}"#;

fn base_args() -> [&'static str; 4] {
    [
        "--deployment-config-file",
        "deployment.json",
        "--namespace",
        "integration",
    ]
}

#[test]
fn zero_services_produces_empty_tree() {
    let ctx = TestContext::new();
    ctx.write_deployment("[]");

    ctx.cli().args(base_args()).assert().success();

    assert!(ctx.dist().is_dir());
    assert_eq!(fs::read_dir(ctx.dist()).unwrap().count(), 0);
}

#[test]
fn dashboard_without_cluster_fails_before_touching_filesystem() {
    let ctx = TestContext::new();
    ctx.write_app_configs();
    ctx.write_deployment(&format!("[{GATEWAY}]"));
    ctx.write_dashboard();

    ctx.cli()
        .args(base_args())
        .args(["--monitoring-dashboard-file", "dashboard.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "--cluster is required when --monitoring-dashboard-file is provided",
        ));

    assert!(!ctx.dist().exists());
}

#[test]
fn generates_service_charts() {
    let ctx = TestContext::new();
    ctx.write_app_configs();
    ctx.write_deployment(&format!("[{GATEWAY}, {CORE}]"));

    ctx.cli()
        .args(base_args())
        .args(["--deployment-image-tag", "v0.14.0"])
        .assert()
        .success()
        .stderr(predicate::str::contains("sequencer-gateway"));

    assert_eq!(
        ctx.chart_files("sequencer-gateway"),
        vec![
            "ConfigMap.sequencer-gateway-config.k8s.yaml",
            "Deployment.sequencer-gateway.k8s.yaml",
            "ExternalSecret.sequencer-gateway-secret.k8s.yaml",
            "HorizontalPodAutoscaler.sequencer-gateway.k8s.yaml",
            "Ingress.sequencer-gateway-ingress.k8s.yaml",
            "Service.sequencer-gateway.k8s.yaml",
        ]
    );
    assert_eq!(
        ctx.chart_files("sequencer-core"),
        vec![
            "ConfigMap.sequencer-core-config.k8s.yaml",
            "Service.sequencer-core.k8s.yaml",
            "StatefulSet.sequencer-core.k8s.yaml",
        ]
    );

    let deployment = fs::read_to_string(
        ctx.dist()
            .join("sequencer-gateway")
            .join("Deployment.sequencer-gateway.k8s.yaml"),
    )
    .unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&deployment).unwrap();
    assert_eq!(value["apiVersion"], "apps/v1");
    assert_eq!(value["metadata"]["namespace"], "integration");
    assert_eq!(
        value["spec"]["template"]["spec"]["containers"][0]["image"],
        "ghcr.io/starkware-libs/sequencer/sequencer:v0.14.0"
    );

    let config_map = fs::read_to_string(
        ctx.dist()
            .join("sequencer-gateway")
            .join("ConfigMap.sequencer-gateway-config.k8s.yaml"),
    )
    .unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&config_map).unwrap();
    let merged: serde_json::Value =
        serde_json::from_str(value["data"]["config"].as_str().unwrap()).unwrap();
    assert_eq!(merged["chain_id"], "SN_INTEGRATION");
    assert_eq!(merged["http_server_config.port"], 8080);
}

#[test]
fn generates_monitoring_chart() {
    let ctx = TestContext::new();
    ctx.write_app_configs();
    ctx.write_deployment(&format!("[{GATEWAY}]"));
    ctx.write_dashboard();

    ctx.cli()
        .args(base_args())
        .args([
            "--monitoring-dashboard-file",
            "dashboard.yaml",
            "--cluster",
            "sequencer-dev",
        ])
        .assert()
        .success();

    let chart = DashboardAssembler::new("sequencer-dev", "integration").chart_name();
    assert_eq!(
        ctx.chart_files(&chart),
        vec![
            format!("ConfigMap.{chart}-alerts.k8s.yaml"),
            format!("ConfigMap.{chart}-dashboard.k8s.yaml"),
        ]
    );
    assert!(ctx.chart_files("sequencer-gateway").contains(&String::from(
        "PodMonitoring.sequencer-gateway.k8s.yaml"
    )));

    let alerts = fs::read_to_string(
        ctx.dist()
            .join(&chart)
            .join(format!("ConfigMap.{chart}-alerts.k8s.yaml")),
    )
    .unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&alerts).unwrap();
    let rules: serde_json::Value =
        serde_json::from_str(value["data"]["alerts.json"].as_str().unwrap()).unwrap();
    assert_eq!(rules[0]["data"][0]["model"]["expr"], r#"sum(up{job="gateway"}) == 0"#);
    assert_eq!(rules[0]["condition"], "B");
}

#[test]
fn repeated_runs_are_identical() {
    let ctx = TestContext::new();
    ctx.write_app_configs();
    ctx.write_deployment(&format!("[{GATEWAY}, {CORE}]"));
    ctx.write_dashboard();

    let run = || {
        ctx.cli()
            .args(base_args())
            .args([
                "--monitoring-dashboard-file",
                "dashboard.yaml",
                "--cluster",
                "sequencer-dev",
            ])
            .assert()
            .success();
        ctx.snapshot()
    };

    let first = run();
    let second = run();
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn dry_run_writes_nothing() {
    let ctx = TestContext::new();
    ctx.write_app_configs();
    ctx.write_deployment(&format!("[{CORE}]"));

    ctx.cli()
        .args(base_args())
        .arg("--dry-run")
        .assert()
        .success()
        .stderr(predicate::str::contains("Planned"));

    assert!(!ctx.dist().exists());
}

#[test]
fn colliding_service_names_fail() {
    let ctx = TestContext::new();
    ctx.write_app_configs();
    ctx.write_deployment(&format!("[{CORE}, {}]", CORE.replace("\"Core\"", "\"core\"")));

    ctx.cli()
        .args(base_args())
        .assert()
        .failure()
        .stderr(predicate::str::contains("sequencer-core"));

    assert!(!ctx.dist().exists());
}

#[test]
fn unknown_controller_fails() {
    let ctx = TestContext::new();
    ctx.write_app_configs();
    ctx.write_deployment(&format!("[{}]", CORE.replace("statefulset", "daemonset")));

    ctx.cli()
        .args(base_args())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown controller kind 'daemonset'"));
}

#[test]
fn missing_config_file_fails() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(base_args())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn flags_fall_back_to_environment() {
    let ctx = TestContext::new();
    ctx.write_deployment("[]");

    ctx.cli()
        .env("SEQUENCER_DEPLOY_CONFIG", "deployment.json")
        .env("SEQUENCER_DEPLOY_NAMESPACE", "integration")
        .env("SEQUENCER_DEPLOY_OUTPUT_DIR", "out")
        .assert()
        .success();

    assert!(ctx.work_dir().join("out").is_dir());
}

#[test]
fn dotenv_file_supplies_flags_and_is_logged() {
    let ctx = TestContext::new();
    ctx.write_deployment("[]");
    ctx.write(
        ".env",
        "SEQUENCER_DEPLOY_CONFIG=deployment.json\nSEQUENCER_DEPLOY_NAMESPACE=integration\n",
    );

    ctx.cli()
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded environment from .env"));

    assert!(ctx.dist().is_dir());
}

#[test]
fn json_summary() {
    let ctx = TestContext::new();
    ctx.write_app_configs();
    ctx.write_deployment(&format!("[{CORE}]"));

    ctx.cli()
        .args(base_args())
        .args(["--output", "json"])
        .assert()
        .success()
        .stderr(predicate::str::contains(r#""name": "sequencer-core""#));
}
