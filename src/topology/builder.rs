//! Builds [`ServiceTopology`] records from service configuration.

use tracing::debug;

use crate::config::{ConfigHasher, ServiceConfig, sanitize_name, service_chart_name};
use crate::error::{ConfigError, Result};

use super::types::{
    ApplicationConfig, AutoscalePolicy, IngressRoute, IngressTopology, NamedPort,
    ServiceTopology, StorageSpec,
};

/// Image repository used when neither the CLI nor the config overrides it.
pub const DEFAULT_IMAGE_REPOSITORY: &str = "ghcr.io/starkware-libs/sequencer/sequencer";

/// Application config key holding the monitoring endpoint port.
pub const MONITORING_PORT_KEY: &str = "monitoring_endpoint_config.port";

/// Application config key holding the HTTP server port.
pub const HTTP_PORT_KEY: &str = "http_server_config.port";

/// Monitoring port used when the application config does not set one.
pub const DEFAULT_MONITORING_PORT: u16 = 8082;

/// Autoscaler CPU target, in percent of the request.
pub const DEFAULT_CPU_UTILIZATION: u32 = 70;

/// Parameters shared by every service of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalParams {
    /// Target namespace (sanitized by the builder).
    pub namespace: String,
    /// Image repository, without tag.
    pub image_repository: String,
    /// Image tag.
    pub image_tag: String,
}

impl GlobalParams {
    /// Returns the full image reference.
    #[must_use]
    pub fn image(&self) -> String {
        format!("{}:{}", self.image_repository, self.image_tag)
    }
}

/// Builder mapping one service entry to its topology.
#[derive(Debug)]
pub struct TopologyBuilder {
    params: GlobalParams,
    hasher: ConfigHasher,
}

impl TopologyBuilder {
    /// Creates a builder for the given run parameters.
    #[must_use]
    pub const fn new(params: GlobalParams) -> Self {
        Self {
            params,
            hasher: ConfigHasher::new(),
        }
    }

    /// Builds the topology of one service.
    ///
    /// `app_config` is the service's merged application config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownController`] or
    /// [`ConfigError::AutoscaleWithoutResources`] for entries that would
    /// produce manifests Kubernetes rejects.
    pub fn build(
        &self,
        service: &ServiceConfig,
        app_config: serde_json::Value,
    ) -> Result<ServiceTopology> {
        let controller = service.controller_kind()?;

        if service.autoscale && service.resources.is_none() {
            return Err(ConfigError::AutoscaleWithoutResources {
                service: service.name.clone(),
            }
            .into());
        }

        let chart_name = service_chart_name(&service.name);
        let monitoring_port = port_from_config(&app_config, MONITORING_PORT_KEY)
            .unwrap_or(DEFAULT_MONITORING_PORT);

        let autoscale = service.autoscale.then(|| AutoscalePolicy {
            min_replicas: service.replicas,
            max_replicas: service.effective_max_replicas(),
            cpu_utilization: DEFAULT_CPU_UTILIZATION,
        });

        let ingress = service.ingress.as_ref().map(|ingress| IngressTopology {
            hosts: std::iter::once(ingress.domain.clone())
                .chain(ingress.alternative_names.iter().cloned())
                .collect(),
            internal: ingress.internal,
            routes: ingress
                .rules
                .iter()
                .map(|rule| IngressRoute {
                    path: rule.path.clone(),
                    service: rule
                        .backend
                        .as_deref()
                        .map_or_else(|| chart_name.clone(), sanitize_name),
                    port: rule.port,
                })
                .collect(),
        });

        let ports = collect_ports(&app_config, monitoring_port, ingress.as_ref());
        let checksum = self.hasher.hash_json(&app_config);

        debug!(
            "Built topology for {} ({controller}, {} port(s))",
            chart_name,
            ports.len()
        );

        Ok(ServiceTopology {
            name: service.name.clone(),
            chart_name,
            namespace: sanitize_name(&self.params.namespace),
            controller,
            image: self.params.image(),
            replicas: service.replicas,
            autoscale,
            ingress,
            storage: service.storage.map(|size_gib| StorageSpec { size_gib }),
            toleration: service.toleration.clone(),
            resources: service.resources,
            external_secret: service
                .external_secret
                .as_ref()
                .map(|secret| secret.gcsm_key.clone()),
            ports,
            monitoring_port,
            app_config: ApplicationConfig {
                document: app_config,
                checksum,
            },
        })
    }
}

/// Reads a port number from a flat application config.
fn port_from_config(app_config: &serde_json::Value, key: &str) -> Option<u16> {
    app_config
        .get(key)
        .and_then(serde_json::Value::as_u64)
        .and_then(|port| u16::try_from(port).ok())
}

/// Collects the monitoring, HTTP and ingress ports, first name winning per number.
fn collect_ports(
    app_config: &serde_json::Value,
    monitoring_port: u16,
    ingress: Option<&IngressTopology>,
) -> Vec<NamedPort> {
    let mut ports = vec![NamedPort {
        name: String::from("monitoring"),
        port: monitoring_port,
    }];

    let mut push = |name: String, port: u16| {
        if !ports.iter().any(|p| p.port == port) {
            ports.push(NamedPort { name, port });
        }
    };

    if let Some(http_port) = port_from_config(app_config, HTTP_PORT_KEY) {
        push(String::from("http"), http_port);
    }

    for route in ingress.iter().flat_map(|i| i.routes.iter()) {
        push(format!("port-{}", route.port), route.port);
    }

    ports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExternalSecretConfig, IngressConfig, IngressRule, Resource, Resources};
    use crate::error::DeployError;
    use serde_json::json;

    fn params() -> GlobalParams {
        GlobalParams {
            namespace: String::from("Integration_Test"),
            image_repository: String::from(DEFAULT_IMAGE_REPOSITORY),
            image_tag: String::from("v0.14.0"),
        }
    }

    fn service() -> ServiceConfig {
        ServiceConfig {
            name: String::from("HttpServer"),
            controller: String::from("Deployment"),
            config_paths: vec![String::from("http_server.json")],
            ingress: Some(IngressConfig {
                domain: String::from("sw-dev.io"),
                alternative_names: vec![String::from("gateway.sw-dev.io")],
                internal: true,
                rules: vec![IngressRule {
                    path: String::from("/gateway"),
                    port: 8080,
                    backend: None,
                }],
            }),
            autoscale: true,
            replicas: 2,
            max_replicas: Some(6),
            storage: None,
            toleration: Some(String::from("apollo-general-service")),
            resources: Some(Resources {
                requests: Resource::new(1, 2),
                limits: Resource::new(2, 4),
            }),
            external_secret: Some(ExternalSecretConfig {
                gcsm_key: String::from("apollo-integration"),
            }),
        }
    }

    #[test]
    fn test_build_topology() {
        let app_config = json!({"http_server_config.port": 8080, "monitoring_endpoint_config.port": 8082});
        let topology = TopologyBuilder::new(params())
            .build(&service(), app_config)
            .unwrap();

        assert_eq!(topology.chart_name, "sequencer-httpserver");
        assert_eq!(topology.namespace, "integration-test");
        assert_eq!(
            topology.image,
            "ghcr.io/starkware-libs/sequencer/sequencer:v0.14.0"
        );
        assert_eq!(
            topology.autoscale,
            Some(AutoscalePolicy {
                min_replicas: 2,
                max_replicas: 6,
                cpu_utilization: DEFAULT_CPU_UTILIZATION,
            })
        );
        assert_eq!(topology.external_secret.as_deref(), Some("apollo-integration"));

        let ingress = topology.ingress.as_ref().unwrap();
        assert_eq!(ingress.hosts, vec!["sw-dev.io", "gateway.sw-dev.io"]);
        assert_eq!(ingress.routes[0].service, "sequencer-httpserver");

        // The ingress port matches the HTTP port, so it is not duplicated.
        let names: Vec<_> = topology.ports.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["monitoring", "http"]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = TopologyBuilder::new(params());
        let first = builder.build(&service(), json!({"a": 1})).unwrap();
        let second = builder.build(&service(), json!({"a": 1})).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_default_monitoring_port() {
        let topology = TopologyBuilder::new(params())
            .build(&service(), json!({}))
            .unwrap();
        assert_eq!(topology.monitoring_port, DEFAULT_MONITORING_PORT);
        assert_eq!(topology.ports[1].name, "port-8080");
    }

    #[test]
    fn test_autoscale_without_resources_fails_fast() {
        let mut svc = service();
        svc.resources = None;

        let result = TopologyBuilder::new(params()).build(&svc, json!({}));
        assert!(matches!(
            result,
            Err(DeployError::Config(ConfigError::AutoscaleWithoutResources { .. }))
        ));
    }

    #[test]
    fn test_unknown_controller() {
        let mut svc = service();
        svc.controller = String::from("ReplicaSet");

        let result = TopologyBuilder::new(params()).build(&svc, json!({}));
        assert!(matches!(
            result,
            Err(DeployError::Config(ConfigError::UnknownController { .. }))
        ));
    }
}
