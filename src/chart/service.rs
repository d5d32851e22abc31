//! Service chart emission.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::Controller;
use crate::error::{Result, SynthesisError};
use crate::k8s::{
    ConfigMap, Container, ContainerPort, CrossVersionObjectReference, Deployment, DeploymentSpec,
    ExternalSecret, ExternalSecretData, ExternalSecretSpec, ExternalSecretTarget,
    HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec, HttpIngressPath, HttpIngressRuleValue,
    Ingress, IngressHostRule, IngressSpec, LabelSelector, ManagedCertificate, ManagedCertificateSpec,
    MetricSpec, ObjectMeta, PersistentVolumeClaim, PodMonitoring, PodMonitoringSpec, PodSpec, PodTemplateSpec, Probe,
    RemoteRef, ResourceRequirements, ScrapeEndpoint, SecretStoreRef, Service, ServicePort,
    ServiceSpec, StatefulSet, StatefulSetSpec, TemplateMeta, Toleration, Volume, VolumeMount,
    VolumeSource,
};
use crate::topology::{IngressTopology, ServiceTopology};

use super::Chart;

/// Directory the application config ConfigMap is mounted at.
pub const CONFIG_MOUNT_PATH: &str = "/config/sequencer/presets";

/// ConfigMap key holding the merged application config.
pub const APP_CONFIG_KEY: &str = "config";

/// Mount path of the persistent data volume.
pub const DATA_MOUNT_PATH: &str = "/data";

/// Mount path of the external secret volume.
pub const SECRETS_MOUNT_PATH: &str = "/etc/secrets";

/// Key the external secret is stored under, and the file name it is mounted as.
pub const SECRET_FILE_NAME: &str = "secrets.json";

/// Ingress annotation naming the GKE managed certificates to serve.
pub const MANAGED_CERTIFICATES_ANNOTATION: &str = "networking.gke.io/managed-certificates";

/// Path of the node's Prometheus endpoint.
pub const METRICS_PATH: &str = "/monitoring/metrics";

/// Node label and taint key used for node pool selection.
pub const TOLERATION_KEY: &str = "role";

const READY_PATH: &str = "/monitoring/ready";
const ALIVE_PATH: &str = "/monitoring/alive";
const MONITORING_PORT_NAME: &str = "monitoring";
const CONFIG_VOLUME: &str = "config";
const DATA_VOLUME: &str = "data";
const SECRETS_VOLUME: &str = "secrets";
const SECRET_STORE: &str = "external-secrets";
const TERMINATION_GRACE_SECONDS: u32 = 30;

/// Emits the chart of one service.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartEmitter {
    monitoring: bool,
}

impl ChartEmitter {
    /// Creates an emitter; `monitoring` adds a PodMonitoring scrape target
    /// to every service chart.
    #[must_use]
    pub const fn new(monitoring: bool) -> Self {
        Self { monitoring }
    }

    /// Emits the chart of a service.
    ///
    /// # Errors
    ///
    /// Returns an error if the application config cannot be serialized.
    pub fn emit(&self, topology: &ServiceTopology) -> Result<Chart> {
        let name = topology.chart_name.as_str();
        let namespace = topology.namespace.as_str();
        let mut chart = Chart::new(name, namespace);

        chart.add(config_map(topology)?);
        chart.add(service(topology));

        match topology.controller {
            Controller::Deployment => {
                chart.add(deployment(topology));
                if let Some(storage) = topology.storage {
                    chart.add(PersistentVolumeClaim::read_write_once(
                        ObjectMeta::namespaced(data_claim_name(name), namespace)
                            .with_labels(labels(name)),
                        storage.size_gib,
                    ));
                }
            }
            Controller::StatefulSet => chart.add(stateful_set(topology)),
        }

        if let Some(autoscale) = topology.autoscale {
            chart.add(HorizontalPodAutoscaler {
                metadata: ObjectMeta::namespaced(name, namespace).with_labels(labels(name)),
                spec: HorizontalPodAutoscalerSpec {
                    scale_target_ref: CrossVersionObjectReference {
                        api_version: String::from("apps/v1"),
                        kind: topology.controller.to_string(),
                        name: name.to_string(),
                    },
                    min_replicas: autoscale.min_replicas,
                    max_replicas: autoscale.max_replicas,
                    metrics: vec![MetricSpec::utilization("cpu", autoscale.cpu_utilization)],
                },
            });
        }

        if let Some(ingress) = &topology.ingress {
            chart.add(ingress_object(topology, ingress));
            // Managed certificates only attach to external load balancers.
            if !ingress.internal {
                chart.add(managed_certificate(topology, ingress));
            }
        }

        if let Some(key) = &topology.external_secret {
            chart.add(external_secret(topology, key));
        }

        if self.monitoring {
            chart.add(PodMonitoring {
                metadata: ObjectMeta::namespaced(name, namespace).with_labels(labels(name)),
                spec: PodMonitoringSpec {
                    selector: LabelSelector::new(labels(name)),
                    endpoints: vec![ScrapeEndpoint {
                        port: String::from(MONITORING_PORT_NAME),
                        path: String::from(METRICS_PATH),
                        interval: String::from("10s"),
                    }],
                },
            });
        }

        debug!("Emitted chart {} with {} object(s)", name, chart.len());
        Ok(chart)
    }
}

fn labels(chart_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(String::from("app"), chart_name.to_string())])
}

fn data_claim_name(chart_name: &str) -> String {
    format!("{chart_name}-data")
}

fn config_map(topology: &ServiceTopology) -> Result<ConfigMap> {
    let name = topology.config_map_name();
    let rendered = serde_json::to_string_pretty(&topology.app_config.document)
        .map_err(|e| SynthesisError::serialization(format!("ConfigMap/{name}"), e.to_string()))?;

    Ok(ConfigMap {
        metadata: ObjectMeta::namespaced(name, topology.namespace.as_str())
            .with_labels(labels(&topology.chart_name)),
        data: BTreeMap::from([(String::from(APP_CONFIG_KEY), rendered)]),
    })
}

fn service(topology: &ServiceTopology) -> Service {
    Service {
        metadata: ObjectMeta::namespaced(topology.chart_name.as_str(), topology.namespace.as_str())
            .with_labels(labels(&topology.chart_name)),
        spec: ServiceSpec {
            service_type: String::from("ClusterIP"),
            selector: labels(&topology.chart_name),
            ports: topology
                .ports
                .iter()
                .map(|p| ServicePort {
                    name: p.name.clone(),
                    port: p.port,
                    target_port: p.name.clone(),
                    protocol: String::from("TCP"),
                })
                .collect(),
        },
    }
}

fn replicas(topology: &ServiceTopology) -> Option<u32> {
    // The autoscaler owns the replica count when present.
    topology.autoscale.is_none().then_some(topology.replicas)
}

fn deployment(topology: &ServiceTopology) -> Deployment {
    let name = topology.chart_name.as_str();
    let mut template = pod_template(topology);

    if topology.storage.is_some() {
        template.spec.volumes.push(Volume {
            name: String::from(DATA_VOLUME),
            source: VolumeSource::PersistentVolumeClaim {
                claim_name: data_claim_name(name),
            },
        });
    }

    Deployment {
        metadata: ObjectMeta::namespaced(name, topology.namespace.as_str())
            .with_labels(labels(name)),
        spec: DeploymentSpec {
            replicas: replicas(topology),
            selector: LabelSelector::new(labels(name)),
            template,
        },
    }
}

fn stateful_set(topology: &ServiceTopology) -> StatefulSet {
    let name = topology.chart_name.as_str();

    let volume_claim_templates = topology
        .storage
        .map(|storage| {
            PersistentVolumeClaim::read_write_once(
                ObjectMeta {
                    name: String::from(DATA_VOLUME),
                    ..ObjectMeta::default()
                },
                storage.size_gib,
            )
        })
        .into_iter()
        .collect();

    StatefulSet {
        metadata: ObjectMeta::namespaced(name, topology.namespace.as_str())
            .with_labels(labels(name)),
        spec: StatefulSetSpec {
            replicas: replicas(topology),
            service_name: name.to_string(),
            selector: LabelSelector::new(labels(name)),
            template: pod_template(topology),
            volume_claim_templates,
        },
    }
}

fn pod_template(topology: &ServiceTopology) -> PodTemplateSpec {
    let name = topology.chart_name.as_str();

    let mut volumes = vec![Volume {
        name: String::from(CONFIG_VOLUME),
        source: VolumeSource::ConfigMap {
            name: topology.config_map_name(),
        },
    }];
    if topology.external_secret.is_some() {
        volumes.push(Volume {
            name: String::from(SECRETS_VOLUME),
            source: VolumeSource::Secret {
                secret_name: topology.secret_name(),
            },
        });
    }

    let (tolerations, node_selector) = topology.toleration.as_ref().map_or_else(
        || (Vec::new(), BTreeMap::new()),
        |value| {
            (
                vec![Toleration::no_schedule(TOLERATION_KEY, value.as_str())],
                BTreeMap::from([(String::from(TOLERATION_KEY), value.clone())]),
            )
        },
    );

    PodTemplateSpec {
        metadata: TemplateMeta {
            labels: labels(name),
            annotations: BTreeMap::from([(
                String::from("checksum/config"),
                topology.app_config.checksum.clone(),
            )]),
        },
        spec: PodSpec {
            containers: vec![container(topology)],
            volumes,
            tolerations,
            node_selector,
            termination_grace_period_seconds: Some(TERMINATION_GRACE_SECONDS),
        },
    }
}

fn container(topology: &ServiceTopology) -> Container {
    let mut args = vec![
        String::from("--config_file"),
        format!("{CONFIG_MOUNT_PATH}/{APP_CONFIG_KEY}"),
    ];

    let mut volume_mounts = vec![VolumeMount {
        name: String::from(CONFIG_VOLUME),
        mount_path: String::from(CONFIG_MOUNT_PATH),
        read_only: true,
    }];

    if topology.storage.is_some() {
        volume_mounts.push(VolumeMount {
            name: String::from(DATA_VOLUME),
            mount_path: String::from(DATA_MOUNT_PATH),
            read_only: false,
        });
    }

    if topology.external_secret.is_some() {
        args.push(String::from("--config_file"));
        args.push(format!("{SECRETS_MOUNT_PATH}/{SECRET_FILE_NAME}"));
        volume_mounts.push(VolumeMount {
            name: String::from(SECRETS_VOLUME),
            mount_path: String::from(SECRETS_MOUNT_PATH),
            read_only: true,
        });
    }

    let resources = topology.resources.map(|r| ResourceRequirements {
        requests: BTreeMap::from([
            (String::from("cpu"), r.requests.cpu.to_string()),
            (String::from("memory"), format!("{}Gi", r.requests.memory)),
        ]),
        limits: BTreeMap::from([
            (String::from("cpu"), r.limits.cpu.to_string()),
            (String::from("memory"), format!("{}Gi", r.limits.memory)),
        ]),
    });

    Container {
        name: String::from("sequencer-node"),
        image: topology.image.clone(),
        image_pull_policy: String::from("Always"),
        args,
        ports: topology
            .ports
            .iter()
            .map(|p| ContainerPort {
                name: p.name.clone(),
                container_port: p.port,
                protocol: String::from("TCP"),
            })
            .collect(),
        resources,
        volume_mounts,
        readiness_probe: Some(Probe::http(READY_PATH, MONITORING_PORT_NAME)),
        liveness_probe: Some(Probe::http(ALIVE_PATH, MONITORING_PORT_NAME)),
    }
}

fn ingress_object(topology: &ServiceTopology, ingress: &IngressTopology) -> Ingress {
    let name = format!("{}-ingress", topology.chart_name);
    let class = if ingress.internal { "gce-internal" } else { "gce" };

    let paths: Vec<HttpIngressPath> = ingress
        .routes
        .iter()
        .map(|route| HttpIngressPath::prefix(route.path.as_str(), route.service.as_str(), route.port))
        .collect();

    let mut metadata = ObjectMeta::namespaced(name, topology.namespace.as_str())
        .with_labels(labels(&topology.chart_name))
        .with_annotation("kubernetes.io/ingress.class", class);
    if !ingress.internal {
        metadata = metadata.with_annotation(
            MANAGED_CERTIFICATES_ANNOTATION,
            certificate_name(&topology.chart_name),
        );
    }

    Ingress {
        metadata,
        spec: IngressSpec {
            rules: ingress
                .hosts
                .iter()
                .map(|host| IngressHostRule {
                    host: host.clone(),
                    http: HttpIngressRuleValue {
                        paths: paths.clone(),
                    },
                })
                .collect(),
        },
    }
}

fn certificate_name(chart_name: &str) -> String {
    format!("{chart_name}-cert")
}

fn managed_certificate(topology: &ServiceTopology, ingress: &IngressTopology) -> ManagedCertificate {
    ManagedCertificate {
        metadata: ObjectMeta::namespaced(
            certificate_name(&topology.chart_name),
            topology.namespace.as_str(),
        )
        .with_labels(labels(&topology.chart_name)),
        spec: ManagedCertificateSpec {
            domains: ingress.hosts.clone(),
        },
    }
}

fn external_secret(topology: &ServiceTopology, key: &str) -> ExternalSecret {
    let name = topology.secret_name();

    ExternalSecret {
        metadata: ObjectMeta::namespaced(name.as_str(), topology.namespace.as_str())
            .with_labels(labels(&topology.chart_name)),
        spec: ExternalSecretSpec {
            refresh_interval: String::from("1m"),
            secret_store_ref: SecretStoreRef {
                kind: String::from("ClusterSecretStore"),
                name: String::from(SECRET_STORE),
            },
            target: ExternalSecretTarget {
                name,
                creation_policy: String::from("Owner"),
            },
            data: vec![ExternalSecretData {
                secret_key: String::from(SECRET_FILE_NAME),
                remote_ref: RemoteRef {
                    key: key.to_string(),
                },
            }],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExternalSecretConfig, IngressConfig, IngressRule, Resource, Resources, ServiceConfig};
    use crate::k8s::ApiObject;
    use crate::topology::{DEFAULT_IMAGE_REPOSITORY, GlobalParams, TopologyBuilder};
    use serde_json::json;

    fn topology(controller: &str, autoscale: bool, storage: Option<u32>) -> ServiceTopology {
        let service = ServiceConfig {
            name: String::from("Core"),
            controller: String::from(controller),
            config_paths: vec![],
            ingress: Some(IngressConfig {
                domain: String::from("sw-dev.io"),
                alternative_names: vec![],
                internal: false,
                rules: vec![IngressRule {
                    path: String::from("/gateway"),
                    port: 8080,
                    backend: None,
                }],
            }),
            autoscale,
            replicas: 1,
            max_replicas: None,
            storage,
            toleration: Some(String::from("apollo-core-service")),
            resources: Some(Resources {
                requests: Resource::new(2, 4),
                limits: Resource::new(4, 8),
            }),
            external_secret: Some(ExternalSecretConfig {
                gcsm_key: String::from("apollo-integration"),
            }),
        };
        let params = GlobalParams {
            namespace: String::from("integration"),
            image_repository: String::from(DEFAULT_IMAGE_REPOSITORY),
            image_tag: String::from("dev"),
        };
        TopologyBuilder::new(params)
            .build(&service, json!({"monitoring_endpoint_config.port": 8082}))
            .unwrap()
    }

    fn kinds(chart: &Chart) -> Vec<&'static str> {
        chart.objects().iter().map(ApiObject::kind).collect()
    }

    #[test]
    fn test_deployment_chart_objects() {
        let chart = ChartEmitter::new(true)
            .emit(&topology("Deployment", true, Some(32)))
            .unwrap();

        assert_eq!(chart.name(), "sequencer-core");
        assert_eq!(
            kinds(&chart),
            vec![
                "ConfigMap",
                "Service",
                "Deployment",
                "PersistentVolumeClaim",
                "HorizontalPodAutoscaler",
                "Ingress",
                "ManagedCertificate",
                "ExternalSecret",
                "PodMonitoring",
            ]
        );
        assert!(chart.find("PersistentVolumeClaim", "sequencer-core-data").is_some());
        assert!(chart.find("Ingress", "sequencer-core-ingress").is_some());
        assert!(chart.find("ExternalSecret", "sequencer-core-secret").is_some());
    }

    #[test]
    fn test_statefulset_uses_claim_templates() {
        let chart = ChartEmitter::new(false)
            .emit(&topology("statefulset", false, Some(64)))
            .unwrap();

        assert_eq!(
            kinds(&chart),
            vec![
                "ConfigMap",
                "Service",
                "StatefulSet",
                "Ingress",
                "ManagedCertificate",
                "ExternalSecret",
            ]
        );

        let Some(ApiObject::StatefulSet(set)) = chart.find("StatefulSet", "sequencer-core") else {
            panic!("missing statefulset");
        };
        assert_eq!(set.spec.replicas, Some(1));
        assert_eq!(set.spec.volume_claim_templates[0].metadata.name, "data");
        assert_eq!(
            set.spec.volume_claim_templates[0].spec.resources.requests["storage"],
            "64Gi"
        );
    }

    #[test]
    fn test_pod_template() {
        let topology = topology("Deployment", true, Some(32));
        let chart = ChartEmitter::new(false).emit(&topology).unwrap();

        let Some(ApiObject::Deployment(deployment)) = chart.find("Deployment", "sequencer-core")
        else {
            panic!("missing deployment");
        };
        // Autoscaled, so the replica count is left to the HPA.
        assert_eq!(deployment.spec.replicas, None);

        let template = &deployment.spec.template;
        assert_eq!(
            template.metadata.annotations["checksum/config"],
            topology.app_config.checksum
        );
        assert_eq!(template.spec.node_selector["role"], "apollo-core-service");
        assert_eq!(template.spec.tolerations[0].effect, "NoSchedule");

        let container = &template.spec.containers[0];
        assert_eq!(
            container.args,
            vec![
                "--config_file",
                "/config/sequencer/presets/config",
                "--config_file",
                "/etc/secrets/secrets.json",
            ]
        );
        let resources = container.resources.as_ref().unwrap();
        assert_eq!(resources.requests["memory"], "4Gi");
        assert_eq!(resources.limits["cpu"], "4");

        let mounts: Vec<_> = container
            .volume_mounts
            .iter()
            .map(|m| m.mount_path.as_str())
            .collect();
        assert_eq!(mounts, vec![CONFIG_MOUNT_PATH, DATA_MOUNT_PATH, SECRETS_MOUNT_PATH]);
        assert_eq!(
            container.readiness_probe.as_ref().unwrap().http_get.path,
            "/monitoring/ready"
        );
    }

    #[test]
    fn test_config_map_holds_merged_config() {
        let chart = ChartEmitter::new(false)
            .emit(&topology("Deployment", false, None))
            .unwrap();

        let Some(ApiObject::ConfigMap(config_map)) = chart.find("ConfigMap", "sequencer-core-config")
        else {
            panic!("missing config map");
        };
        let parsed: serde_json::Value = serde_json::from_str(&config_map.data["config"]).unwrap();
        assert_eq!(parsed["monitoring_endpoint_config.port"], 8082);
    }

    #[test]
    fn test_ingress_class() {
        let chart = ChartEmitter::new(false)
            .emit(&topology("Deployment", false, None))
            .unwrap();

        let Some(ApiObject::Ingress(ingress)) = chart.find("Ingress", "sequencer-core-ingress")
        else {
            panic!("missing ingress");
        };
        assert_eq!(
            ingress.metadata.annotations["kubernetes.io/ingress.class"],
            "gce"
        );
        assert_eq!(ingress.spec.rules[0].host, "sw-dev.io");
        assert_eq!(
            ingress.spec.rules[0].http.paths[0].backend.service.name,
            "sequencer-core"
        );
    }

    #[test]
    fn test_external_ingress_certificate_is_emitted() {
        let chart = ChartEmitter::new(false)
            .emit(&topology("Deployment", false, None))
            .unwrap();

        let Some(ApiObject::Ingress(ingress)) = chart.find("Ingress", "sequencer-core-ingress")
        else {
            panic!("missing ingress");
        };
        let certificate = &ingress.metadata.annotations[MANAGED_CERTIFICATES_ANNOTATION];

        let Some(ApiObject::ManagedCertificate(managed)) =
            chart.find("ManagedCertificate", certificate)
        else {
            panic!("ingress references certificate {certificate} that is not emitted");
        };
        let hosts: Vec<_> = ingress.spec.rules.iter().map(|r| r.host.clone()).collect();
        assert_eq!(managed.spec.domains, hosts);

        let yaml = chart
            .find("Ingress", "sequencer-core-ingress")
            .unwrap()
            .to_yaml()
            .unwrap();
        assert!(!yaml.contains("tls"));
        assert!(!yaml.contains("secretName"));
    }

    #[test]
    fn test_internal_ingress_has_no_certificate() {
        let mut topology = topology("Deployment", false, None);
        if let Some(ingress) = topology.ingress.as_mut() {
            ingress.internal = true;
        }
        let chart = ChartEmitter::new(false).emit(&topology).unwrap();

        let Some(ApiObject::Ingress(ingress)) = chart.find("Ingress", "sequencer-core-ingress")
        else {
            panic!("missing ingress");
        };
        assert_eq!(
            ingress.metadata.annotations["kubernetes.io/ingress.class"],
            "gce-internal"
        );
        assert!(!ingress.metadata.annotations.contains_key(MANAGED_CERTIFICATES_ANNOTATION));
        assert!(!kinds(&chart).contains(&"ManagedCertificate"));
    }
}
