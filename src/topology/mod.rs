//! Service topology: what Kubernetes objects a single service needs.
//!
//! A [`ServiceTopology`] is the resolved, validated form of one service entry.
//! The [`TopologyBuilder`] derives it from the configuration without touching
//! the filesystem, so the same inputs always produce the same record.

mod builder;
mod types;

pub use builder::{
    DEFAULT_CPU_UTILIZATION, DEFAULT_IMAGE_REPOSITORY, DEFAULT_MONITORING_PORT, GlobalParams,
    HTTP_PORT_KEY, MONITORING_PORT_KEY, TopologyBuilder,
};
pub use types::{
    ApplicationConfig, AutoscalePolicy, IngressRoute, IngressTopology, NamedPort,
    ServiceTopology, StorageSpec,
};
