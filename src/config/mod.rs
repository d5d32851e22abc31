//! Configuration module for the deployment generator.
//!
//! This module handles all configuration-related functionality:
//! - Parsing deployment configs and dashboard definitions (JSON or YAML)
//! - Merging per-service application config files
//! - Validation of configuration values
//! - Name sanitization and deterministic hashing

mod hash;
mod naming;
mod parser;
mod spec;
mod validator;

pub use hash::{ConfigHasher, SHORT_HASH_LEN};
pub use naming::{MAX_NAME_LEN, sanitize_name};
pub use parser::{ConfigParser, DocumentFormat};
pub use spec::{
    Controller, DEFAULT_MAX_REPLICAS, DeploymentConfig, ExternalSecretConfig, IngressConfig,
    IngressRule, Resource, Resources, ServiceConfig,
};
pub use validator::{
    ConfigValidator, SERVICE_CHART_PREFIX, ValidationError, ValidationResult, service_chart_name,
};
