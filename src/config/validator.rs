//! Configuration validation for deployment configs.
//!
//! Validation runs once after loading, before any topology is built, so a
//! bad entry aborts the run before anything is generated.

use crate::error::{ConfigError, DeployError, Result};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::naming::sanitize_name;
use super::spec::{Controller, DeploymentConfig, IngressConfig, ServiceConfig};

/// Prefix of every service chart name.
pub const SERVICE_CHART_PREFIX: &str = "sequencer";

/// Validator for deployment configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

/// Returns the chart name generated for a service.
#[must_use]
pub fn service_chart_name(service_name: &str) -> String {
    sanitize_name(&format!("{SERVICE_CHART_PREFIX}-{service_name}"))
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a deployment configuration.
    ///
    /// Unknown controllers, autoscaling without resources and chart name
    /// collisions surface as their dedicated [`ConfigError`] variants; every
    /// other problem is reported as the first collected validation error.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn validate(&self, config: &DeploymentConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::check_fatal(config)?;

        if config.application_config_subdir.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("application_config_subdir"),
                message: String::from("Application config subdir cannot be empty"),
            });
        }

        if config.services.is_empty() {
            result
                .warnings
                .push(String::from("No services defined in configuration"));
        }

        for (i, service) in config.services.iter().enumerate() {
            Self::validate_service(service, &format!("services[{i}]"), &mut result);
        }

        for warning in &result.warnings {
            warn!("{warning}");
        }

        if result.errors.is_empty() {
            debug!("Configuration validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(DeployError::Config(ConfigError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }))
        }
    }

    /// Checks the conditions that have a dedicated error kind.
    fn check_fatal(config: &DeploymentConfig) -> Result<()> {
        let mut seen: HashMap<String, &str> = HashMap::new();

        for service in &config.services {
            service.controller_kind()?;

            if service.autoscale && service.resources.is_none() {
                return Err(DeployError::Config(ConfigError::AutoscaleWithoutResources {
                    service: service.name.clone(),
                }));
            }

            let chart_name = service_chart_name(&service.name);
            if let Some(previous) = seen.insert(chart_name.clone(), &service.name) {
                return Err(DeployError::Config(ConfigError::DuplicateName {
                    resource_type: String::from("service"),
                    name: format!("'{previous}' and '{}' both map to '{chart_name}'", service.name),
                }));
            }
        }

        Ok(())
    }

    /// Validates a single service entry.
    fn validate_service(service: &ServiceConfig, prefix: &str, result: &mut ValidationResult) {
        if sanitize_name(&service.name).is_empty() {
            result.errors.push(ValidationError {
                field: format!("{prefix}.name"),
                message: format!(
                    "Service name '{}' has no characters usable in a Kubernetes name",
                    service.name
                ),
            });
        }

        if service.replicas == 0 {
            result.errors.push(ValidationError {
                field: format!("{prefix}.replicas"),
                message: String::from("Replica count must be at least 1"),
            });
        }

        if service.autoscale && service.effective_max_replicas() < service.replicas {
            result.errors.push(ValidationError {
                field: format!("{prefix}.max_replicas"),
                message: format!(
                    "max_replicas ({}) is lower than replicas ({})",
                    service.effective_max_replicas(),
                    service.replicas
                ),
            });
        }

        if service.storage == Some(0) {
            result.errors.push(ValidationError {
                field: format!("{prefix}.storage"),
                message: String::from("Storage size must be at least 1 GiB"),
            });
        }

        if service.storage.is_none()
            && matches!(service.controller_kind(), Ok(Controller::StatefulSet))
        {
            result.warnings.push(format!(
                "{prefix}: StatefulSet '{}' declares no storage",
                service.name
            ));
        }

        if service.config_paths.is_empty() {
            result.warnings.push(format!(
                "{prefix}.config_paths: Service '{}' has no application config",
                service.name
            ));
        }

        if let Some(resources) = &service.resources
            && !resources.requests.fits_within(&resources.limits)
        {
            result.errors.push(ValidationError {
                field: format!("{prefix}.resources"),
                message: format!(
                    "Resource requests exceed limits for service '{}'",
                    service.name
                ),
            });
        }

        if let Some(secret) = &service.external_secret
            && secret.gcsm_key.is_empty()
        {
            result.errors.push(ValidationError {
                field: format!("{prefix}.external_secret.gcsm_key"),
                message: String::from("External secret key cannot be empty"),
            });
        }

        if let Some(ingress) = &service.ingress {
            Self::validate_ingress(ingress, prefix, result);
        }
    }

    /// Validates ingress configuration.
    fn validate_ingress(ingress: &IngressConfig, prefix: &str, result: &mut ValidationResult) {
        if ingress.domain.is_empty() {
            result.errors.push(ValidationError {
                field: format!("{prefix}.ingress.domain"),
                message: String::from("Ingress domain cannot be empty"),
            });
        }

        if ingress.rules.is_empty() {
            result
                .warnings
                .push(format!("{prefix}.ingress: Ingress defines no rules"));
        }

        for (i, rule) in ingress.rules.iter().enumerate() {
            if !rule.path.starts_with('/') {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.ingress.rules[{i}].path"),
                    message: format!("Ingress path must start with '/': {}", rule.path),
                });
            }
            if rule.port == 0 {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.ingress.rules[{i}].port"),
                    message: String::from("Ingress port cannot be 0"),
                });
            }
        }
    }
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
