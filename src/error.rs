//! Error types for the sequencer deployment generator.
//!
//! This module provides the error hierarchy for every stage of a generator
//! run: argument validation, configuration loading, and synthesis of the
//! output tree.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the deployment generator.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid command-line flag combinations.
    #[error("Argument error: {0}")]
    Argument(#[from] ArgumentError),

    /// Errors raised while writing the output tree.
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// A service references a controller kind other than deployment or statefulset.
    #[error("Unknown controller kind '{kind}' for service '{service}'")]
    UnknownController {
        /// Name of the offending service.
        service: String,
        /// The controller string found in the configuration.
        kind: String,
    },

    /// A service enables autoscaling without declaring resource requests.
    #[error("Service '{service}' enables autoscaling but declares no resource requests")]
    AutoscaleWithoutResources {
        /// Name of the offending service.
        service: String,
    },

    /// Two definitions resolve to the same name.
    #[error("Duplicate {resource_type} name: {name}")]
    DuplicateName {
        /// Type of resource (service, alert, etc.).
        resource_type: String,
        /// The duplicated name.
        name: String,
    },
}

/// Invalid command-line arguments.
#[derive(Debug, Error)]
pub enum ArgumentError {
    /// The monitoring dashboard file was given without a cluster.
    #[error("--cluster is required when --monitoring-dashboard-file is provided")]
    ClusterRequired,

    /// A flag was given an empty value.
    #[error("--{flag} must not be empty")]
    Empty {
        /// Name of the flag, without leading dashes.
        flag: &'static str,
    },
}

/// Errors raised while synthesizing charts to disk.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The output directory could not be created.
    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A manifest file could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A resource could not be rendered.
    #[error("Failed to render {resource}: {message}")]
    Serialization {
        /// Resource identifier (`Kind/name`).
        resource: String,
        /// Description of the serialization error.
        message: String,
    },

    /// Two charts were registered under the same name.
    #[error("Chart '{name}' is already registered")]
    DuplicateChart {
        /// The chart name.
        name: String,
    },

    /// Two objects of one chart map to the same file.
    #[error("Chart '{chart}' contains more than one resource for {file}")]
    DuplicateResource {
        /// The chart name.
        chart: String,
        /// The colliding file name.
        file: String,
    },
}

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, DeployError>;

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a parse error tied to a source location.
    #[must_use]
    pub fn parse(message: impl Into<String>, location: Option<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location,
        }
    }
}

impl SynthesisError {
    /// Creates a serialization error for a resource.
    #[must_use]
    pub fn serialization(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_required_message() {
        let err = DeployError::from(ArgumentError::ClusterRequired);
        assert_eq!(
            err.to_string(),
            "Argument error: --cluster is required when --monitoring-dashboard-file is provided"
        );
    }

    #[test]
    fn test_validation_helpers() {
        let err = ConfigError::validation("replicas must be at least 1", "services[0].replicas");
        match err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field.as_deref(), Some("services[0].replicas"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
