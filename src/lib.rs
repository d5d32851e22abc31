// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Sequencer Deploy
//!
//! Generates Kubernetes manifests and Grafana dashboards for a sequencer
//! deployment from declarative configuration.
//!
//! ## Overview
//!
//! A deployment configuration lists services. For each service the generator:
//!
//! - Merges the service's application config files
//! - Builds a [`topology::ServiceTopology`] describing what the service needs
//! - Emits a chart of Kubernetes objects (workload, service, config, ingress...)
//!
//! When a dashboard definition is supplied, a monitoring chart carries the
//! Grafana dashboard and alert rules as sidecar-provisioned ConfigMaps.
//!
//! ## Architecture
//!
//! Generation is a one-shot pipeline:
//!
//! 1. **Load**: read and validate every input file
//! 2. **Build**: turn services into charts, all in memory
//! 3. **Synthesize**: render every object, then write one folder per chart
//!
//! Nothing is written unless every step before synthesis succeeds.
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing, validation, naming and hashing
//! - [`topology`]: Per-service topology records
//! - [`k8s`]: Kubernetes object model
//! - [`chart`]: Service and monitoring chart emission
//! - [`monitoring`]: Grafana dashboard and alert assembly
//! - [`synth`]: Output tree rendering and writing
//! - [`generator`]: End-to-end pipeline
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```json
//! {
//!   "application_config_subdir": "config/sequencer/presets/app_configs",
//!   "services": [
//!     {
//!       "name": "Core",
//!       "controller": "StatefulSet",
//!       "config_paths": ["base_app_config.json", "core.json"],
//!       "replicas": 1,
//!       "storage": 500,
//!       "toleration": "apollo-core-service",
//!       "resources": {
//!         "requests": {"cpu": 2, "memory": 4},
//!         "limits": {"cpu": 7, "memory": 14}
//!       }
//!     }
//!   ]
//! }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod k8s;
pub mod monitoring;
pub mod synth;
pub mod topology;

// ============================================================================
// Re-exports
// ============================================================================

pub use chart::{Chart, ChartEmitter};
pub use cli::{Cli, OutputFormatter};
pub use config::{ConfigHasher, ConfigParser, ConfigValidator, DeploymentConfig};
pub use error::{DeployError, Result};
pub use generator::{GenerateOptions, Generator, MonitoringOptions};
pub use monitoring::{DashboardAssembler, DashboardDefinition};
pub use synth::{App, SynthesisReport};
pub use topology::{ServiceTopology, TopologyBuilder};
