//! Configuration parser for loading and merging configuration files.
//!
//! Deployment configurations and dashboard definitions can be written in
//! JSON or YAML; the format is picked from the file extension. Application
//! config files are JSON objects merged in declaration order.

use crate::error::{ConfigError, DeployError, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::DeploymentConfig;

/// Input document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl DocumentFormat {
    /// Picks the format from a file extension; anything but `.yaml`/`.yml` is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Configuration parser for loading deployment configuration.
#[derive(Debug, Default)]
pub struct ConfigParser;

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Loads a deployment configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<DeploymentConfig> {
        let path = path.as_ref();
        info!("Loading deployment configuration from: {}", path.display());

        let config: DeploymentConfig = self.load_document(path)?;

        debug!(
            "Parsed {} service(s), application config subdir: {}",
            config.services.len(),
            config.application_config_subdir
        );
        Ok(config)
    }

    /// Loads any deserializable document from a JSON or YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or malformed.
    pub fn load_document<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> Result<T> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(DeployError::Config(ConfigError::FileNotFound { path }));
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            ConfigError::parse(
                format!("Failed to read file: {e}"),
                Some(path.display().to_string()),
            )
        })?;

        Self::parse_str(&content, DocumentFormat::from_path(&path), Some(&path))
    }

    /// Parses a document from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid for the given format.
    pub fn parse_str<T: DeserializeOwned>(
        content: &str,
        format: DocumentFormat,
        source: Option<&Path>,
    ) -> Result<T> {
        let location = || source.map(|p| p.display().to_string());

        let parsed = match format {
            DocumentFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::parse(format!("JSON parse error: {e}"), location())),
            DocumentFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| ConfigError::parse(format!("YAML parse error: {e}"), location())),
        }?;

        Ok(parsed)
    }

    /// Loads and merges a service's application config files.
    ///
    /// Each file under `subdir` must hold a JSON object. Later files override
    /// keys of earlier ones; nested values are replaced, not merged.
    ///
    /// # Errors
    ///
    /// Returns an error if a file is missing, malformed, or not an object.
    pub fn load_application_config(
        &self,
        subdir: &str,
        config_paths: &[String],
    ) -> Result<serde_json::Value> {
        let mut merged = serde_json::Map::new();

        for config_path in config_paths {
            let path = Path::new(subdir).join(config_path);
            debug!("Merging application config: {}", path.display());

            let document: serde_json::Value = self.load_document(&path)?;
            match document {
                serde_json::Value::Object(entries) => merged.extend(entries),
                other => {
                    return Err(DeployError::Config(ConfigError::parse(
                        format!("Application config must be a JSON object, found {other}"),
                        Some(path.display().to_string()),
                    )));
                }
            }
        }

        Ok(serde_json::Value::Object(merged))
    }

    /// Loads `.env` from the working directory if present.
    ///
    /// Runs before logging is set up, so it stays silent and returns the
    /// loaded path for the caller to report.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<Option<PathBuf>> {
        let env_path = PathBuf::from(".env");
        if !env_path.exists() {
            return Ok(None);
        }

        dotenvy::from_path(&env_path).map_err(|e| {
            ConfigError::parse(
                format!("Failed to load .env file: {e}"),
                Some(env_path.display().to_string()),
            )
        })?;
        Ok(Some(env_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_config() {
        let json = r#"{"application_config_subdir": "configs/", "services": []}"#;
        let config: DeploymentConfig =
            ConfigParser::parse_str(json, DocumentFormat::Json, None).unwrap();

        assert_eq!(config.application_config_subdir, "configs/");
        assert!(config.services.is_empty());
    }

    #[test]
    fn test_parse_full_yaml_config() {
        let yaml = r#"
application_config_subdir: crates/apollo_deployments/resources/
chain_id: SN_INTEGRATION
services:
  - name: Core
    controller: StatefulSet
    config_paths: [base_app_config.json, core.json]
    ingress: null
    autoscale: false
    replicas: 1
    storage: 500
    toleration: apollo-core-service
    resources:
      requests: {cpu: 2, memory: 4}
      limits: {cpu: 7, memory: 14}
    external_secret:
      gcsm_key: apollo-integration
  - name: HttpServer
    controller: Deployment
    config_paths: [http_server.json]
    ingress:
      domain: sw-dev.io
      alternative_names: null
      internal: false
      rules:
        - {path: /gateway, port: 8080, backend: null}
    autoscale: true
    replicas: 2
    storage: null
    toleration: null
    resources:
      requests: {cpu: 1, memory: 2}
      limits: {cpu: 2, memory: 4}
    external_secret: null
"#;
        let config: DeploymentConfig =
            ConfigParser::parse_str(yaml, DocumentFormat::Yaml, None).unwrap();

        assert_eq!(config.service_names(), vec!["Core", "HttpServer"]);
        assert_eq!(config.services[0].storage, Some(500));
        assert_eq!(
            config.services[1].ingress.as_ref().map(|i| i.rules.len()),
            Some(1)
        );
        assert_eq!(config.chain_id.as_deref(), Some("SN_INTEGRATION"));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result: Result<DeploymentConfig> =
            ConfigParser::parse_str("{not json", DocumentFormat::Json, None);
        assert!(matches!(
            result,
            Err(DeployError::Config(ConfigError::ParseError { .. }))
        ));
    }

    #[test]
    fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = ConfigParser::new().load_file(temp.path().join("absent.json"));
        assert!(matches!(
            result,
            Err(DeployError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.YML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("config")), DocumentFormat::Json);
    }

    #[test]
    fn test_application_config_merge_order() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("base.json"),
            r#"{"chain_id": "SN_MAIN", "monitoring_endpoint_config.port": 8082}"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("override.json"),
            r#"{"monitoring_endpoint_config.port": 9000}"#,
        )
        .unwrap();

        let subdir = temp.path().display().to_string();
        let merged = ConfigParser::new()
            .load_application_config(
                &subdir,
                &[String::from("base.json"), String::from("override.json")],
            )
            .unwrap();

        assert_eq!(merged["chain_id"], "SN_MAIN");
        assert_eq!(merged["monitoring_endpoint_config.port"], 9000);
    }

    #[test]
    fn test_application_config_must_be_object() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("list.json"), "[1, 2]").unwrap();

        let subdir = temp.path().display().to_string();
        let result = ConfigParser::new()
            .load_application_config(&subdir, &[String::from("list.json")]);
        assert!(matches!(
            result,
            Err(DeployError::Config(ConfigError::ParseError { .. }))
        ));
    }
}
