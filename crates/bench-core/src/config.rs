//! Configuration management for inferbench
//!
//! Provides a layered configuration system: built-in defaults, then an
//! optional YAML file, then environment-variable overrides.

use crate::{AcceleratorGroup, Error, ModelSpec, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Main configuration structure for an inferbench run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Path to the YAML prompt list
    pub test_file: PathBuf,

    /// Repetitions per prompt; failed calls are dropped from the average
    pub test_runs: u32,

    /// Models to benchmark, in ascending resource size
    pub model_list: Vec<ModelSpec>,

    /// Accelerator device groups, each walked through the model list
    /// independently
    pub gpu_id_lists: Vec<AcceleratorGroup>,

    /// Serving container and endpoint settings
    pub server: ServerConfig,

    /// Readiness polling settings
    pub polling: PollingConfig,

    /// Directory for per-prompt report files
    pub report_dir: PathBuf,
}

impl BenchConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest)
    /// 2. Configuration file
    /// 3. Defaults (lowest)
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder();

        // Start with defaults
        builder = builder.add_source(config::Config::try_from(&Self::default())?);

        // Add configuration file if it exists
        if let Ok(config_path) = std::env::var("INFERBENCH_CONFIG") {
            builder = builder.add_source(config::File::with_name(&config_path).required(false));
        } else {
            for path in &["./inferbench.yaml", "/etc/inferbench/config.yaml"] {
                builder = builder.add_source(config::File::with_name(path).required(false));
            }
        }

        // Add environment variables with INFERBENCH_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("INFERBENCH")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let parsed: Self = config.try_deserialize()?;

        parsed.validate()?;

        Ok(parsed)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::from(path));

        let config = builder.build()?;
        let parsed: Self = config.try_deserialize()?;
        parsed.validate()?;

        Ok(parsed)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.test_runs == 0 {
            return Err(Error::config("test_runs must be >= 1"));
        }

        if self.model_list.is_empty() {
            return Err(Error::config("model_list cannot be empty"));
        }

        if self.gpu_id_lists.is_empty() {
            return Err(Error::config("gpu_id_lists cannot be empty"));
        }

        if let Some(group) = self.gpu_id_lists.iter().find(|g| g.is_empty()) {
            return Err(Error::config(format!(
                "gpu_id_lists contains an empty group ({:?})",
                group
            )));
        }

        self.server.validate()?;
        self.polling.validate()?;

        Ok(())
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            test_file: PathBuf::from("test_prompts.yaml"),
            test_runs: 3,
            model_list: Vec::new(),
            gpu_id_lists: Vec::new(),
            server: ServerConfig::default(),
            polling: PollingConfig::default(),
            report_dir: PathBuf::from("./logs"),
        }
    }
}

/// Serving container and endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Serving container image
    pub image: String,

    /// Host the published port is reachable on
    pub host: String,

    /// Port the container publishes; also the endpoint port
    pub port: u16,

    /// Request timeout for generate calls, in seconds. Generation can be
    /// slow on large models, so this is generous by default.
    pub request_timeout_seconds: u64,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.image.is_empty() {
            return Err(Error::config("server.image cannot be empty"));
        }

        if self.host.is_empty() {
            return Err(Error::config("server.host cannot be empty"));
        }

        if self.port == 0 {
            return Err(Error::config("server.port must be > 0"));
        }

        Ok(())
    }

    /// The inference endpoint base URL
    pub fn endpoint(&self) -> Result<Url> {
        let raw = format!("http://{}:{}", self.host, self.port);
        Url::parse(&raw)
            .map_err(|e| Error::config(format!("invalid endpoint {}: {}", raw, e)))
    }

    /// Request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            image: "ollama/ollama".to_string(),
            host: "localhost".to_string(),
            port: 11434,
            request_timeout_seconds: 600,
        }
    }
}

/// Readiness polling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Interval between container-running checks, in seconds
    pub container_interval_seconds: u64,

    /// Interval between model-loaded checks, in seconds
    pub model_interval_seconds: u64,

    /// Optional upper bound on each poll loop, in seconds. None polls
    /// forever, matching the historical behavior.
    pub deadline_seconds: Option<u64>,
}

impl PollingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.container_interval_seconds == 0 {
            return Err(Error::config("polling.container_interval_seconds must be >= 1"));
        }

        if self.model_interval_seconds == 0 {
            return Err(Error::config("polling.model_interval_seconds must be >= 1"));
        }

        if self.deadline_seconds == Some(0) {
            return Err(Error::config("polling.deadline_seconds must be > 0 when set"));
        }

        Ok(())
    }

    /// Interval between container-running checks
    pub fn container_interval(&self) -> Duration {
        Duration::from_secs(self.container_interval_seconds)
    }

    /// Interval between model-loaded checks
    pub fn model_interval(&self) -> Duration {
        Duration::from_secs(self.model_interval_seconds)
    }

    /// Optional poll deadline
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_seconds.map(Duration::from_secs)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            container_interval_seconds: 1,
            model_interval_seconds: 5,
            deadline_seconds: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> BenchConfig {
        BenchConfig {
            model_list: vec![ModelSpec::new("llama3.1:8b")],
            gpu_id_lists: vec![AcceleratorGroup::new(vec![0])],
            ..BenchConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = BenchConfig::default();
        assert_eq!(config.test_runs, 3);
        assert_eq!(config.server.image, "ollama/ollama");
        assert_eq!(config.server.port, 11434);
        assert_eq!(config.polling.container_interval_seconds, 1);
        assert_eq!(config.polling.model_interval_seconds, 5);
        assert_eq!(config.polling.deadline_seconds, None);
    }

    #[test]
    fn test_default_config_requires_models() {
        // The built-in defaults carry no models or groups, so a run cannot
        // start without a user-supplied configuration.
        let err = BenchConfig::default().validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_zero_test_runs_rejected() {
        let mut config = valid_config();
        config.test_runs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_no_groups_rejected() {
        let mut config = valid_config();
        config.gpu_id_lists.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_group_rejected() {
        let mut config = valid_config();
        config.gpu_id_lists.push(AcceleratorGroup::new(vec![]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut config = valid_config();
        config.polling.container_interval_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_url() {
        let server = ServerConfig::default();
        let endpoint = server.endpoint().unwrap();
        assert_eq!(endpoint.as_str(), "http://localhost:11434/");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        writeln!(file, "test_file: prompts.yaml").unwrap();
        writeln!(file, "test_runs: 5").unwrap();
        writeln!(file, "model_list:").unwrap();
        writeln!(file, "  - llama3.1:8b-instruct-q4_0").unwrap();
        writeln!(file, "  - llama3.1:8b-instruct-q8_0").unwrap();
        writeln!(file, "gpu_id_lists:").unwrap();
        writeln!(file, "  - [0]").unwrap();
        writeln!(file, "  - [0, 1]").unwrap();
        writeln!(file, "server:").unwrap();
        writeln!(file, "  port: 11435").unwrap();

        let config = BenchConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.test_runs, 5);
        assert_eq!(config.model_list.len(), 2);
        assert_eq!(config.gpu_id_lists[1].ids(), &[0, 1]);
        // File overrides the default port; the rest of the server section
        // keeps its defaults.
        assert_eq!(config.server.port, 11435);
        assert_eq!(config.server.image, "ollama/ollama");
    }
}
