//! Configuration for the Docker runtime adapter

use bench_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the Docker CLI backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// The runtime CLI binary to invoke
    pub binary: String,

    /// Serving container image to run
    pub image: String,
}

impl RuntimeConfig {
    /// Create a runtime configuration for the given image
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }

    /// Set the runtime CLI binary
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set the serving container image
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.binary.is_empty() {
            return Err(Error::config("runtime binary cannot be empty"));
        }

        if self.image.is_empty() {
            return Err(Error::config("runtime image cannot be empty"));
        }

        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            image: "ollama/ollama".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.binary, "docker");
        assert_eq!(config.image, "ollama/ollama");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = RuntimeConfig::new("ollama/ollama:0.3.12").with_binary("podman");
        assert_eq!(config.binary, "podman");
        assert_eq!(config.image, "ollama/ollama:0.3.12");
    }

    #[test]
    fn test_validation() {
        let config = RuntimeConfig::default().with_image("");
        assert!(config.validate().is_err());

        let config = RuntimeConfig::default().with_binary("");
        assert!(config.validate().is_err());
    }
}
