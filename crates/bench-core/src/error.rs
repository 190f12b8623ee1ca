//! Error handling for inferbench
//!
//! Provides a unified error type and result type for use across all inferbench
//! components.

/// Result type alias for inferbench operations
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for inferbench
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    InvalidConfiguration(String),

    /// Network-related errors (endpoint unreachable, request failed)
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success status or an unusable body
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Resource already exists (e.g. container name collision)
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// Container runtime unreachable or not operational
    #[error("Runtime unavailable: {0}")]
    Unavailable(String),

    /// Accelerator memory exhausted during model load
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Container runtime command failures other than the above
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Operation timeout (only produced when a poll deadline is configured)
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration parsing errors
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an already exists error
    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a resource exhausted error
    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    /// Create a runtime error
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Network(_)
                | Error::InvalidResponse(_)
                | Error::Unavailable(_)
                | Error::Timeout(_)
        )
    }

    /// Check if this error signals accelerator memory exhaustion.
    ///
    /// This is the only failure class that abandons the remaining models of
    /// an accelerator group; everything else fails a single model iteration.
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(self, Error::ResourceExhausted(_))
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::InvalidConfiguration(_) => "configuration",
            Error::Network(_) => "network",
            Error::InvalidResponse(_) => "invalid_response",
            Error::NotFound(_) => "not_found",
            Error::AlreadyExists(_) => "already_exists",
            Error::Unavailable(_) => "unavailable",
            Error::ResourceExhausted(_) => "resource_exhausted",
            Error::Runtime(_) => "runtime",
            Error::Timeout(_) => "timeout",
            Error::Serialization(_) => "serialization",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Yaml(_) => "yaml",
            Error::Config(_) => "config",
            Error::Other(_) => "other",
        }
    }
}

/// Extension trait for adding context to Results
pub trait ErrorContext<T> {
    /// Add context to an error
    fn with_context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure
    fn with_context_fn<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn with_context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let original_error = e.into();
            Error::Other(anyhow::anyhow!("{}: {}", context.into(), original_error))
        })
    }

    fn with_context_fn<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let original_error = e.into();
            Error::Other(anyhow::anyhow!("{}: {}", f(), original_error))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("invalid setting");
        assert!(matches!(err, Error::InvalidConfiguration(_)));
        assert_eq!(err.to_string(), "Configuration error: invalid setting");
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(Error::config("test").category(), "configuration");
        assert_eq!(Error::network("test").category(), "network");
        assert_eq!(Error::resource_exhausted("test").category(), "resource_exhausted");
    }

    #[test]
    fn test_error_classification() {
        let oom = Error::resource_exhausted("CUDA out of memory");
        assert!(oom.is_resource_exhaustion());
        assert!(!oom.is_retryable());

        let network = Error::network("connection refused");
        assert!(!network.is_resource_exhaustion());
        assert!(network.is_retryable());

        let runtime = Error::runtime("docker exec failed");
        assert!(!runtime.is_resource_exhaustion());
        assert!(!runtime.is_retryable());
    }

    #[test]
    fn test_error_context() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"));

        let err = result.with_context("failed to read prompt file").unwrap_err();

        assert!(matches!(err, Error::Other(_)));
        assert!(err.to_string().contains("failed to read prompt file"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_context_fn() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "original error"));

        let err = result
            .with_context_fn(|| format!("report write failed at {}", "location"))
            .unwrap_err();

        assert!(err.to_string().contains("report write failed at location"));
        assert!(err.to_string().contains("original error"));
    }
}
