//! Ollama API client
//!
//! Thin adapter over the endpoint's JSON API. Durations in generate
//! responses arrive in nanoseconds and are normalized into MetricSample
//! seconds here; the token rate is derived, never endpoint-reported.

use crate::config::ClientConfig;
use bench_core::{Error, InferenceClient, MetricSample, ModelSpec, Result};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Client for the Ollama HTTP API
pub struct OllamaClient {
    config: ClientConfig,
    client: Client,
}

/// Generate request body.
///
/// Benchmark calls carry a prompt and no keep_alive; the unload call carries
/// keep_alive 0 and no prompt.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<u64>,
}

/// Generate response body; durations are nanoseconds
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    total_duration: u64,
    #[serde(default)]
    load_duration: u64,
    #[serde(default)]
    prompt_eval_duration: u64,
    #[serde(default)]
    eval_duration: u64,
    #[serde(default)]
    eval_count: u64,
    #[serde(default)]
    response: String,
}

/// Pull request body. stream false makes the endpoint answer only once the
/// pull has completed, so a 200 means the weights are present.
#[derive(Debug, Serialize)]
struct PullRequest {
    name: String,
    stream: bool,
}

/// Delete request body
#[derive(Debug, Serialize)]
struct DeleteRequest {
    name: String,
}

/// Status (ps) response body
#[derive(Debug, Deserialize)]
struct PsResponse {
    #[serde(default)]
    models: Vec<PsModel>,
}

/// One loaded model entry in the status response
#[derive(Debug, Deserialize)]
struct PsModel {
    name: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        debug!("Creating Ollama client for endpoint: {}", config.endpoint);

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.config.endpoint.as_str().trim_end_matches('/'),
            path
        )
    }

    async fn generate_raw(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = self.url("/api/generate");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::network(format!("generate request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::invalid_response(format!(
                "generate returned {} for model {}",
                response.status(),
                request.model
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::invalid_response(format!("invalid generate response: {}", e)))
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    async fn pull(&self, model: &ModelSpec) -> Result<()> {
        let url = self.url("/api/pull");
        info!("Pulling model {}", model);

        let request = PullRequest {
            name: model.as_str().to_string(),
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::network(format!("pull request failed for {}: {}", model, e)))?;

        if !response.status().is_success() {
            return Err(Error::invalid_response(format!(
                "pull returned {} for model {}",
                response.status(),
                model
            )));
        }

        info!("Model {} pulled successfully", model);
        Ok(())
    }

    async fn generate(&self, model: &ModelSpec, prompt: &str) -> Result<MetricSample> {
        debug!("Generate call for model {}", model);

        let request = GenerateRequest {
            model: model.as_str().to_string(),
            prompt: Some(prompt.to_string()),
            stream: false,
            keep_alive: None,
        };

        let body = self.generate_raw(&request).await?;

        Ok(MetricSample::from_nanos(
            body.total_duration,
            body.load_duration,
            body.prompt_eval_duration,
            body.eval_duration,
            body.eval_count,
            body.response,
        ))
    }

    async fn unload(&self, model: &ModelSpec) -> Result<()> {
        debug!("Unloading model {} from memory", model);

        // keep_alive 0 evicts the model; the response content is irrelevant.
        let request = GenerateRequest {
            model: model.as_str().to_string(),
            prompt: None,
            stream: false,
            keep_alive: Some(0),
        };

        self.generate_raw(&request).await?;

        info!("Model {} unloaded from memory", model);
        Ok(())
    }

    async fn status(&self) -> Result<Vec<String>> {
        let url = self.url("/api/ps");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::network(format!("status request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::invalid_response(format!(
                "status returned {}",
                response.status()
            )));
        }

        let body: PsResponse = response
            .json()
            .await
            .map_err(|e| Error::invalid_response(format!("invalid status response: {}", e)))?;

        Ok(body.models.into_iter().map(|m| m.name).collect())
    }

    async fn delete(&self, model: &ModelSpec) -> Result<()> {
        let url = self.url("/api/delete");
        debug!("Deleting model {}", model);

        let request = DeleteRequest {
            name: model.as_str().to_string(),
        };

        let response = self
            .client
            .delete(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::network(format!("delete request failed for {}: {}", model, e)))?;

        if !response.status().is_success() {
            return Err(Error::invalid_response(format!(
                "delete returned {} for model {}",
                response.status(),
                model
            )));
        }

        info!("Model {} deleted", model);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_request_shape() {
        let request = GenerateRequest {
            model: "llama3.1:8b".to_string(),
            prompt: Some("Count to ten.".to_string()),
            stream: false,
            keep_alive: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "llama3.1:8b");
        assert_eq!(value["prompt"], "Count to ten.");
        assert_eq!(value["stream"], false);
        assert!(value.get("keep_alive").is_none());
    }

    #[test]
    fn test_unload_request_shape() {
        let request = GenerateRequest {
            model: "llama3.1:8b".to_string(),
            prompt: None,
            stream: false,
            keep_alive: Some(0),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["keep_alive"], 0);
        assert!(value.get("prompt").is_none());
    }

    #[test]
    fn test_generate_response_parsing() {
        let raw = r#"{
            "model": "llama3.1:8b",
            "created_at": "2024-09-20T14:31:06Z",
            "response": "Paris.",
            "done": true,
            "total_duration": 2500000000,
            "load_duration": 1000000000,
            "prompt_eval_count": 12,
            "prompt_eval_duration": 250000000,
            "eval_count": 100,
            "eval_duration": 2000000000
        }"#;

        let body: GenerateResponse = serde_json::from_str(raw).unwrap();
        let sample = MetricSample::from_nanos(
            body.total_duration,
            body.load_duration,
            body.prompt_eval_duration,
            body.eval_duration,
            body.eval_count,
            body.response,
        );

        assert_eq!(sample.total_duration, 2.5);
        assert_eq!(sample.load_duration, 1.0);
        assert_eq!(sample.eval_duration, 2.0);
        assert_eq!(sample.tokens_per_second, 50.0);
        assert_eq!(sample.response, "Paris.");
    }

    #[test]
    fn test_generate_response_missing_fields_default() {
        let body: GenerateResponse = serde_json::from_str(r#"{"done": true}"#).unwrap();
        assert_eq!(body.total_duration, 0);
        assert_eq!(body.eval_count, 0);
        assert_eq!(body.response, "");
    }

    #[test]
    fn test_ps_response_parsing() {
        let raw = r#"{"models": [{"name": "llama3.1:8b", "size": 4661224676}]}"#;
        let body: PsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(body.models.len(), 1);
        assert_eq!(body.models[0].name, "llama3.1:8b");

        let empty: PsResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(empty.models.is_empty());
    }

    #[test]
    fn test_url_joining() {
        let client = OllamaClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.url("/api/generate"), "http://localhost:11434/api/generate");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let config = ClientConfig::default()
            .with_endpoint("http://127.0.0.1:1")
            .unwrap();
        let client = OllamaClient::new(config).unwrap();

        let err = client.status().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
