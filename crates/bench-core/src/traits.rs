//! Core traits for inferbench components
//!
//! These traits define the interfaces for container lifecycle management and
//! for driving the inference endpoint. They are implemented by the adapter
//! crates (Docker CLI, Ollama HTTP API) and by the mock adapters used in
//! tests, so the orchestration logic never depends on a concrete backend.

use crate::{AcceleratorGroup, ContainerHandle, MetricSample, ModelSpec, Result};
use async_trait::async_trait;

/// Trait for managing one serving container per model iteration
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Launch a serving container bound to the group's devices, publishing
    /// the given port.
    ///
    /// Returns as soon as the runtime accepts the request; readiness is
    /// gated separately by polling is_running. Signals Unavailable when the
    /// runtime cannot be reached and AlreadyExists on a name collision.
    async fn start(
        &self,
        model: &ModelSpec,
        group: &AcceleratorGroup,
        port: u16,
    ) -> Result<ContainerHandle>;

    /// Point-in-time query of the container's running state
    async fn is_running(&self, handle: &ContainerHandle) -> Result<bool>;

    /// Trigger the model load inside the container.
    ///
    /// The load command's output is classified; accelerator memory
    /// exhaustion surfaces as ResourceExhausted, every other failure as
    /// Runtime.
    async fn load_model(&self, handle: &ContainerHandle, model: &ModelSpec) -> Result<()>;

    /// Stop the container. Idempotent; stopping an already-exited container
    /// is not an error worth failing a run over.
    async fn stop(&self, handle: &ContainerHandle) -> Result<()>;

    /// Remove the container. Idempotent, like stop.
    async fn remove(&self, handle: &ContainerHandle) -> Result<()>;
}

/// Trait for driving a model-serving endpoint
///
/// Every operation is independently fallible and non-retrying; the caller
/// decides what a failure means (a dropped sample, a skipped model, or a
/// best-effort cleanup step).
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Ask the endpoint to fetch the model's weights
    async fn pull(&self, model: &ModelSpec) -> Result<()>;

    /// Issue one synchronous, non-streaming completion and collect its
    /// metrics
    async fn generate(&self, model: &ModelSpec, prompt: &str) -> Result<MetricSample>;

    /// Force the endpoint to evict the model from memory (the keep-alive
    /// zero override; response content is ignored)
    async fn unload(&self, model: &ModelSpec) -> Result<()>;

    /// Names of the models currently loaded on the endpoint
    async fn status(&self) -> Result<Vec<String>>;

    /// Remove the model's weights from the endpoint's store
    async fn delete(&self, model: &ModelSpec) -> Result<()>;
}
