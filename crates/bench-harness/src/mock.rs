//! Mock runtime and client for orchestration tests.
//!
//! Scripted stand-ins for the container runtime and the inference endpoint.
//! Every call is recorded, and per-model behavior can be scripted, so tests
//! can pin down the control flow: which models started where, how often a
//! container was torn down, when the skip state engages.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use bench_core::{
    AcceleratorGroup, ContainerHandle, ContainerRuntime, Error, InferenceClient, MetricSample,
    ModelSpec, Result,
};
use tokio::sync::RwLock;

/// A canned metric sample with the given token count and eval duration.
pub fn sample(eval_count: u64, eval_duration_secs: f64) -> MetricSample {
    let eval_ns = (eval_duration_secs * 1_000_000_000.0) as u64;
    MetricSample::from_nanos(
        eval_ns + 500_000_000,
        100_000_000,
        200_000_000,
        eval_ns,
        eval_count,
        "mock response".to_string(),
    )
}

/// Scripted behavior for one model's load step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadBehavior {
    Succeed,
    /// Fail the load with a resource-exhaustion error.
    ExhaustMemory,
    /// Fail the load with an ordinary runtime error.
    Fail,
}

#[derive(Debug, Default)]
struct MockRuntimeState {
    start_failures: HashSet<String>,
    load_behavior: HashMap<String, LoadBehavior>,
    load_behavior_on: HashMap<(String, String), LoadBehavior>,
    starts: Vec<(String, String)>,
    stops: Vec<String>,
    removes: Vec<String>,
    running: bool,
}

/// Mock container runtime with scripted failures and call recording.
#[derive(Debug, Clone)]
pub struct MockRuntime {
    inner: Arc<RwLock<MockRuntimeState>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MockRuntimeState {
                running: true,
                ..Default::default()
            })),
        }
    }

    /// Make `start` fail for the given model.
    pub async fn script_start_failure(&self, model: &ModelSpec) {
        let mut state = self.inner.write().await;
        state.start_failures.insert(model.as_str().to_string());
    }

    /// Script the load outcome for a model on every group.
    pub async fn script_load(&self, model: &ModelSpec, behavior: LoadBehavior) {
        let mut state = self.inner.write().await;
        state
            .load_behavior
            .insert(model.as_str().to_string(), behavior);
    }

    /// Script the load outcome for a model on one specific group only.
    pub async fn script_load_on(
        &self,
        model: &ModelSpec,
        group: &AcceleratorGroup,
        behavior: LoadBehavior,
    ) {
        let mut state = self.inner.write().await;
        state.load_behavior_on.insert(
            (model.as_str().to_string(), group.device_string()),
            behavior,
        );
    }

    /// Set the answer `is_running` gives for every container.
    pub async fn set_running(&self, running: bool) {
        self.inner.write().await.running = running;
    }

    /// Number of `start` calls seen for a model, across all groups.
    pub async fn start_count(&self, model: &ModelSpec) -> usize {
        let state = self.inner.read().await;
        state
            .starts
            .iter()
            .filter(|(m, _)| m == model.as_str())
            .count()
    }

    /// Number of `start` calls seen for a model on one group.
    pub async fn start_count_on(&self, model: &ModelSpec, group: &AcceleratorGroup) -> usize {
        let state = self.inner.read().await;
        let devices = group.device_string();
        state
            .starts
            .iter()
            .filter(|(m, g)| m == model.as_str() && *g == devices)
            .count()
    }

    /// Number of `stop` calls seen for a container name.
    pub async fn stop_count(&self, name: &str) -> usize {
        let state = self.inner.read().await;
        state.stops.iter().filter(|n| n.as_str() == name).count()
    }

    /// Number of `remove` calls seen for a container name.
    pub async fn remove_count(&self, name: &str) -> usize {
        let state = self.inner.read().await;
        state.removes.iter().filter(|n| n.as_str() == name).count()
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn start(
        &self,
        model: &ModelSpec,
        group: &AcceleratorGroup,
        port: u16,
    ) -> Result<ContainerHandle> {
        let mut state = self.inner.write().await;
        if state.start_failures.contains(model.as_str()) {
            return Err(Error::unavailable(format!(
                "scripted start failure for {}",
                model
            )));
        }
        state
            .starts
            .push((model.as_str().to_string(), group.device_string()));
        Ok(ContainerHandle::new(model, group.clone(), port))
    }

    async fn is_running(&self, _handle: &ContainerHandle) -> Result<bool> {
        Ok(self.inner.read().await.running)
    }

    async fn load_model(&self, handle: &ContainerHandle, model: &ModelSpec) -> Result<()> {
        let state = self.inner.read().await;
        let key = (model.as_str().to_string(), handle.group.device_string());
        let behavior = state
            .load_behavior_on
            .get(&key)
            .or_else(|| state.load_behavior.get(model.as_str()))
            .copied()
            .unwrap_or(LoadBehavior::Succeed);
        match behavior {
            LoadBehavior::Succeed => Ok(()),
            LoadBehavior::ExhaustMemory => Err(Error::resource_exhausted(format!(
                "CUDA out of memory while loading {}",
                model
            ))),
            LoadBehavior::Fail => Err(Error::runtime(format!(
                "scripted load failure for {}",
                model
            ))),
        }
    }

    async fn stop(&self, handle: &ContainerHandle) -> Result<()> {
        let mut state = self.inner.write().await;
        state.stops.push(handle.name.clone());
        Ok(())
    }

    async fn remove(&self, handle: &ContainerHandle) -> Result<()> {
        let mut state = self.inner.write().await;
        state.removes.push(handle.name.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MockClientState {
    pull_failures: HashSet<String>,
    generate_scripts: HashMap<String, VecDeque<Option<MetricSample>>>,
    loaded: Vec<String>,
    pulls: Vec<String>,
    generates: Vec<(String, String)>,
    unloads: Vec<String>,
    deletes: Vec<String>,
}

/// Mock inference client with scripted generate outcomes.
///
/// By default `status` reports one loaded model, so readiness polls pass on
/// the first check, and `generate` answers with a canned sample.
#[derive(Debug, Clone)]
pub struct MockClient {
    inner: Arc<RwLock<MockClientState>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MockClientState {
                loaded: vec!["mock-model".to_string()],
                ..Default::default()
            })),
        }
    }

    /// Make `pull` fail for the given model.
    pub async fn script_pull_failure(&self, model: &ModelSpec) {
        let mut state = self.inner.write().await;
        state.pull_failures.insert(model.as_str().to_string());
    }

    /// Script per-call generate outcomes for a model, consumed in order.
    /// `None` entries fail the call; once the script runs out, calls succeed
    /// with the canned sample again.
    pub async fn script_generate(&self, model: &ModelSpec, outcomes: Vec<Option<MetricSample>>) {
        let mut state = self.inner.write().await;
        state
            .generate_scripts
            .insert(model.as_str().to_string(), outcomes.into());
    }

    /// Set the model names `status` reports as loaded.
    pub async fn set_loaded(&self, models: Vec<String>) {
        self.inner.write().await.loaded = models;
    }

    pub async fn pull_count(&self, model: &ModelSpec) -> usize {
        let state = self.inner.read().await;
        state
            .pulls
            .iter()
            .filter(|m| m.as_str() == model.as_str())
            .count()
    }

    pub async fn generate_count(&self, model: &ModelSpec) -> usize {
        let state = self.inner.read().await;
        state
            .generates
            .iter()
            .filter(|(m, _)| m == model.as_str())
            .count()
    }

    pub async fn unload_count(&self, model: &ModelSpec) -> usize {
        let state = self.inner.read().await;
        state
            .unloads
            .iter()
            .filter(|m| m.as_str() == model.as_str())
            .count()
    }

    pub async fn delete_count(&self, model: &ModelSpec) -> usize {
        let state = self.inner.read().await;
        state
            .deletes
            .iter()
            .filter(|m| m.as_str() == model.as_str())
            .count()
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceClient for MockClient {
    async fn pull(&self, model: &ModelSpec) -> Result<()> {
        let mut state = self.inner.write().await;
        state.pulls.push(model.as_str().to_string());
        if state.pull_failures.contains(model.as_str()) {
            return Err(Error::network(format!("scripted pull failure for {}", model)));
        }
        Ok(())
    }

    async fn generate(&self, model: &ModelSpec, prompt: &str) -> Result<MetricSample> {
        let mut state = self.inner.write().await;
        state
            .generates
            .push((model.as_str().to_string(), prompt.to_string()));
        let scripted = state
            .generate_scripts
            .get_mut(model.as_str())
            .and_then(|script| script.pop_front());
        match scripted {
            Some(Some(sample)) => Ok(sample),
            Some(None) => Err(Error::network(format!(
                "scripted generate failure for {}",
                model
            ))),
            None => Ok(sample(50, 1.0)),
        }
    }

    async fn unload(&self, model: &ModelSpec) -> Result<()> {
        let mut state = self.inner.write().await;
        state.unloads.push(model.as_str().to_string());
        Ok(())
    }

    async fn status(&self) -> Result<Vec<String>> {
        Ok(self.inner.read().await.loaded.clone())
    }

    async fn delete(&self, model: &ModelSpec) -> Result<()> {
        let mut state = self.inner.write().await;
        state.deletes.push(model.as_str().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_load_behavior() {
        let runtime = MockRuntime::new();
        let model = ModelSpec::new("llama3.1:70b");
        runtime.script_load(&model, LoadBehavior::ExhaustMemory).await;

        let group = AcceleratorGroup::new(vec![0]);
        let handle = runtime.start(&model, &group, 11434).await.unwrap();
        let err = runtime.load_model(&handle, &model).await.unwrap_err();

        assert!(err.is_resource_exhaustion());
        assert_eq!(runtime.start_count(&model).await, 1);
    }

    #[tokio::test]
    async fn test_group_scoped_load_behavior_wins() {
        let runtime = MockRuntime::new();
        let model = ModelSpec::new("llama3.1:70b");
        let bad = AcceleratorGroup::new(vec![0]);
        let good = AcceleratorGroup::new(vec![1]);
        runtime
            .script_load_on(&model, &bad, LoadBehavior::ExhaustMemory)
            .await;

        let on_bad = runtime.start(&model, &bad, 11434).await.unwrap();
        let on_good = runtime.start(&model, &good, 11434).await.unwrap();

        assert!(runtime.load_model(&on_bad, &model).await.is_err());
        assert!(runtime.load_model(&on_good, &model).await.is_ok());
    }

    #[tokio::test]
    async fn test_generate_script_consumed_in_order() {
        let client = MockClient::new();
        let model = ModelSpec::new("llama3.1:8b");
        client
            .script_generate(&model, vec![None, Some(sample(10, 1.0))])
            .await;

        assert!(client.generate(&model, "p").await.is_err());
        assert_eq!(client.generate(&model, "p").await.unwrap().eval_count, 10);
        // Script exhausted; back to the canned sample.
        assert_eq!(client.generate(&model, "p").await.unwrap().eval_count, 50);
        assert_eq!(client.generate_count(&model).await, 3);
    }
}
