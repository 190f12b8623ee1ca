//! Readiness polling for containers and models.
//!
//! Two gates stand between starting a serving container and benchmarking it:
//! the container has to report a running state, and the endpoint has to report
//! a loaded model. Both are fixed-interval polls governed by a [`PollPolicy`].

use std::future::Future;
use std::time::Duration;

use bench_core::{ContainerHandle, ContainerRuntime, Error, InferenceClient, ModelSpec, Result};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// Retry policy for a single readiness poll loop.
///
/// The default carries no deadline, so a condition that never becomes true
/// is polled indefinitely. Callers that want a bound set one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fixed interval between consecutive checks.
    pub interval: Duration,
    /// Upper bound on total waiting time, measured from the first check.
    pub deadline: Option<Duration>,
}

impl PollPolicy {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Polls the container runtime and the inference endpoint until each side
/// is ready for the benchmark battery.
pub struct ReadinessPoller {
    container_policy: PollPolicy,
    model_policy: PollPolicy,
}

impl ReadinessPoller {
    pub fn new(container_policy: PollPolicy, model_policy: PollPolicy) -> Self {
        Self {
            container_policy,
            model_policy,
        }
    }

    /// Waits until the runtime reports the container as running.
    ///
    /// Runtime errors while checking count as "not yet running" and the loop
    /// keeps polling; only an expired deadline surfaces as an error.
    pub async fn wait_for_container(
        &self,
        runtime: &dyn ContainerRuntime,
        handle: &ContainerHandle,
    ) -> Result<()> {
        debug!("Waiting for container {} to report running", handle.name);
        let what = format!("container {}", handle.name);
        wait_until(&self.container_policy, &what, move || async move {
            matches!(runtime.is_running(handle).await, Ok(true))
        })
        .await?;
        info!("Container {} is running", handle.name);
        Ok(())
    }

    /// Waits until the endpoint reports at least one loaded model.
    pub async fn wait_for_model(
        &self,
        client: &dyn InferenceClient,
        model: &ModelSpec,
    ) -> Result<()> {
        debug!("Waiting for model {} to become accessible", model);
        let what = format!("model {}", model);
        wait_until(&self.model_policy, &what, move || async move {
            match client.status().await {
                Ok(models) => !models.is_empty(),
                Err(e) => {
                    debug!("Status check not ready yet: {}", e);
                    false
                }
            }
        })
        .await?;
        info!("Model {} is accessible", model);
        Ok(())
    }
}

/// Runs `check` until it returns true, sleeping `policy.interval` between
/// attempts. The first check happens immediately.
async fn wait_until<F, Fut>(policy: &PollPolicy, what: &str, mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let started = Instant::now();
    loop {
        if check().await {
            return Ok(());
        }
        if let Some(deadline) = policy.deadline {
            if started.elapsed() >= deadline {
                return Err(Error::timeout(format!(
                    "{} not ready within {:?}",
                    what, deadline
                )));
            }
        }
        sleep(policy.interval).await;
    }
}
