//! Docker CLI container runtime
//!
//! Every operation is one external process invocation, mirroring the manual
//! workflow: `docker run` with device binding and port publish, `docker
//! inspect` for the running state, `docker exec` for the in-container model
//! load, `docker stop` and `docker rm` for teardown.

use crate::classify::{classify_load_failure, LoadFailure};
use crate::config::RuntimeConfig;
use bench_core::{AcceleratorGroup, ContainerHandle, ContainerRuntime, Error, ModelSpec, Result};

use async_trait::async_trait;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

/// Container runtime backed by the Docker CLI
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    config: RuntimeConfig,
}

impl DockerRuntime {
    /// Create a Docker runtime with the given configuration
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Verify the runtime CLI is reachable and report the daemon version
    pub async fn probe(&self) -> Result<String> {
        let output = self.invoke(&version_args()).await?;

        if !output.status.success() {
            return Err(command_error(
                "runtime probe failed",
                &combined_output(&output),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run one CLI command to completion, capturing its output
    async fn invoke(&self, args: &[String]) -> Result<Output> {
        debug!("{} {}", self.config.binary, args.join(" "));

        Command::new(&self.config.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                Error::unavailable(format!("failed to invoke {}: {}", self.config.binary, e))
            })
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn start(
        &self,
        model: &ModelSpec,
        group: &AcceleratorGroup,
        port: u16,
    ) -> Result<ContainerHandle> {
        let handle = ContainerHandle::new(model, group.clone(), port);
        let output = self.invoke(&run_args(&handle, &self.config.image)).await?;

        if !output.status.success() {
            return Err(command_error(
                &format!("failed to start container {}", handle.name),
                &combined_output(&output),
            ));
        }

        info!(
            "Started container {} for model {} on devices {}",
            handle.name, model, group
        );
        Ok(handle)
    }

    /// A failed inspect means the container does not exist (or is gone
    /// already); for the readiness poll that is simply "not running".
    async fn is_running(&self, handle: &ContainerHandle) -> Result<bool> {
        let output = self.invoke(&inspect_args(handle)).await?;

        if !output.status.success() {
            return Ok(false);
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim() == "true")
    }

    async fn load_model(&self, handle: &ContainerHandle, model: &ModelSpec) -> Result<()> {
        // Runs attached with stdin closed: the in-container CLI loads the
        // model, hits EOF, and exits, leaving any failure text in the
        // captured output for classification.
        let output = self.invoke(&exec_args(handle, model)).await?;

        if !output.status.success() {
            let detail = combined_output(&output);
            let detail = detail.trim();

            return Err(match classify_load_failure(detail) {
                LoadFailure::ResourceExhaustion => Error::resource_exhausted(format!(
                    "loading {} in {}: {}",
                    model, handle.name, detail
                )),
                LoadFailure::Other => {
                    Error::runtime(format!("loading {} in {}: {}", model, handle.name, detail))
                }
            });
        }

        debug!("Model load command finished for {} in {}", model, handle.name);
        Ok(())
    }

    async fn stop(&self, handle: &ContainerHandle) -> Result<()> {
        let output = self.invoke(&stop_args(handle)).await?;

        if !output.status.success() {
            let detail = combined_output(&output);
            if is_missing_container(&detail) {
                debug!("Container {} already gone on stop", handle.name);
                return Ok(());
            }
            return Err(command_error(
                &format!("failed to stop container {}", handle.name),
                &detail,
            ));
        }

        Ok(())
    }

    async fn remove(&self, handle: &ContainerHandle) -> Result<()> {
        let output = self.invoke(&rm_args(handle)).await?;

        if !output.status.success() {
            let detail = combined_output(&output);
            if is_missing_container(&detail) {
                debug!("Container {} already gone on remove", handle.name);
                return Ok(());
            }
            return Err(command_error(
                &format!("failed to remove container {}", handle.name),
                &detail,
            ));
        }

        Ok(())
    }
}

fn version_args() -> Vec<String> {
    vec![
        "version".to_string(),
        "--format".to_string(),
        "{{.Server.Version}}".to_string(),
    ]
}

/// Argv for `docker run` with device binding and port publish
fn run_args(handle: &ContainerHandle, image: &str) -> Vec<String> {
    vec![
        "run".to_string(),
        "-d".to_string(),
        format!("--gpus=device={}", handle.group.device_string()),
        "-p".to_string(),
        format!("{}:{}", handle.port, handle.port),
        "--name".to_string(),
        handle.name.clone(),
        image.to_string(),
    ]
}

/// Argv for the point-in-time running-state query
fn inspect_args(handle: &ContainerHandle) -> Vec<String> {
    vec![
        "inspect".to_string(),
        "-f".to_string(),
        "{{.State.Running}}".to_string(),
        handle.name.clone(),
    ]
}

/// Argv for the attached in-container model load
fn exec_args(handle: &ContainerHandle, model: &ModelSpec) -> Vec<String> {
    vec![
        "exec".to_string(),
        handle.name.clone(),
        "ollama".to_string(),
        "run".to_string(),
        model.as_str().to_string(),
    ]
}

fn stop_args(handle: &ContainerHandle) -> Vec<String> {
    vec!["stop".to_string(), handle.name.clone()]
}

fn rm_args(handle: &ContainerHandle) -> Vec<String> {
    vec!["rm".to_string(), handle.name.clone()]
}

/// Stdout and stderr of a finished command, concatenated
fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{}{}", stdout, stderr)
}

/// Whether the CLI reported the container as nonexistent
fn is_missing_container(detail: &str) -> bool {
    detail.contains("No such container")
}

/// Map CLI failure text onto the error taxonomy
fn command_error(context: &str, detail: &str) -> Error {
    let detail = detail.trim();

    if detail.contains("Cannot connect to the Docker daemon") {
        Error::unavailable(format!("{}: {}", context, detail))
    } else if detail.contains("is already in use") {
        Error::already_exists(format!("{}: {}", context, detail))
    } else {
        Error::runtime(format!("{}: {}", context, detail))
    }
}
