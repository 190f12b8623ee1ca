//! Benchmark orchestration across accelerator groups and models.
//!
//! The orchestrator walks the {accelerator group x model} matrix: for each
//! combination it starts one serving container, gates on readiness, pulls and
//! loads the model, runs the repeated-prompt battery, and tears the container
//! down. Models are configured in ascending resource size, so once a load
//! exhausts a group's accelerator memory every larger model on that group is
//! skipped without being attempted. Groups are independent of each other.
//!
//! Teardown pairs with a successful container start: every exit path between
//! `start` and the end of the iteration runs exactly one stop and remove.

use std::sync::Arc;

use bench_core::{
    AcceleratorGroup, BenchConfig, ContainerHandle, ContainerRuntime, InferenceClient, ModelSpec,
    PromptSet, Result,
};
use tracing::{debug, info, warn};

use crate::readiness::{PollPolicy, ReadinessPoller};
use crate::report::ReportWriter;
use crate::runner::BenchmarkRunner;

/// Outcome of one model iteration on one accelerator group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelOutcome {
    /// The battery completed and reports were written.
    Benchmarked,
    /// This model failed (container start, readiness, pull, or load); the
    /// group moves on to the next model.
    Failed,
    /// The load exhausted accelerator memory; the group's remaining models
    /// are skipped.
    Exhausted,
    /// Not attempted because an earlier load on this group exhausted memory.
    Skipped,
}

/// Whether a group keeps attempting models or skips the remainder.
///
/// Threaded explicitly through the iteration: each outcome folds into the
/// progress carried to the next model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupProgress {
    Continue,
    SkipRemaining,
}

impl GroupProgress {
    /// Fold one model outcome into the progress for the next model.
    pub fn advance(self, outcome: ModelOutcome) -> GroupProgress {
        match (self, outcome) {
            (GroupProgress::SkipRemaining, _) => GroupProgress::SkipRemaining,
            (GroupProgress::Continue, ModelOutcome::Exhausted) => GroupProgress::SkipRemaining,
            (GroupProgress::Continue, _) => GroupProgress::Continue,
        }
    }
}

/// Model iteration counts for a whole run, by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub benchmarked: usize,
    pub failed: usize,
    pub exhausted: usize,
    pub skipped: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: ModelOutcome) {
        match outcome {
            ModelOutcome::Benchmarked => self.benchmarked += 1,
            ModelOutcome::Failed => self.failed += 1,
            ModelOutcome::Exhausted => self.exhausted += 1,
            ModelOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Total model iterations across all groups.
    pub fn total(&self) -> usize {
        self.benchmarked + self.failed + self.exhausted + self.skipped
    }
}

/// Drives a full benchmark run over the configured groups and models.
pub struct Orchestrator {
    runtime: Arc<dyn ContainerRuntime>,
    client: Arc<dyn InferenceClient>,
    runner: BenchmarkRunner,
    poller: ReadinessPoller,
    reporter: ReportWriter,
    config: BenchConfig,
    prompts: PromptSet,
}

impl Orchestrator {
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        client: Arc<dyn InferenceClient>,
        config: BenchConfig,
        prompts: PromptSet,
    ) -> Result<Self> {
        config.validate()?;

        let runner = BenchmarkRunner::new(client.clone(), config.test_runs);
        let mut container_policy = PollPolicy::new(config.polling.container_interval());
        let mut model_policy = PollPolicy::new(config.polling.model_interval());
        if let Some(deadline) = config.polling.deadline() {
            container_policy = container_policy.with_deadline(deadline);
            model_policy = model_policy.with_deadline(deadline);
        }
        let poller = ReadinessPoller::new(container_policy, model_policy);
        let reporter = ReportWriter::new(&config.report_dir);

        Ok(Self {
            runtime,
            client,
            runner,
            poller,
            reporter,
            config,
            prompts,
        })
    }

    /// Run the full matrix. Individual model failures are logged and
    /// absorbed; the only fatal error is an unusable report directory.
    pub async fn run(&self) -> Result<RunSummary> {
        self.reporter.ensure_dir()?;

        info!(
            "Starting benchmark run: {} group(s), {} model(s), {} prompt(s), {} run(s) per prompt",
            self.config.gpu_id_lists.len(),
            self.config.model_list.len(),
            self.prompts.len(),
            self.config.test_runs
        );

        let mut summary = RunSummary::default();
        for group in &self.config.gpu_id_lists {
            self.run_group(group, &mut summary).await;
        }

        info!(
            "Benchmark run finished: {} benchmarked, {} failed, {} exhausted, {} skipped",
            summary.benchmarked, summary.failed, summary.exhausted, summary.skipped
        );
        Ok(summary)
    }

    /// Walk the model list on one accelerator group.
    async fn run_group(&self, group: &AcceleratorGroup, summary: &mut RunSummary) {
        info!("Processing accelerator group [{}]", group);

        let mut progress = GroupProgress::Continue;
        for model in &self.config.model_list {
            let outcome = match progress {
                GroupProgress::SkipRemaining => {
                    info!(
                        "Skipping model {} on group [{}] after earlier memory exhaustion",
                        model, group
                    );
                    ModelOutcome::Skipped
                }
                GroupProgress::Continue => self.run_model(group, model).await,
            };
            summary.record(outcome);
            progress = progress.advance(outcome);
        }
    }

    /// One model iteration: container start, the driven phases, teardown.
    async fn run_model(&self, group: &AcceleratorGroup, model: &ModelSpec) -> ModelOutcome {
        info!("Loading model {} on group [{}]", model, group);

        let handle = match self
            .runtime
            .start(model, group, self.config.server.port)
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Could not start container for model {}: {}", model, e);
                return ModelOutcome::Failed;
            }
        };

        let outcome = self.drive_model(&handle, model).await;
        self.teardown(&handle).await;
        outcome
    }

    /// The phases between a successful container start and teardown:
    /// readiness, pull, load, the prompt battery, endpoint cleanup.
    ///
    /// Never tears the container down itself; the caller owns that.
    async fn drive_model(&self, handle: &ContainerHandle, model: &ModelSpec) -> ModelOutcome {
        if let Err(e) = self
            .poller
            .wait_for_container(self.runtime.as_ref(), handle)
            .await
        {
            warn!("Container {} never became ready: {}", handle.name, e);
            return ModelOutcome::Failed;
        }

        if let Err(e) = self.client.pull(model).await {
            // A failed pull fails this model only; the group keeps going.
            warn!("Pull failed for model {}: {}", model, e);
            return ModelOutcome::Failed;
        }

        if let Err(e) = self.runtime.load_model(handle, model).await {
            if e.is_resource_exhaustion() {
                warn!(
                    "Accelerator memory exhausted loading model {} on group [{}]; \
                     skipping remaining models",
                    model, handle.group
                );
                return ModelOutcome::Exhausted;
            }
            warn!("Loading model {} failed: {}", model, e);
            return ModelOutcome::Failed;
        }

        if let Err(e) = self.poller.wait_for_model(self.client.as_ref(), model).await {
            warn!("Model {} never became accessible: {}", model, e);
            return ModelOutcome::Failed;
        }

        info!(
            "Benchmarking model {} ({} prompts, {} runs each)",
            model,
            self.prompts.len(),
            self.runner.runs()
        );
        for (index, case) in self.prompts.indexed() {
            let metrics = self.runner.run_prompt(model, &case.prompt).await;
            if metrics.is_none() {
                warn!("No data collected for model {} prompt {}", model, index);
            }
            if let Err(e) = self
                .reporter
                .write_report(model, index, &case.prompt, metrics.as_ref())
            {
                warn!(
                    "Could not write report for model {} prompt {}: {}",
                    model, index, e
                );
            }
        }

        // Best-effort endpoint cleanup so the next model starts from a clean
        // server state. The container is going away regardless.
        if let Err(e) = self.client.unload(model).await {
            debug!("Unload of model {} reported: {}", model, e);
        }
        if let Err(e) = self.client.delete(model).await {
            debug!("Delete of model {} reported: {}", model, e);
        }

        ModelOutcome::Benchmarked
    }

    /// Stop and remove the container. Failures are logged, never propagated:
    /// teardown trouble must not abort the rest of the run.
    async fn teardown(&self, handle: &ContainerHandle) {
        debug!("Cleaning up container {}", handle.name);
        if let Err(e) = self.runtime.stop(handle).await {
            warn!("Stopping container {} failed: {}", handle.name, e);
        }
        if let Err(e) = self.runtime.remove(handle).await {
            warn!("Removing container {} failed: {}", handle.name, e);
        }
        info!("Cleaned up container {}", handle.name);
    }
}
