//! Repeated-prompt benchmark batteries.

use std::sync::Arc;

use bench_core::{AggregatedMetrics, InferenceClient, ModelSpec};
use tracing::{debug, warn};

/// Runs a prompt a fixed number of times against a loaded model and averages
/// the per-run metrics.
///
/// Failed runs are dropped from the sample set rather than aborting the
/// battery, so a flaky generation leaves the average over whatever succeeded.
/// When every run fails there is nothing to average and the battery yields
/// no aggregate at all.
pub struct BenchmarkRunner {
    client: Arc<dyn InferenceClient>,
    runs: u32,
}

impl BenchmarkRunner {
    pub fn new(client: Arc<dyn InferenceClient>, runs: u32) -> Self {
        Self { client, runs }
    }

    /// Number of runs issued per prompt.
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// Runs one prompt `runs` times and returns the aggregate, or `None`
    /// when no run produced a usable sample.
    pub async fn run_prompt(&self, model: &ModelSpec, prompt: &str) -> Option<AggregatedMetrics> {
        let mut samples = Vec::with_capacity(self.runs as usize);
        for attempt in 1..=self.runs {
            match self.client.generate(model, prompt).await {
                Ok(sample) => {
                    debug!(
                        "Run {}/{} for model {}: {:.2} tokens/s over {:.2}s",
                        attempt, self.runs, model, sample.tokens_per_second, sample.total_duration
                    );
                    samples.push(sample);
                }
                Err(e) => {
                    warn!("Run {}/{} for model {} failed: {}", attempt, self.runs, model, e);
                }
            }
        }
        AggregatedMetrics::from_samples(&samples)
    }
}
