//! Plain-text report files, one per (model, prompt index) pair.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use bench_core::{AggregatedMetrics, ErrorContext, ModelSpec, Result};
use tracing::debug;

/// Width of the rule separating report sections.
const SEPARATOR_WIDTH: usize = 50;

/// Appends one report block per benchmark battery to a per-(model, prompt)
/// file under the report directory.
///
/// Files are opened in append mode, so rerunning a benchmark adds a new block
/// after the previous one instead of replacing it. A battery that produced no
/// samples still gets a block stating that no data was collected.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    report_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
        }
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    /// Create the report directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.report_dir).with_context_fn(|| {
            format!(
                "Failed to create report directory {}",
                self.report_dir.display()
            )
        })
    }

    /// Report file path for one (model, prompt index) pair.
    pub fn report_path(&self, model: &ModelSpec, prompt_index: usize) -> PathBuf {
        let stem = sanitize_file_stem(model.as_str());
        self.report_dir
            .join(format!("{}_prompt{}.log", stem, prompt_index))
    }

    /// Append the report block for one battery.
    ///
    /// `metrics` is `None` when every run of the battery failed; the block
    /// then records the absence instead of fabricating zeros.
    pub fn write_report(
        &self,
        model: &ModelSpec,
        prompt_index: usize,
        prompt: &str,
        metrics: Option<&AggregatedMetrics>,
    ) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.report_path(model, prompt_index);
        let block = render_block(model, prompt_index, prompt, metrics);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context_fn(|| format!("Failed to open report file {}", path.display()))?;
        file.write_all(block.as_bytes())
            .with_context_fn(|| format!("Failed to write report file {}", path.display()))?;

        debug!("Appended report block to {}", path.display());
        Ok(path)
    }
}

fn render_block(
    model: &ModelSpec,
    prompt_index: usize,
    prompt: &str,
    metrics: Option<&AggregatedMetrics>,
) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut lines = vec![
        format!(
            "Running tests for model {}, prompt {}: '{}'",
            model, prompt_index, prompt
        ),
        separator.clone(),
    ];

    match metrics {
        Some(m) => {
            lines.push(format!("--- Average Metrics for Prompt {} ---", prompt_index));
            lines.push(format!(
                "Total Duration: {:.2} seconds",
                m.average_total_duration
            ));
            lines.push(format!(
                "Load Duration: {:.2} seconds",
                m.average_load_duration
            ));
            lines.push(format!(
                "Prompt Eval Duration: {:.2} seconds",
                m.average_prompt_eval_duration
            ));
            lines.push(format!(
                "Response Eval Duration: {:.2} seconds",
                m.average_eval_duration
            ));
            lines.push(format!(
                "Tokens per Second: {:.2} tokens/s",
                m.average_tokens_per_second
            ));
            lines.push(separator);
            lines.push("Example Response:".to_string());
            lines.push(String::new());
            lines.push(m.response_example.clone());
            lines.push(String::new());
        }
        None => {
            lines.push(format!("No data collected for prompt {}.", prompt_index));
            lines.push(String::new());
        }
    }

    let mut block = lines.join("\n");
    block.push('\n');
    block
}

/// Replace path separators and whitespace in a model tag so it can be used
/// as a file stem. Colons stay as-is.
fn sanitize_file_stem(raw: &str) -> String {
    raw.chars()
        .map(|c| if c == '/' || c.is_whitespace() { '_' } else { c })
        .collect()
}
