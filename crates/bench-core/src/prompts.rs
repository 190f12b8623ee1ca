//! Benchmark prompt loading
//!
//! Prompts come from a YAML document with a `tests` key holding an ordered
//! list of records, each exposing a `prompt` string field. The position of a
//! prompt in the list is its 1-based index, used for report naming.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single benchmark prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptCase {
    /// The prompt text sent to the model
    pub prompt: String,
}

impl PromptCase {
    /// Create a prompt case from text
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Ordered set of benchmark prompts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSet {
    tests: Vec<PromptCase>,
}

impl PromptSet {
    /// Create a prompt set from an ordered list of cases
    pub fn new(tests: Vec<PromptCase>) -> Self {
        Self { tests }
    }

    /// Load a prompt set from a YAML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context_fn(|| format!("failed to read prompt file {}", path.display()))?;
        let set: Self = serde_yaml::from_str(&raw)?;

        if set.tests.is_empty() {
            return Err(Error::config(format!(
                "Prompt file {} contains no tests",
                path.display()
            )));
        }

        Ok(set)
    }

    /// The prompt cases, in file order
    pub fn cases(&self) -> &[PromptCase] {
        &self.tests
    }

    /// Number of prompts in the set
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Check if the set has no prompts
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Iterate cases with their 1-based index, matching report naming
    pub fn indexed(&self) -> impl Iterator<Item = (usize, &PromptCase)> {
        self.tests.iter().enumerate().map(|(i, case)| (i + 1, case))
    }
}
