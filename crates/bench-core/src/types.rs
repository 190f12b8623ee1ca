//! Core types for inferbench

use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered set of accelerator device identifiers.
///
/// One group is bound to one serving container instance at a time and is the
/// unit of isolation for a benchmark pass. Immutable once read from
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcceleratorGroup(Vec<u32>);

impl AcceleratorGroup {
    /// Create a group from an ordered list of device identifiers
    pub fn new(ids: Vec<u32>) -> Self {
        Self(ids)
    }

    /// The device identifiers, in configured order
    pub fn ids(&self) -> &[u32] {
        &self.0
    }

    /// Number of devices in this group
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the group has no devices
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Comma-joined device list as handed to the container runtime ("0,1")
    pub fn device_string(&self) -> String {
        self.0
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for AcceleratorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.device_string())
    }
}

impl From<Vec<u32>> for AcceleratorGroup {
    fn from(ids: Vec<u32>) -> Self {
        Self::new(ids)
    }
}

/// A model identifier, typically a tag of the form `name:variant`.
///
/// Ordering across a configured list is significant: models are listed in
/// ascending resource size, which drives the skip-remaining behavior when a
/// load exhausts accelerator memory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelSpec(String);

impl ModelSpec {
    /// Create a model spec from a tag string
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The full tag string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Variant part of the tag (text after the last `:`), or the whole tag
    /// when no variant is present
    pub fn variant(&self) -> &str {
        match self.0.rsplit_once(':') {
            Some((_, variant)) => variant,
            None => &self.0,
        }
    }

    /// Deterministic container name for this model's serving container.
    ///
    /// Derived from the variant part and sanitized to the container runtime
    /// name charset.
    pub fn container_name(&self) -> String {
        format!("ollama_{}", sanitize_name(self.variant()))
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ModelSpec {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

impl From<&str> for ModelSpec {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

/// Handle to one serving container.
///
/// Owned exclusively by the orchestrator for its active lifetime: created at
/// container start, torn down at iteration end (success or failure), never
/// shared across iterations. The running/stopped state of the container is a
/// point-in-time query against the runtime, not a cached field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    /// Container name, derived deterministically from the model spec
    pub name: String,

    /// The accelerator group the container is bound to
    pub group: AcceleratorGroup,

    /// The port the container publishes
    pub port: u16,
}

impl ContainerHandle {
    /// Create a handle for a model's container on the given group and port
    pub fn new(model: &ModelSpec, group: AcceleratorGroup, port: u16) -> Self {
        Self {
            name: model.container_name(),
            group,
            port,
        }
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Replace characters outside the container-runtime name charset with `_`.
///
/// Runtime names accept alphanumerics plus `_`, `.` and `-`.
fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accelerator_group() {
        let group = AcceleratorGroup::new(vec![0, 1, 3]);
        assert_eq!(group.ids(), &[0, 1, 3]);
        assert_eq!(group.len(), 3);
        assert!(!group.is_empty());
        assert_eq!(group.device_string(), "0,1,3");
        assert_eq!(group.to_string(), "0,1,3");

        let single = AcceleratorGroup::from(vec![2]);
        assert_eq!(single.device_string(), "2");
    }

    #[test]
    fn test_model_spec_variant() {
        let tagged = ModelSpec::new("llama3.1:8b-instruct-q4_0");
        assert_eq!(tagged.variant(), "8b-instruct-q4_0");

        let untagged = ModelSpec::new("llama3.1");
        assert_eq!(untagged.variant(), "llama3.1");
    }

    #[test]
    fn test_container_name() {
        let model = ModelSpec::new("llama3.1:8b-instruct-q4_0");
        assert_eq!(model.container_name(), "ollama_8b-instruct-q4_0");

        let untagged = ModelSpec::new("llama3.1");
        assert_eq!(untagged.container_name(), "ollama_llama3.1");

        let odd = ModelSpec::new("registry/llama:8b preview");
        assert_eq!(odd.container_name(), "ollama_8b_preview");
    }

    #[test]
    fn test_container_handle() {
        let model = ModelSpec::new("llama3.1:8b");
        let handle = ContainerHandle::new(&model, AcceleratorGroup::new(vec![0, 1]), 11434);
        assert_eq!(handle.name, "ollama_8b");
        assert_eq!(handle.group.device_string(), "0,1");
        assert_eq!(handle.port, 11434);
        assert_eq!(handle.to_string(), "ollama_8b");
    }

    #[test]
    fn test_model_spec_serde() {
        let models: Vec<ModelSpec> =
            serde_yaml::from_str("- llama3.1:8b\n- llama3.1:70b\n").unwrap();
        assert_eq!(models[0].as_str(), "llama3.1:8b");
        assert_eq!(models[1].as_str(), "llama3.1:70b");

        let groups: Vec<AcceleratorGroup> = serde_yaml::from_str("- [0]\n- [0, 1]\n").unwrap();
        assert_eq!(groups[0].ids(), &[0]);
        assert_eq!(groups[1].ids(), &[0, 1]);
    }
}
