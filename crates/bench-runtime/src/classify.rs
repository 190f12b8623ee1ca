//! Load-failure classification
//!
//! The serving runtime reports accelerator memory exhaustion as error text.
//! That detection is isolated here so the matching rule can change without
//! touching the orchestration logic.

/// Outcome classes for a failed model load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailure {
    /// Accelerator memory was exhausted. With models ordered by ascending
    /// size, larger models on the same group are assumed to fail as well.
    ResourceExhaustion,

    /// Any other failure; affects only the current model
    Other,
}

/// Signals that indicate accelerator memory exhaustion.
///
/// Best-effort heuristic: matching is a case-insensitive substring scan, and
/// runtimes that report exhaustion with different wording (or only via exit
/// codes) classify as Other.
const EXHAUSTION_SIGNALS: &[&str] = &["cuda out of memory", "out of memory"];

/// Classify the captured output of a failed model-load command
pub fn classify_load_failure(output: &str) -> LoadFailure {
    let lowered = output.to_lowercase();

    if EXHAUSTION_SIGNALS.iter().any(|signal| lowered.contains(signal)) {
        LoadFailure::ResourceExhaustion
    } else {
        LoadFailure::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_exhaustion_signal() {
        assert_eq!(
            classify_load_failure("Error: CUDA out of memory. Tried to allocate 2.5 GiB"),
            LoadFailure::ResourceExhaustion
        );
    }

    #[test]
    fn test_generic_exhaustion_signal() {
        assert_eq!(
            classify_load_failure("llama runner process has terminated: out of memory"),
            LoadFailure::ResourceExhaustion
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            classify_load_failure("CUDA OUT OF MEMORY"),
            LoadFailure::ResourceExhaustion
        );
    }

    #[test]
    fn test_other_failures() {
        assert_eq!(
            classify_load_failure("Error: model 'llama3.1:8b' not found"),
            LoadFailure::Other
        );
        assert_eq!(classify_load_failure(""), LoadFailure::Other);
    }

    #[test]
    fn test_unrecognized_exhaustion_wording() {
        // Exit-code-only or differently worded exhaustion is not recognized;
        // it fails the single model instead of skipping the group.
        assert_eq!(
            classify_load_failure("signal: killed (exit status 137)"),
            LoadFailure::Other
        );
    }
}
