//! Metric samples and aggregation
//!
//! One [MetricSample] is produced per successful generate call;
//! [AggregatedMetrics] averages the successful samples collected for one
//! (model, prompt) pair.

use serde::{Deserialize, Serialize};

/// Nanoseconds per second; the endpoint reports all durations in nanoseconds
const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// One generate-call outcome, durations in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Wall time of the whole call
    pub total_duration: f64,

    /// Time spent loading the model
    pub load_duration: f64,

    /// Time spent evaluating the prompt
    pub prompt_eval_duration: f64,

    /// Time spent generating the response
    pub eval_duration: f64,

    /// Number of generated tokens
    pub eval_count: u64,

    /// Generated tokens per second; derived, never endpoint-reported
    pub tokens_per_second: f64,

    /// Raw response text
    pub response: String,
}

impl MetricSample {
    /// Build a sample from endpoint-reported nanosecond durations.
    ///
    /// Durations convert to seconds by dividing by 1e9. The token rate is
    /// eval_count over eval_duration, or 0 when eval_duration is not
    /// positive.
    pub fn from_nanos(
        total_duration_ns: u64,
        load_duration_ns: u64,
        prompt_eval_duration_ns: u64,
        eval_duration_ns: u64,
        eval_count: u64,
        response: String,
    ) -> Self {
        let eval_duration = eval_duration_ns as f64 / NANOS_PER_SECOND;
        let tokens_per_second = if eval_duration > 0.0 {
            eval_count as f64 / eval_duration
        } else {
            0.0
        };

        Self {
            total_duration: total_duration_ns as f64 / NANOS_PER_SECOND,
            load_duration: load_duration_ns as f64 / NANOS_PER_SECOND,
            prompt_eval_duration: prompt_eval_duration_ns as f64 / NANOS_PER_SECOND,
            eval_duration,
            eval_count,
            tokens_per_second,
            response,
        }
    }
}

/// Averaged metrics for one (model, prompt) pair plus one exemplar response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    pub average_total_duration: f64,
    pub average_load_duration: f64,
    pub average_prompt_eval_duration: f64,
    pub average_eval_duration: f64,
    pub average_tokens_per_second: f64,

    /// Response text of the first successful sample
    pub response_example: String,

    /// Number of successful samples behind the averages
    pub sample_count: usize,
}

impl AggregatedMetrics {
    /// Arithmetic mean of each numeric field across the samples.
    ///
    /// Returns None for an empty sample set; zero-valued averages are never
    /// fabricated. The token-rate average is the mean of the per-sample
    /// rates, not the ratio of the eval-count and eval-duration means.
    pub fn from_samples(samples: &[MetricSample]) -> Option<Self> {
        let first = samples.first()?;
        let n = samples.len() as f64;

        Some(Self {
            average_total_duration: samples.iter().map(|s| s.total_duration).sum::<f64>() / n,
            average_load_duration: samples.iter().map(|s| s.load_duration).sum::<f64>() / n,
            average_prompt_eval_duration: samples
                .iter()
                .map(|s| s.prompt_eval_duration)
                .sum::<f64>()
                / n,
            average_eval_duration: samples.iter().map(|s| s.eval_duration).sum::<f64>() / n,
            average_tokens_per_second: samples.iter().map(|s| s.tokens_per_second).sum::<f64>()
                / n,
            response_example: first.response.clone(),
            sample_count: samples.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(eval_count: u64, eval_duration_secs: f64, response: &str) -> MetricSample {
        MetricSample::from_nanos(
            (eval_duration_secs * 2.0 * NANOS_PER_SECOND) as u64,
            500_000_000,
            250_000_000,
            (eval_duration_secs * NANOS_PER_SECOND) as u64,
            eval_count,
            response.to_string(),
        )
    }

    #[test]
    fn test_nanos_to_seconds() {
        let sample = MetricSample::from_nanos(
            2_500_000_000,
            1_000_000_000,
            500_000_000,
            2_000_000_000,
            100,
            String::new(),
        );
        assert_eq!(sample.total_duration, 2.5);
        assert_eq!(sample.load_duration, 1.0);
        assert_eq!(sample.prompt_eval_duration, 0.5);
        assert_eq!(sample.eval_duration, 2.0);
        assert_eq!(sample.tokens_per_second, 50.0);
    }

    #[test]
    fn test_zero_eval_duration_rate() {
        let sample = MetricSample::from_nanos(1_000_000_000, 0, 0, 0, 42, String::new());
        assert_eq!(sample.tokens_per_second, 0.0);
    }

    #[test]
    fn test_empty_sample_set_has_no_aggregate() {
        assert!(AggregatedMetrics::from_samples(&[]).is_none());
    }

    #[test]
    fn test_aggregation_means() {
        let samples = vec![sample(50, 1.0, "first"), sample(100, 2.0, "second")];
        let agg = AggregatedMetrics::from_samples(&samples).unwrap();

        assert_eq!(agg.average_eval_duration, 1.5);
        assert_eq!(agg.average_total_duration, 3.0);
        assert_eq!(agg.sample_count, 2);
        assert_eq!(agg.response_example, "first");
        // 50 tok / 1.0 s and 100 tok / 2.0 s are both 50 tok/s
        assert_eq!(agg.average_tokens_per_second, 50.0);
    }

    #[test]
    fn test_token_rate_is_mean_of_rates() {
        // 50 tok / 1.0 s = 50 tok/s; 300 tok / 2.0 s = 150 tok/s.
        // Mean of rates is 100; the ratio of means would be 350/3 ≈ 116.7.
        let samples = vec![sample(50, 1.0, "a"), sample(300, 2.0, "b")];
        let agg = AggregatedMetrics::from_samples(&samples).unwrap();

        assert_eq!(agg.average_tokens_per_second, 100.0);

        let conflated = (50.0 + 300.0) / (1.0 + 2.0);
        assert!((agg.average_tokens_per_second - conflated).abs() > 10.0);
    }
}
