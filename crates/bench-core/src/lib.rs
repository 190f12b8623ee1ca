//! # bench-core
//!
//! Core types, traits, and utilities for inferbench - a benchmarking harness
//! for locally-hosted LLM inference servers.
//!
//! This crate provides the foundational data structures and interfaces that are
//! shared across all other inferbench components. It includes:
//!
//! - Core data structures for accelerator groups, model specs, and containers
//! - Traits for the container runtime and the inference client
//! - Metric sample and aggregation types
//! - Configuration schema and parsing utilities
//! - Error handling types and utilities

pub mod config;
pub mod error;
pub mod metrics;
pub mod prompts;
pub mod traits;
pub mod types;

// Re-export commonly used types at the crate root
pub use config::{BenchConfig, PollingConfig, ServerConfig};
pub use error::{Error, ErrorContext, Result};
pub use metrics::{AggregatedMetrics, MetricSample};
pub use prompts::{PromptCase, PromptSet};
pub use traits::{ContainerRuntime, InferenceClient};
pub use types::{AcceleratorGroup, ContainerHandle, ModelSpec};
