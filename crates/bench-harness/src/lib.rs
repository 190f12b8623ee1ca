//! # bench-harness
//!
//! Orchestration and benchmarking control loop for inferbench.
//!
//! This crate drives a benchmark run end to end: it walks the configured
//! accelerator groups and models, manages one serving container per
//! combination through the [`bench_core::ContainerRuntime`] trait, gates on
//! readiness, runs repeated-prompt batteries through the
//! [`bench_core::InferenceClient`] trait, and writes per-prompt report files.
//!
//! The [`mock`] module provides scripted runtime and client stand-ins for
//! exercising the control flow without a container daemon or a live server.

pub mod mock;
pub mod orchestrator;
pub mod readiness;
pub mod report;
pub mod runner;

pub use orchestrator::{GroupProgress, ModelOutcome, Orchestrator, RunSummary};
pub use readiness::{PollPolicy, ReadinessPoller};
pub use report::ReportWriter;
pub use runner::BenchmarkRunner;
