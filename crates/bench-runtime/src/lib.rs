//! # bench-runtime
//!
//! Container runtime adapter for inferbench.
//!
//! This crate drives the Docker CLI to manage one ephemeral serving
//! container per {accelerator group, model} iteration:
//!
//! - Container lifecycle (run, inspect, stop, remove) as external process
//!   invocations
//! - Triggering the model load inside the container and capturing its output
//! - Classification of load failures into resource exhaustion vs. everything
//!   else
//!
//! The adapter implements the ContainerRuntime trait from bench-core, so the
//! orchestration logic can swap in a different backend (or the mock runtime
//! used in tests) without changes.

pub mod classify;
pub mod config;
pub mod docker;

pub use classify::{classify_load_failure, LoadFailure};
pub use config::RuntimeConfig;
pub use docker::DockerRuntime;
