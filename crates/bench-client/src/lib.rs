//! # bench-client
//!
//! Inference endpoint client for inferbench.
//!
//! This crate drives the Ollama HTTP API: generate calls whose timing fields
//! become metric samples, model pulls, keep-alive-zero unloads, the loaded
//! model status query, and model deletion. It implements the InferenceClient
//! trait from bench-core, so the benchmark logic never touches HTTP
//! directly.

pub mod config;
pub mod ollama;

pub use config::ClientConfig;
pub use ollama::OllamaClient;
