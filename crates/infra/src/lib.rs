//! # Ingestlink Infrastructure
//!
//! Production implementations of the core ports.
//!
//! This crate contains:
//! - [`http::ReqwestTransport`], the blocking reqwest transport
//! - Configuration loading from the environment and TOML/JSON files
//! - `tracing` subscriber setup and a `metrics` facade collector
//! - [`connect`], which wires all of the above into a
//!   [`ingestlink_core::PipelineClient`]
//!
//! ## Architecture
//! - Implements traits defined in `ingestlink-core` and `ingestlink-common`
//! - Contains all "impure" code (network, environment, files)

pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use client::{client_builder, connect, connect_from_env};
pub use errors::InfraError;
pub use http::ReqwestTransport;
