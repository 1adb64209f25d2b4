//! # Ingestlink Core
//!
//! Session lifecycle and failover engine for submitting document batches
//! to a multi-host ingestion cluster.
//!
//! This crate contains:
//! - Ports: [`transport::Transport`], [`auth::Authenticator`],
//!   [`routing::RandomSource`]
//! - Session management: establish, idle expiry, reset, outage rebuild
//! - Batch submission with per-host retry and cross-host failover
//! - The [`PipelineClient`] facade
//!
//! ## Architecture Principles
//! - Depends only on `ingestlink-domain` and `ingestlink-common`
//! - No HTTP client code; the transport is injected
//! - Clock and random source are injectable for deterministic tests

pub mod auth;
pub mod client;
pub mod pipeline;
pub mod routing;
pub mod session;
pub mod transport;

#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use auth::{authenticator_for, Authenticator};
pub use client::{PipelineClient, PipelineClientBuilder};
pub use pipeline::{BatchReceipt, PipelineBatch, PipelinePoster, RetryCoordinator};
pub use routing::{HostSelector, RandomSource};
pub use session::{Session, SessionInfo, SessionManager, SessionStore, SessionTable};
pub use transport::{Method, Transport, TransportRequest, TransportResponse};
