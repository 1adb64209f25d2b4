//! # Ingestlink Domain
//!
//! Domain types shared by every ingestlink crate.
//!
//! This crate contains:
//! - Host keys, credentials and authentication modes
//! - The closed error taxonomy and Result alias
//! - Configuration structures
//! - Protocol constants and default timings
//!
//! ## Architecture
//! - No dependencies on other ingestlink crates
//! - Only external dependencies allowed
//! - Pure data structures; the only I/O is the existence check on the
//!   security configuration path during validation

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::{AuthConfig, ClientConfig, SessionConfig, TransportConfig};
pub use errors::{ErrorCategory, IngestError, Result};
pub use types::*;
