//! HTTP transport built on the blocking reqwest client

pub mod client;

pub use client::{ReqwestTransport, ReqwestTransportBuilder};
