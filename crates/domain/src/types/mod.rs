//! Domain types and models

pub mod auth;
pub mod host;

pub use auth::{AuthMode, AuthScheme, Credentials};
pub use host::{split_host_list, HostKey};
