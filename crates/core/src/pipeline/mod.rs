//! Batch submission
//!
//! [`RetryCoordinator`] spreads a batch over live hosts; [`PipelinePoster`]
//! performs one submission against one host, including the single
//! re-authentication retry on 401.

mod batch;
mod coordinator;
mod poster;

pub use batch::PipelineBatch;
pub use coordinator::{BatchReceipt, RetryCoordinator};
pub use poster::{pipeline_url, PipelinePoster};
