//! Host selection

mod selector;

pub use selector::{HostSelector, RandomSource};
