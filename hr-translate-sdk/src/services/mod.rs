//! Generation backends
//!
//! Concrete `Generator` implementations for hosted generative services.

pub mod openai;
mod common;

pub use common::{UserAgent, get_global_metrics};
