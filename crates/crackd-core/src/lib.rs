//! Core types for the crackd caption pipeline client.
//!
//! Domain models, the workflow error taxonomy, content-type resolution,
//! and environment-based configuration. No I/O happens in this crate.

pub mod config;
pub mod error;
pub mod media;
pub mod models;

pub use config::Config;
pub use error::PipelineError;
