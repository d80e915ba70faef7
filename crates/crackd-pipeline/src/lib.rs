//! Pipeline clients and the upload/generate workflow.
//!
//! [`PipelineClient`] talks to the remote caption pipeline (presign, upload,
//! register, generate); [`UploadWorkflow`] sequences those calls into one
//! run with bounded retry on the registration step. [`CaptionStore`] is the
//! row-store client for caption listing and voting.

pub mod auth;
pub mod client;
pub mod retry;
pub mod store;
pub mod workflow;

pub use auth::{EnvSession, SessionProvider};
pub use client::{PipelineApi, PipelineClient};
pub use retry::RetryPolicy;
pub use store::CaptionStore;
pub use workflow::{ProgressSink, UploadWorkflow};
