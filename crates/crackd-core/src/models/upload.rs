//! Upload workflow types: the selected file, the presigned slot, the state
//! machine, and the terminal success payload.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::models::caption::CaptionRecord;

/// File picked for upload. Created on selection, discarded on the next
/// selection or a successful submit.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    /// Content type as declared by the picker; may be empty or wrong,
    /// resolution falls back to the file extension.
    pub declared_type: String,
    pub data: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, data: Bytes) -> Self {
        SelectedFile {
            name: name.into(),
            declared_type: declared_type.into(),
            data,
        }
    }
}

/// Presigned upload slot returned by the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSlot {
    /// Time-limited URL the raw bytes are PUT to.
    pub upload_url: String,
    /// Stable CDN address of the object once uploaded.
    pub public_url: String,
}

/// Terminal success payload of one run.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedUpload {
    pub public_url: String,
    pub captions: Vec<CaptionRecord>,
}

impl CompletedUpload {
    /// Final status line, e.g. "Done. Generated 2 captions."
    pub fn status_line(&self) -> String {
        let n = self.captions.len();
        format!(
            "Done. Generated {} caption{}.",
            n,
            if n == 1 { "" } else { "s" }
        )
    }
}

/// Stage identifier handed to progress sinks, one per workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    Idle,
    ValidatingInput,
    RequestingUploadSlot,
    UploadingBytes,
    RegisteringImage,
    GeneratingCaptions,
    Completed,
    Failed,
}

impl WorkflowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStage::Idle => "idle",
            WorkflowStage::ValidatingInput => "validating_input",
            WorkflowStage::RequestingUploadSlot => "requesting_upload_slot",
            WorkflowStage::UploadingBytes => "uploading_bytes",
            WorkflowStage::RegisteringImage => "registering_image",
            WorkflowStage::GeneratingCaptions => "generating_captions",
            WorkflowStage::Completed => "completed",
            WorkflowStage::Failed => "failed",
        }
    }
}

/// Workflow state machine. Strictly sequential with no branching back;
/// `Failed` is absorbing and reachable from any non-terminal state. The
/// tagged variants make illegal combinations (a run both processing and
/// failed) unrepresentable.
#[derive(Debug, Clone)]
pub enum WorkflowState {
    Idle,
    ValidatingInput,
    RequestingUploadSlot,
    UploadingBytes,
    RegisteringImage,
    GeneratingCaptions,
    Completed(CompletedUpload),
    Failed(String),
}

impl WorkflowState {
    pub fn stage(&self) -> WorkflowStage {
        match self {
            WorkflowState::Idle => WorkflowStage::Idle,
            WorkflowState::ValidatingInput => WorkflowStage::ValidatingInput,
            WorkflowState::RequestingUploadSlot => WorkflowStage::RequestingUploadSlot,
            WorkflowState::UploadingBytes => WorkflowStage::UploadingBytes,
            WorkflowState::RegisteringImage => WorkflowStage::RegisteringImage,
            WorkflowState::GeneratingCaptions => WorkflowStage::GeneratingCaptions,
            WorkflowState::Completed(_) => WorkflowStage::Completed,
            WorkflowState::Failed(_) => WorkflowStage::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Completed(_) | WorkflowState::Failed(_))
    }
}
