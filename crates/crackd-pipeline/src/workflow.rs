//! Upload/generate workflow orchestrator.
//!
//! Sequences the four pipeline calls into one run, tracking a strictly
//! sequential state machine and reporting progress through a sink. Any step
//! failure is terminal for the run; already-uploaded bytes are not rolled
//! back (the remote object may stay orphaned, which is accepted).

use crackd_core::media::resolve_content_type;
use crackd_core::models::{AuthSession, CompletedUpload, SelectedFile, WorkflowStage, WorkflowState};
use crackd_core::PipelineError;

use crate::client::PipelineApi;
use crate::retry::RetryPolicy;

/// Receives one human-readable announcement per workflow state, plus one per
/// register retry attempt. Each report replaces the previous one; sinks that
/// render a status line should overwrite, not append.
pub trait ProgressSink {
    fn on_progress(&mut self, stage: WorkflowStage, detail: &str);
}

/// Sink that drops all announcements.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_progress(&mut self, _stage: WorkflowStage, _detail: &str) {}
}

/// One upload/generate run at a time. `run` takes `&mut self` and the type
/// is not `Clone`, so a second submission cannot start while one is in
/// flight on the same workflow; hosts that accept concurrent triggers must
/// serialize on this exclusivity.
pub struct UploadWorkflow<'a> {
    api: &'a dyn PipelineApi,
    retry: RetryPolicy,
    state: WorkflowState,
}

impl<'a> UploadWorkflow<'a> {
    pub fn new(api: &'a dyn PipelineApi, retry: RetryPolicy) -> Self {
        UploadWorkflow {
            api,
            retry,
            state: WorkflowState::Idle,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Run the whole workflow: validate, presign, upload, register (with
    /// retry), generate. The bearer token is read once at validation and
    /// reused for every call; a token expiring mid-run fails that call.
    pub async fn run(
        &mut self,
        file: Option<SelectedFile>,
        session: Option<&AuthSession>,
        progress: &mut dyn ProgressSink,
    ) -> Result<CompletedUpload, PipelineError> {
        let result = self.drive(file, session, progress).await;

        match &result {
            Ok(done) => {
                self.state = WorkflowState::Completed(done.clone());
                progress.on_progress(WorkflowStage::Completed, &done.status_line());
                tracing::info!(
                    captions = done.captions.len(),
                    public_url = %done.public_url,
                    "Caption generation completed"
                );
            }
            Err(err) => {
                self.state = WorkflowState::Failed(err.to_string());
                progress.on_progress(WorkflowStage::Failed, &err.to_string());
                tracing::error!(
                    stage = err.stage(),
                    status = ?err.status(),
                    error = %err,
                    "Caption generation failed"
                );
            }
        }

        result
    }

    async fn drive(
        &mut self,
        file: Option<SelectedFile>,
        session: Option<&AuthSession>,
        progress: &mut dyn ProgressSink,
    ) -> Result<CompletedUpload, PipelineError> {
        self.enter(
            WorkflowState::ValidatingInput,
            "Validating selected file and session...",
            progress,
        );

        let file = file.ok_or(PipelineError::MissingFile)?;
        let token = session
            .map(|s| s.access_token.clone())
            .filter(|t| !t.is_empty())
            .ok_or(PipelineError::Unauthenticated)?;
        let content_type = resolve_content_type(&file.declared_type, &file.name)
            .ok_or_else(|| PipelineError::unsupported_type(&file.declared_type))?;

        self.enter(
            WorkflowState::RequestingUploadSlot,
            "Step 1/4: Generating presigned upload URL...",
            progress,
        );
        let slot = self.api.request_upload_slot(&content_type, &token).await?;

        self.enter(
            WorkflowState::UploadingBytes,
            "Step 2/4: Uploading image bytes...",
            progress,
        );
        self.api
            .upload_bytes(&slot.upload_url, &content_type, file.data.clone())
            .await?;

        // Registration announcements are per-attempt, emitted by the retry
        // observer rather than by a single state transition.
        self.state = WorkflowState::RegisteringImage;
        let api = self.api;
        let retry = self.retry;
        let max_attempts = retry.max_attempts;
        let public_url = slot.public_url.clone();
        let register_token = token.clone();
        let image_id = retry
            .run(
                |attempt| {
                    let detail = if attempt == 1 {
                        "Step 3/4: Registering uploaded image with pipeline...".to_string()
                    } else {
                        format!("Step 3/4: Register retry {attempt}/{max_attempts}...")
                    };
                    progress.on_progress(WorkflowStage::RegisteringImage, &detail);
                },
                || api.register_image(&public_url, &register_token),
            )
            .await?;

        self.enter(
            WorkflowState::GeneratingCaptions,
            "Step 4/4: Generating captions...",
            progress,
        );
        let captions = self.api.generate_captions(&image_id, &token).await?;

        Ok(CompletedUpload {
            public_url: slot.public_url,
            captions,
        })
    }

    fn enter(&mut self, state: WorkflowState, detail: &str, progress: &mut dyn ProgressSink) {
        let stage = state.stage();
        self.state = state;
        tracing::info!(stage = stage.as_str(), "{}", detail);
        progress.on_progress(stage, detail);
    }
}
