//! Error types module
//!
//! One variant per failure the upload/generate workflow can surface. Every
//! variant carries the human-readable message shown to the user as the final
//! status; the HTTP variants also carry the status code when one was
//! received (transport failures have none).

/// Failure of a single upload/generate run. Terminal to the run: no step
/// is partially retried except image registration, whose retry decision is
/// driven by [`PipelineError::is_retryable`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Please select an image first.")]
    MissingFile,

    #[error("Unsupported file type: {0}. Please upload jpeg, jpg, png, webp, gif, or heic.")]
    UnsupportedType(String),

    #[error("You must be signed in to generate captions.")]
    Unauthenticated,

    #[error("{message}")]
    Presign {
        status: Option<u16>,
        message: String,
    },

    #[error("{message}")]
    Upload {
        status: Option<u16>,
        message: String,
    },

    #[error("{message}")]
    Register {
        status: Option<u16>,
        message: String,
        retryable: bool,
    },

    #[error("{message}")]
    Generate {
        status: Option<u16>,
        message: String,
    },
}

impl PipelineError {
    /// HTTP status classes that make a registration failure worth retrying:
    /// 5xx and 429. Everything else is terminal on first sight.
    pub fn retryable_status(status: u16) -> bool {
        status >= 500 || status == 429
    }

    pub fn unsupported_type(declared: &str) -> Self {
        let shown = if declared.is_empty() {
            "unknown".to_string()
        } else {
            declared.to_string()
        };
        PipelineError::UnsupportedType(shown)
    }

    /// HTTP status received from the remote, if the failure got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            PipelineError::Presign { status, .. }
            | PipelineError::Upload { status, .. }
            | PipelineError::Register { status, .. }
            | PipelineError::Generate { status, .. } => *status,
            _ => None,
        }
    }

    /// Only registration failures in the 5xx/429 class are retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Register { retryable: true, .. })
    }

    /// Workflow stage the error originated from, for logging.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::MissingFile
            | PipelineError::UnsupportedType(_)
            | PipelineError::Unauthenticated => "validate",
            PipelineError::Presign { .. } => "presign",
            PipelineError::Upload { .. } => "upload",
            PipelineError::Register { .. } => "register",
            PipelineError::Generate { .. } => "generate",
        }
    }
}
