pub mod caption;
pub mod session;
pub mod upload;
pub mod vote;

pub use caption::CaptionRecord;
pub use session::AuthSession;
pub use upload::{CompletedUpload, SelectedFile, UploadSlot, WorkflowStage, WorkflowState};
pub use vote::{vote_totals, CaptionRow, CaptionVoteRow};
