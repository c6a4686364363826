mod artifact;
mod ask;
mod common;
mod follow_up;
mod session;

pub use artifact::{artifact_title, GenerateArtifactHandler};
pub use ask::{AskQuestionHandler, AskQuestionRequest, AskQuestionResponse};
pub use common::ContextSummary;
pub use follow_up::GenerateFollowUpQuestionsHandler;
pub use session::NotebookSession;
