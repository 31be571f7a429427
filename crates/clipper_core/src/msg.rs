use crate::{CrawlRequest, Generation, UploadResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked for a conversion. Discards whatever job was live before.
    SubmitRequested(CrawlRequest),
    /// Backend accepted the submission.
    SubmitSucceeded {
        generation: Generation,
        task_id: String,
    },
    /// Submission could not be delivered or was rejected.
    SubmitFailed {
        generation: Generation,
        message: String,
    },
    /// Non-terminal progress from either tracking channel.
    TaskProgress {
        generation: Generation,
        progress: u8,
        total_pages: u32,
        processed_pages: u32,
    },
    TaskCompleted {
        generation: Generation,
        markdown: String,
    },
    /// Backend failure or unrecoverable transport error while tracking.
    TaskFailed {
        generation: Generation,
        message: String,
    },
    /// User clicked Save.
    SaveClicked,
    SaveFinished {
        generation: Generation,
        saved_path: Option<String>,
    },
    /// User clicked Upload with a token obtained from the identity provider.
    UploadClicked {
        access_token: String,
        filename: Option<String>,
    },
    UploadFinished {
        generation: Generation,
        result: Result<UploadResult, String>,
    },
    /// User clicked Reset.
    ResetClicked,
    /// The background worker is gone; nothing in flight can finish.
    EngineStopped { message: String },
}
