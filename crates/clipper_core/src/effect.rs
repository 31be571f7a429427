use crate::{CrawlRequest, Generation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitTask {
        generation: Generation,
        request: CrawlRequest,
    },
    /// Stop every progress source belonging to an abandoned submission.
    CancelTracking { generation: Generation },
    SaveMarkdown {
        generation: Generation,
        source_url: String,
        markdown: String,
    },
    UploadMarkdown {
        generation: Generation,
        task_id: String,
        access_token: String,
        filename: Option<String>,
    },
}
