//! JSON bodies of the backend HTTP/SSE contract.
use clipper_core::{CrawlRequest, TaskSnapshot, TaskStatus, UploadResult};
use serde::{Deserialize, Serialize};

use crate::{ClientError, DoneEvent, FailureKind, ProgressEvent};

#[derive(Debug, Serialize)]
pub(crate) struct SubmitBody<'a> {
    url: &'a str,
    mode: &'static str,
    /// Deprecated alias of `mode == sitemap`, kept for older backends.
    sitemap: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_pages: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cookies: Vec<CookieBody<'a>>,
}

#[derive(Debug, Serialize)]
struct CookieBody<'a> {
    name: &'a str,
    value: &'a str,
    domain: &'a str,
    path: &'a str,
}

impl<'a> From<&'a CrawlRequest> for SubmitBody<'a> {
    fn from(request: &'a CrawlRequest) -> Self {
        Self {
            url: &request.url,
            mode: request.mode.as_str(),
            sitemap: request.mode == clipper_core::CrawlMode::Sitemap,
            max_pages: request.effective_max_pages(),
            cookies: request
                .credentials
                .iter()
                .map(|cookie| CookieBody {
                    name: &cookie.name,
                    value: &cookie.value,
                    domain: &cookie.domain,
                    path: &cookie.path,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    pub task_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    id: String,
    #[serde(default)]
    url: String,
    status: String,
    #[serde(default)]
    progress: i64,
    #[serde(default)]
    total_pages: i64,
    #[serde(default)]
    processed_pages: i64,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<StatusResponse> for TaskSnapshot {
    type Error = ClientError;

    fn try_from(body: StatusResponse) -> Result<Self, Self::Error> {
        let status = parse_status(&body.status)?;
        Ok(TaskSnapshot {
            id: body.id,
            url: body.url,
            status,
            progress: clamp_progress(body.progress),
            total_pages: clamp_count(body.total_pages),
            processed_pages: clamp_count(body.processed_pages),
            result: body.result.filter(|_| status == TaskStatus::Completed),
            error: body.error.filter(|_| status == TaskStatus::Failed),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressPayload {
    status: String,
    #[serde(default)]
    progress: i64,
    #[serde(default)]
    total_pages: i64,
    #[serde(default)]
    processed_pages: i64,
}

impl TryFrom<ProgressPayload> for ProgressEvent {
    type Error = ClientError;

    fn try_from(body: ProgressPayload) -> Result<Self, Self::Error> {
        Ok(ProgressEvent {
            status: parse_status(&body.status)?,
            progress: clamp_progress(body.progress),
            total_pages: clamp_count(body.total_pages),
            processed_pages: clamp_count(body.processed_pages),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DonePayload {
    status: String,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<DonePayload> for DoneEvent {
    type Error = ClientError;

    fn try_from(body: DonePayload) -> Result<Self, Self::Error> {
        Ok(DoneEvent {
            status: parse_status(&body.status)?,
            result: body.result,
            error: body.error,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadBody<'a> {
    pub task_id: &'a str,
    pub access_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    file_id: String,
    name: String,
    web_link: String,
}

impl From<UploadResponse> for UploadResult {
    fn from(body: UploadResponse) -> Self {
        UploadResult {
            file_id: body.file_id,
            display_name: body.name,
            web_link: body.web_link,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HealthResponse {
    pub status: String,
}

fn parse_status(raw: &str) -> Result<TaskStatus, ClientError> {
    raw.parse::<TaskStatus>()
        .map_err(|err| ClientError::new(FailureKind::Parse, err))
}

fn clamp_progress(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

fn clamp_count(raw: i64) -> u32 {
    raw.clamp(0, i64::from(u32::MAX)) as u32
}
