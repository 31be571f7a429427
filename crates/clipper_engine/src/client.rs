use std::ops::ControlFlow;
use std::time::Duration;

use clipper_core::{CrawlRequest, TaskHandle, TaskSnapshot, UploadResult};
use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::sse::{parse_task_event, SseDecoder};
use crate::subscription::{EventSubscription, StreamItem};
use crate::wire::{
    HealthResponse, StatusResponse, SubmitBody, SubmitResponse, UploadBody, UploadResponse,
};
use crate::{ClientError, FailureKind, TaskEvent};

const BODY_SNIPPET_LIMIT: usize = 512;
const STREAM_BUFFER: usize = 64;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Limit on each read; there is no deadline for a whole response so the
    /// push channel can stay open as long as the backend keeps it alive.
    pub read_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
        }
    }
}

/// Stateless calls against the conversion backend.
#[async_trait::async_trait]
pub trait TaskClient: Send + Sync {
    async fn submit(&self, request: &CrawlRequest) -> Result<TaskHandle, ClientError>;

    async fn fetch_status(&self, handle: &TaskHandle) -> Result<TaskSnapshot, ClientError>;

    /// Opens the push channel. Failing to open is a [`FailureKind::Stream`] error.
    async fn open_stream(&self, handle: &TaskHandle) -> Result<EventSubscription, ClientError>;

    async fn upload_to_cloud(
        &self,
        task_id: &str,
        access_token: &str,
        filename: Option<&str>,
    ) -> Result<UploadResult, ClientError>;

    async fn health(&self) -> Result<String, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTaskClient {
    base_url: reqwest::Url,
    http: reqwest::Client,
}

impl ReqwestTaskClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let mut base = settings.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = reqwest::Url::parse(&base)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .read_timeout(settings.read_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network { status: None }, err.to_string()))?;
        Ok(Self { base_url, http })
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        context: &str,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            let payload = serde_json::to_vec(body)
                .map_err(|err| ClientError::new(FailureKind::Parse, err.to_string()))?;
            request = request.header(CONTENT_TYPE, "application/json").body(payload);
        }

        let response = request.send().await.map_err(|err| map_reqwest_error(context, err))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| map_reqwest_error(context, err))?;
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::Network {
                    status: Some(status.as_u16()),
                },
                status_message(context, status, &bytes),
            ));
        }
        serde_json::from_slice(&bytes).map_err(|err| {
            ClientError::new(FailureKind::Parse, format!("{context}: bad response body: {err}"))
        })
    }
}

#[async_trait::async_trait]
impl TaskClient for ReqwestTaskClient {
    async fn submit(&self, request: &CrawlRequest) -> Result<TaskHandle, ClientError> {
        engine_info!(
            "Submit url_len={} mode={} cookies={}",
            request.url.len(),
            request.mode,
            request.credentials.len()
        );
        let body = SubmitBody::from(request);
        let response: SubmitResponse = self
            .call(Method::POST, "api/v1/crawl", Some(&body), "Submit failed")
            .await?;
        engine_info!(
            "Task {} accepted (status={})",
            response.task_id,
            response.status.as_deref().unwrap_or("?")
        );
        Ok(TaskHandle::new(response.task_id))
    }

    async fn fetch_status(&self, handle: &TaskHandle) -> Result<TaskSnapshot, ClientError> {
        let path = format!("api/v1/tasks/{}", handle.task_id);
        let response: StatusResponse = self
            .call::<(), _>(Method::GET, &path, None, "Get task failed")
            .await?;
        response.try_into()
    }

    async fn open_stream(&self, handle: &TaskHandle) -> Result<EventSubscription, ClientError> {
        let url = self.endpoint(&format!("api/v1/tasks/{}/stream", handle.task_id))?;
        let stream_error = |err: reqwest::Error| ClientError::new(FailureKind::Stream, err.to_string());

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(stream_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::Stream,
                format!("stream rejected: {status}"),
            ));
        }
        engine_debug!("Stream open for task {}", handle.task_id);

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let cancel = CancellationToken::new();
        let producer_cancel = cancel.clone();
        let task_id = handle.task_id.clone();
        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut decoder = SseDecoder::new();
            loop {
                let chunk = tokio::select! {
                    biased;
                    _ = producer_cancel.cancelled() => break,
                    chunk = body.next() => chunk,
                };
                let chunk = match chunk {
                    Some(Ok(chunk)) => chunk,
                    Some(Err(err)) => {
                        let _ = tx.send(Err(stream_error(err))).await;
                        break;
                    }
                    None => break,
                };
                if forward_frames(&mut decoder, &chunk, &tx).await.is_break() {
                    break;
                }
            }
            engine_debug!("Stream reader for task {} stopped", task_id);
        });

        Ok(EventSubscription::new(rx, cancel))
    }

    async fn upload_to_cloud(
        &self,
        task_id: &str,
        access_token: &str,
        filename: Option<&str>,
    ) -> Result<UploadResult, ClientError> {
        let body = UploadBody {
            task_id,
            access_token,
            filename,
        };
        let result: Result<UploadResponse, ClientError> = self
            .call(Method::POST, "api/v1/drive/upload", Some(&body), "Upload failed")
            .await;
        match result {
            Ok(response) => Ok(response.into()),
            Err(ClientError {
                kind: FailureKind::Network { status: Some(code) },
                message,
            }) if code == 401 || code == 403 => {
                engine_warn!("Upload for task {} rejected the access token", task_id);
                Err(ClientError::new(FailureKind::Auth { status: code }, message))
            }
            Err(err) => Err(err),
        }
    }

    async fn health(&self) -> Result<String, ClientError> {
        let response: HealthResponse = self
            .call::<(), _>(Method::GET, "api/v1/health", None, "Health check failed")
            .await?;
        Ok(response.status)
    }
}

/// Decodes one chunk and forwards its events. Breaks once `done` was sent or
/// the receiver is gone.
async fn forward_frames(
    decoder: &mut SseDecoder,
    chunk: &[u8],
    tx: &mpsc::Sender<StreamItem>,
) -> ControlFlow<()> {
    for frame in decoder.push(chunk) {
        let item = match parse_task_event(&frame) {
            Ok(Some(event)) => Ok(event),
            Ok(None) => continue,
            Err(err) => Err(err),
        };
        let is_done = matches!(item, Ok(TaskEvent::Done(_)));
        if tx.send(item).await.is_err() || is_done {
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}

fn status_message(context: &str, status: StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return format!("{context}: {}", status.as_u16());
    }
    let snippet: String = text.chars().take(BODY_SNIPPET_LIMIT).collect();
    format!("{context}: {} {snippet}", status.as_u16())
}

fn map_reqwest_error(context: &str, err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, format!("{context}: timed out"));
    }
    ClientError::new(FailureKind::Network { status: None }, format!("{context}: {err}"))
}
