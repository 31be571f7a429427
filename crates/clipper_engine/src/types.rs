use std::fmt;
use std::path::PathBuf;

use clipper_core::{Generation, TaskHandle, TaskStatus, UploadResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub status: TaskStatus,
    pub progress: u8,
    pub total_pages: u32,
    pub processed_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoneEvent {
    pub status: TaskStatus,
    pub result: Option<String>,
    pub error: Option<String>,
}

/// One event received on the push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Progress(ProgressEvent),
    Done(DoneEvent),
}

/// Which channel produced a tracker event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Push,
    Poll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed { markdown: String },
    Failed { message: String },
}

impl TaskOutcome {
    /// Only a completed status with a result counts as success; anything else
    /// becomes a failure with the backend message or a fallback.
    pub(crate) fn from_terminal(
        status: TaskStatus,
        result: Option<String>,
        error: Option<String>,
    ) -> Self {
        match (status, result) {
            (TaskStatus::Completed, Some(markdown)) => TaskOutcome::Completed { markdown },
            (TaskStatus::Completed, None) => TaskOutcome::Failed {
                message: error.unwrap_or_else(|| "Task completed without a result".to_string()),
            },
            _ => TaskOutcome::Failed {
                message: error.unwrap_or_else(|| "Crawl failed".to_string()),
            },
        }
    }
}

/// Unified progress/result stream item produced by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    Progress {
        source: Channel,
        progress: ProgressEvent,
    },
    Terminal {
        source: Channel,
        outcome: TaskOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Submitted {
        generation: Generation,
        handle: TaskHandle,
    },
    SubmitFailed {
        generation: Generation,
        error: ClientError,
    },
    Tracker {
        generation: Generation,
        event: TrackerEvent,
    },
    Saved {
        generation: Generation,
        result: Result<PathBuf, String>,
    },
    Uploaded {
        generation: Generation,
        result: Result<UploadResult, ClientError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// Transport failure (`status: None`) or non-success HTTP status.
    Network { status: Option<u16> },
    Timeout,
    /// Push channel failed; never fatal, triggers polling.
    Stream,
    /// Access token rejected by the upload endpoint.
    Auth { status: u16 },
    /// Payload could not be decoded.
    Parse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Network { status: Some(code) } => write!(f, "http status {code}"),
            FailureKind::Network { status: None } => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Stream => write!(f, "stream error"),
            FailureKind::Auth { status } => write!(f, "auth rejected ({status})"),
            FailureKind::Parse => write!(f, "parse error"),
        }
    }
}
