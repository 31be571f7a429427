//! Site clipper engine: backend client, progress tracking and effect execution.
mod client;
mod engine;
mod filename;
mod persist;
mod sse;
mod subscription;
mod tracker;
mod types;
mod wire;

pub use client::{ClientSettings, ReqwestTaskClient, TaskClient};
pub use engine::{EngineConfig, EngineHandle, EngineStopped};
pub use filename::derive_filename;
pub use persist::{ensure_output_dir, save_markdown, AtomicFileWriter, PersistError};
pub use sse::{parse_task_event, SseDecoder, SseFrame};
pub use subscription::{EventSubscription, StreamItem};
pub use tracker::{track, TrackerSettings};
pub use types::{
    Channel, ClientError, DoneEvent, EngineEvent, FailureKind, ProgressEvent, TaskEvent,
    TaskOutcome, TrackerEvent,
};
