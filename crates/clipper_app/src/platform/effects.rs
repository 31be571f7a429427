use std::time::Duration;

use clipper_core::{Effect, Msg};
use clipper_engine::{EngineEvent, EngineHandle, EngineStopped, TaskOutcome, TrackerEvent};
use engine_logging::{engine_debug, engine_info, engine_warn, redact};

/// Forwards effects to the engine and hands engine events back.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitTask {
                    generation,
                    request,
                } => {
                    engine_info!(
                        "SubmitTask generation={} mode={} url_len={} cookies={}",
                        generation,
                        request.mode,
                        request.url.len(),
                        request.credentials.len()
                    );
                    self.engine.submit(generation, request);
                }
                Effect::CancelTracking { generation } => {
                    self.engine.cancel_tracking(generation);
                }
                Effect::SaveMarkdown {
                    generation,
                    source_url,
                    markdown,
                } => {
                    self.engine.save(generation, source_url, markdown);
                }
                Effect::UploadMarkdown {
                    generation,
                    task_id,
                    access_token,
                    filename,
                } => {
                    engine_info!(
                        "UploadMarkdown generation={} task_id={} token={}",
                        generation,
                        task_id,
                        redact(&access_token)
                    );
                    self.engine
                        .upload(generation, task_id, access_token, filename);
                }
            }
        }
    }

    pub fn next_event(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineStopped> {
        self.engine.recv_timeout(timeout)
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

/// Translates an engine event into the message the state machine understands.
pub fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Submitted { generation, handle } => Msg::SubmitSucceeded {
            generation,
            task_id: handle.task_id,
        },
        EngineEvent::SubmitFailed { generation, error } => {
            engine_warn!("Submit failed ({}): {}", error.kind, error);
            Msg::SubmitFailed {
                generation,
                message: error.message,
            }
        }
        EngineEvent::Tracker { generation, event } => match event {
            TrackerEvent::Progress { source, progress } => {
                engine_debug!(
                    "Progress via {:?}: {}% {}/{}",
                    source,
                    progress.progress,
                    progress.processed_pages,
                    progress.total_pages
                );
                Msg::TaskProgress {
                    generation,
                    progress: progress.progress,
                    total_pages: progress.total_pages,
                    processed_pages: progress.processed_pages,
                }
            }
            TrackerEvent::Terminal { source, outcome } => {
                engine_debug!("Terminal outcome via {:?}", source);
                match outcome {
                    TaskOutcome::Completed { markdown } => Msg::TaskCompleted {
                        generation,
                        markdown,
                    },
                    TaskOutcome::Failed { message } => Msg::TaskFailed {
                        generation,
                        message,
                    },
                }
            }
        },
        EngineEvent::Saved { generation, result } => Msg::SaveFinished {
            generation,
            saved_path: result.ok().map(|path| path.display().to_string()),
        },
        EngineEvent::Uploaded { generation, result } => Msg::UploadFinished {
            generation,
            result: result.map_err(|err| err.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clipper_core::{TaskStatus, UploadResult};
    use clipper_engine::{Channel, ClientError, FailureKind, ProgressEvent};

    use super::*;

    #[test]
    fn push_progress_becomes_task_progress() {
        let msg = event_to_msg(EngineEvent::Tracker {
            generation: 3,
            event: TrackerEvent::Progress {
                source: Channel::Push,
                progress: ProgressEvent {
                    status: TaskStatus::Processing,
                    progress: 40,
                    total_pages: 5,
                    processed_pages: 2,
                },
            },
        });

        assert_eq!(
            msg,
            Msg::TaskProgress {
                generation: 3,
                progress: 40,
                total_pages: 5,
                processed_pages: 2,
            }
        );
    }

    #[test]
    fn failed_save_carries_no_path() {
        let msg = event_to_msg(EngineEvent::Saved {
            generation: 1,
            result: Err("disk full".to_string()),
        });
        assert_eq!(
            msg,
            Msg::SaveFinished {
                generation: 1,
                saved_path: None,
            }
        );

        let msg = event_to_msg(EngineEvent::Saved {
            generation: 1,
            result: Ok(PathBuf::from("out/a.md")),
        });
        assert!(matches!(msg, Msg::SaveFinished { saved_path: Some(_), .. }));
    }

    #[test]
    fn upload_errors_are_flattened_to_text() {
        let msg = event_to_msg(EngineEvent::Uploaded {
            generation: 2,
            result: Err(ClientError::new(
                FailureKind::Auth { status: 401 },
                "Upload failed: 401",
            )),
        });
        assert_eq!(
            msg,
            Msg::UploadFinished {
                generation: 2,
                result: Err("Upload failed: 401".to_string()),
            }
        );

        let ok = UploadResult {
            file_id: "f1".to_string(),
            display_name: "a.md".to_string(),
            web_link: "https://drive.example/f1".to_string(),
        };
        let msg = event_to_msg(EngineEvent::Uploaded {
            generation: 2,
            result: Ok(ok.clone()),
        });
        assert_eq!(
            msg,
            Msg::UploadFinished {
                generation: 2,
                result: Ok(ok),
            }
        );
    }
}
