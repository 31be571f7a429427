use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use clipper_core::{CrawlRequest, Generation};
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::client::{ClientSettings, ReqwestTaskClient, TaskClient};
use crate::persist::save_markdown;
use crate::tracker::{track, TrackerSettings};
use crate::{ClientError, EngineEvent};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub client: ClientSettings,
    pub tracker: TrackerSettings,
    pub output_dir: PathBuf,
}

impl EngineConfig {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self {
            client: ClientSettings::default(),
            tracker: TrackerSettings::default(),
            output_dir,
        }
    }
}

enum EngineCommand {
    Submit {
        generation: Generation,
        request: CrawlRequest,
    },
    CancelTracking {
        generation: Generation,
    },
    Save {
        generation: Generation,
        source_url: String,
        markdown: String,
    },
    Upload {
        generation: Generation,
        task_id: String,
        access_token: String,
        filename: Option<String>,
    },
    Shutdown,
}

/// The worker thread is gone; no further events will arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("engine worker stopped")]
pub struct EngineStopped;

/// Runs backend calls on a background tokio runtime and reports results as
/// [`EngineEvent`]s. At most one submission is tracked at a time: a new one
/// cancels the previous before its request is issued.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ClientError> {
        let client = Arc::new(ReqwestTaskClient::new(config.client)?);
        Ok(Self::with_client(client, config.tracker, config.output_dir))
    }

    pub fn with_client(
        client: Arc<dyn TaskClient>,
        tracker: TrackerSettings,
        output_dir: PathBuf,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Could not start async runtime: {}", err);
                    return;
                }
            };
            let mut active: Option<(Generation, CancellationToken)> = None;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Submit {
                        generation,
                        request,
                    } => {
                        if let Some((previous, token)) = active.take() {
                            engine_debug!("Cancelling tracking for generation {}", previous);
                            token.cancel();
                        }
                        let token = CancellationToken::new();
                        active = Some((generation, token.clone()));
                        runtime.spawn(run_submission(
                            client.clone(),
                            tracker.clone(),
                            generation,
                            request,
                            token,
                            event_tx.clone(),
                        ));
                    }
                    EngineCommand::CancelTracking { generation } => {
                        if matches!(&active, Some((current, _)) if *current == generation) {
                            if let Some((_, token)) = active.take() {
                                engine_debug!("Cancelling tracking for generation {}", generation);
                                token.cancel();
                            }
                        }
                    }
                    EngineCommand::Save {
                        generation,
                        source_url,
                        markdown,
                    } => {
                        let output_dir = output_dir.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn_blocking(move || {
                            let result = save_markdown(&output_dir, &source_url, &markdown)
                                .map_err(|err| err.to_string());
                            match &result {
                                Ok(path) => engine_info!("Saved markdown to {:?}", path),
                                Err(err) => engine_warn!("Saving markdown failed: {}", err),
                            }
                            let _ = event_tx.send(EngineEvent::Saved { generation, result });
                        });
                    }
                    EngineCommand::Upload {
                        generation,
                        task_id,
                        access_token,
                        filename,
                    } => {
                        let client = client.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = client
                                .upload_to_cloud(&task_id, &access_token, filename.as_deref())
                                .await;
                            match &result {
                                Ok(upload) => engine_info!("Uploaded task {} as {}", task_id, upload.display_name),
                                Err(err) => engine_warn!("Upload of task {} failed: {}", task_id, err),
                            }
                            let _ = event_tx.send(EngineEvent::Uploaded { generation, result });
                        });
                    }
                    EngineCommand::Shutdown => {
                        engine_info!("Engine shutting down");
                        break;
                    }
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn submit(&self, generation: Generation, request: CrawlRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Submit {
            generation,
            request,
        });
    }

    pub fn cancel_tracking(&self, generation: Generation) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::CancelTracking { generation });
    }

    pub fn save(&self, generation: Generation, source_url: String, markdown: String) {
        let _ = self.cmd_tx.send(EngineCommand::Save {
            generation,
            source_url,
            markdown,
        });
    }

    pub fn upload(
        &self,
        generation: Generation,
        task_id: String,
        access_token: String,
        filename: Option<String>,
    ) {
        let _ = self.cmd_tx.send(EngineCommand::Upload {
            generation,
            task_id,
            access_token,
            filename,
        });
    }

    /// Stops the worker thread; in-flight work is dropped with the runtime.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }

    /// `Ok(None)` when nothing arrived within `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineStopped> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineStopped),
        }
    }
}

async fn run_submission(
    client: Arc<dyn TaskClient>,
    tracker: TrackerSettings,
    generation: Generation,
    request: CrawlRequest,
    cancel: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let submitted = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        submitted = client.submit(&request) => submitted,
    };
    if cancel.is_cancelled() {
        return;
    }
    let handle = match submitted {
        Ok(handle) => handle,
        Err(error) => {
            engine_warn!("Submission {} failed: {}", generation, error);
            let _ = event_tx.send(EngineEvent::SubmitFailed { generation, error });
            return;
        }
    };
    let _ = event_tx.send(EngineEvent::Submitted {
        generation,
        handle: handle.clone(),
    });

    let events = track(client, handle, tracker, cancel.clone());
    futures_util::pin_mut!(events);
    while let Some(event) = events.next().await {
        if cancel.is_cancelled() || event_tx.send(EngineEvent::Tracker { generation, event }).is_err() {
            break;
        }
    }
    engine_debug!("Tracking for generation {} ended", generation);
}
