//! Push-then-poll progress tracking for one task.
//!
//! The push channel is authoritative while it is open. If it fails or closes
//! before delivering `done`, tracking falls back to polling the status
//! endpoint until a terminal status is seen. The fallback is engaged at most
//! once and exactly one [`TrackerEvent::Terminal`] ends every sequence, unless
//! the caller cancels first, in which case the sequence simply ends.

use std::sync::Arc;
use std::time::Duration;

use clipper_core::TaskHandle;
use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::stream::{self, Stream};
use tokio_util::sync::CancellationToken;

use crate::client::TaskClient;
use crate::subscription::EventSubscription;
use crate::{Channel, FailureKind, ProgressEvent, TaskEvent, TaskOutcome, TrackerEvent};

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    /// Delay between the completion of one status request and the start of the next.
    pub poll_interval: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2000),
        }
    }
}

/// Lazily tracks `handle` until a terminal outcome or cancellation.
pub fn track(
    client: Arc<dyn TaskClient>,
    handle: TaskHandle,
    settings: TrackerSettings,
    cancel: CancellationToken,
) -> impl Stream<Item = TrackerEvent> + Send {
    let tracker = Tracker {
        client,
        handle,
        settings,
        cancel,
        phase: Phase::Connect,
    };
    stream::unfold(tracker, Tracker::step)
}

enum Phase {
    Connect,
    Push(EventSubscription),
    Poll { first: bool },
    Finished,
}

struct Tracker {
    client: Arc<dyn TaskClient>,
    handle: TaskHandle,
    settings: TrackerSettings,
    cancel: CancellationToken,
    phase: Phase,
}

impl Tracker {
    async fn step(mut self) -> Option<(TrackerEvent, Self)> {
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }
            // Every arm either stores the next phase or leaves `Finished` behind.
            match std::mem::replace(&mut self.phase, Phase::Finished) {
                Phase::Finished => return None,
                Phase::Connect => {
                    let opened = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return None,
                        opened = self.client.open_stream(&self.handle) => opened,
                    };
                    match opened {
                        Ok(subscription) => self.phase = Phase::Push(subscription),
                        Err(err) => {
                            engine_warn!(
                                "Task {}: push channel unavailable ({}), polling",
                                self.handle.task_id,
                                err
                            );
                            self.phase = Phase::Poll { first: true };
                        }
                    }
                }
                Phase::Push(mut subscription) => {
                    let item = tokio::select! {
                        biased;
                        // Dropping the subscription cancels its reader.
                        _ = self.cancel.cancelled() => return None,
                        item = subscription.next() => item,
                    };
                    match item {
                        Some(Ok(TaskEvent::Progress(progress))) => {
                            self.phase = Phase::Push(subscription);
                            let event = TrackerEvent::Progress {
                                source: Channel::Push,
                                progress,
                            };
                            return Some((event, self));
                        }
                        Some(Ok(TaskEvent::Done(done))) => {
                            engine_info!(
                                "Task {}: done via push ({})",
                                self.handle.task_id,
                                done.status
                            );
                            let outcome =
                                TaskOutcome::from_terminal(done.status, done.result, done.error);
                            let event = TrackerEvent::Terminal {
                                source: Channel::Push,
                                outcome,
                            };
                            return Some((event, self));
                        }
                        Some(Err(err)) if err.kind == FailureKind::Parse => {
                            engine_warn!(
                                "Task {}: dropping malformed event: {}",
                                self.handle.task_id,
                                err
                            );
                            self.phase = Phase::Push(subscription);
                        }
                        Some(Err(err)) => {
                            engine_warn!(
                                "Task {}: push channel failed ({}), polling",
                                self.handle.task_id,
                                err
                            );
                            self.phase = Phase::Poll { first: true };
                        }
                        None => {
                            engine_info!(
                                "Task {}: push channel closed before done, polling",
                                self.handle.task_id
                            );
                            self.phase = Phase::Poll { first: true };
                        }
                    }
                }
                Phase::Poll { first } => {
                    if !first {
                        tokio::select! {
                            biased;
                            _ = self.cancel.cancelled() => return None,
                            _ = tokio::time::sleep(self.settings.poll_interval) => {}
                        }
                    }
                    if self.cancel.is_cancelled() {
                        return None;
                    }
                    let polled = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return None,
                        polled = self.client.fetch_status(&self.handle) => polled,
                    };
                    let event = match polled {
                        Ok(snapshot) if snapshot.status.is_terminal() => {
                            engine_info!(
                                "Task {}: {} via poll",
                                self.handle.task_id,
                                snapshot.status
                            );
                            TrackerEvent::Terminal {
                                source: Channel::Poll,
                                outcome: TaskOutcome::from_terminal(
                                    snapshot.status,
                                    snapshot.result,
                                    snapshot.error,
                                ),
                            }
                        }
                        Ok(snapshot) => {
                            engine_debug!(
                                "Task {}: poll {} {}%",
                                self.handle.task_id,
                                snapshot.status,
                                snapshot.progress
                            );
                            self.phase = Phase::Poll { first: false };
                            TrackerEvent::Progress {
                                source: Channel::Poll,
                                progress: ProgressEvent {
                                    status: snapshot.status,
                                    progress: snapshot.progress,
                                    total_pages: snapshot.total_pages,
                                    processed_pages: snapshot.processed_pages,
                                },
                            }
                        }
                        Err(err) => {
                            engine_warn!("Task {}: status poll failed: {}", self.handle.task_id, err);
                            TrackerEvent::Terminal {
                                source: Channel::Poll,
                                outcome: TaskOutcome::Failed {
                                    message: err.to_string(),
                                },
                            }
                        }
                    };
                    return Some((event, self));
                }
            }
        }
    }
}
