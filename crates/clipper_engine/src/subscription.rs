use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{ClientError, TaskEvent};

pub type StreamItem = Result<TaskEvent, ClientError>;

/// Caller side of an open push channel.
///
/// Nothing is delivered after [`cancel`](Self::cancel) or after a
/// [`TaskEvent::Done`]; dropping the subscription cancels it.
#[derive(Debug)]
pub struct EventSubscription {
    rx: mpsc::Receiver<StreamItem>,
    cancel: CancellationToken,
    finished: bool,
}

impl EventSubscription {
    /// Wraps a channel whose producer stops when `cancel` fires.
    pub fn new(rx: mpsc::Receiver<StreamItem>, cancel: CancellationToken) -> Self {
        Self {
            rx,
            cancel,
            finished: false,
        }
    }

    /// Next event, or `None` once the channel closed, completed or was cancelled.
    pub async fn next(&mut self) -> Option<StreamItem> {
        if self.finished || self.cancel.is_cancelled() {
            return None;
        }
        let item = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            item = self.rx.recv() => item,
        };
        match &item {
            Some(Ok(TaskEvent::Done(_))) | None => self.close(),
            Some(_) => {}
        }
        item
    }

    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.close();
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn close(&mut self) {
        self.finished = true;
        self.rx.close();
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
