//! Incremental `text/event-stream` decoding.
use bytes::{Buf, BytesMut};

use crate::wire::{DonePayload, ProgressPayload};
use crate::{ClientError, FailureKind, TaskEvent};

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Accumulates raw bytes and yields complete frames.
///
/// Lines may be split across chunks and may end in `\n`, `\r\n` or `\r`.
/// A trailing frame that was never terminated by a blank line is discarded.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: BytesMut,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every frame it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(line) = self.next_line() {
            if let Some(frame) = self.handle_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn next_line(&mut self) -> Option<String> {
        let end = self.buffer.iter().position(|b| *b == b'\n' || *b == b'\r')?;
        let terminator = self.buffer[end];
        // A lone `\r` at the end of the buffer may be the first half of `\r\n`.
        if terminator == b'\r' && end + 1 == self.buffer.len() {
            return None;
        }
        let line = self.buffer.split_to(end);
        let skip = if terminator == b'\r' && self.buffer.get(1) == Some(&b'\n') {
            2
        } else {
            1
        };
        self.buffer.advance(skip);
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    fn handle_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

/// Maps a frame onto a task event. Frames other than `progress` and `done`
/// (keep-alive pings and the like) yield `Ok(None)`.
pub fn parse_task_event(frame: &SseFrame) -> Result<Option<TaskEvent>, ClientError> {
    let parse_error =
        |err: serde_json::Error| ClientError::new(FailureKind::Parse, format!("bad {} event: {err}", frame.event));
    match frame.event.as_str() {
        "progress" => {
            let payload: ProgressPayload = serde_json::from_str(&frame.data).map_err(parse_error)?;
            Ok(Some(TaskEvent::Progress(payload.try_into()?)))
        }
        "done" => {
            let payload: DonePayload = serde_json::from_str(&frame.data).map_err(parse_error)?;
            Ok(Some(TaskEvent::Done(payload.try_into()?)))
        }
        _ => Ok(None),
    }
}
