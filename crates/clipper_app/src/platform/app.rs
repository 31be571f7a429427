//! Task orchestration for one client session.
//!
//! [`Orchestrator`] is the only writer of [`AppState`]. User intents and
//! engine events both become [`Msg`]s that run through the pure `update`
//! function; the resulting effects go to the engine.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clipper_core::{update, AppState, AppViewModel, ClientState, CrawlRequest, Msg, UploadResult};
use clipper_engine::{ClientError, EngineEvent, EngineHandle, EngineStopped};
use engine_logging::{engine_debug, engine_warn};
use thiserror::Error;

use super::effects::{event_to_msg, EffectRunner};

const PUMP_INTERVAL: Duration = Duration::from_millis(75);

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("no completed conversion to act on")]
    NotCompleted,
    #[error("saving failed: {0}")]
    Save(String),
    #[error("upload failed: {0}")]
    Upload(ClientError),
    #[error("timed out waiting for the result")]
    TimedOut,
    #[error(transparent)]
    Stopped(#[from] EngineStopped),
}

pub struct Orchestrator {
    state: AppState,
    runner: EffectRunner,
}

impl Orchestrator {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            state: AppState::new(),
            runner: EffectRunner::new(engine),
        }
    }

    pub fn phase(&self) -> &ClientState {
        self.state.phase()
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    /// Runs `msg` through the state machine and forwards its effects.
    /// Returns whether the visible state changed.
    pub fn dispatch(&mut self, msg: Msg) -> bool {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let changed = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);
        changed
    }

    pub fn submit(&mut self, request: CrawlRequest) -> bool {
        self.dispatch(Msg::SubmitRequested(request))
    }

    pub fn reset(&mut self) {
        self.dispatch(Msg::ResetClicked);
    }

    /// Waits up to `timeout` for one engine event and applies it.
    /// Returns `Ok(None)` when nothing arrived. A stopped engine fails any
    /// job in flight before the error is returned.
    pub fn pump(&mut self, timeout: Duration) -> Result<Option<bool>, EngineStopped> {
        match self.runner.next_event(timeout) {
            Ok(Some(event)) => Ok(Some(self.dispatch(event_to_msg(event)))),
            Ok(None) => Ok(None),
            Err(stopped) => {
                engine_warn!("{}", stopped);
                self.dispatch(Msg::EngineStopped {
                    message: stopped.to_string(),
                });
                Err(stopped)
            }
        }
    }

    /// Stops the engine worker; a conversion still running ends in `Error`
    /// on the next pump.
    pub fn shutdown(&self) {
        self.runner.shutdown();
    }

    /// Applies engine events until the conversion completes or fails, calling
    /// `on_view` after every visible change. An idle state returns at once.
    pub fn run_until_settled(&mut self, mut on_view: impl FnMut(&AppViewModel)) -> &ClientState {
        on_view(&self.state.view());
        while self.state.phase().is_in_flight() {
            match self.pump(PUMP_INTERVAL) {
                Ok(Some(true)) => on_view(&self.state.view()),
                Ok(_) => {}
                Err(_) => {
                    on_view(&self.state.view());
                    break;
                }
            }
        }
        self.state.phase()
    }

    /// Saves the completed markdown into the output directory.
    pub fn save(&mut self, timeout: Duration) -> Result<PathBuf, ActionError> {
        let generation = self.state.generation();
        if !self.dispatch_action(Msg::SaveClicked) {
            return Err(ActionError::NotCompleted);
        }
        self.await_event(timeout, |event| match event {
            EngineEvent::Saved {
                generation: g,
                result,
            } if *g == generation => Some(result.clone().map_err(ActionError::Save)),
            _ => None,
        })
    }

    /// Uploads the completed task's markdown with the user's access token.
    /// A rejected token leaves the completed state as it was.
    pub fn upload(
        &mut self,
        access_token: String,
        filename: Option<String>,
        timeout: Duration,
    ) -> Result<UploadResult, ActionError> {
        let generation = self.state.generation();
        let msg = Msg::UploadClicked {
            access_token,
            filename,
        };
        if !self.dispatch_action(msg) {
            return Err(ActionError::NotCompleted);
        }
        self.await_event(timeout, |event| match event {
            EngineEvent::Uploaded {
                generation: g,
                result,
            } if *g == generation => Some(result.clone().map_err(ActionError::Upload)),
            _ => None,
        })
    }

    /// Dispatches an action message; false when it produced no effect.
    fn dispatch_action(&mut self, msg: Msg) -> bool {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        state.consume_dirty();
        self.state = state;
        if effects.is_empty() {
            return false;
        }
        self.runner.enqueue(effects);
        true
    }

    fn await_event<T>(
        &mut self,
        timeout: Duration,
        mut matcher: impl FnMut(&EngineEvent) -> Option<Result<T, ActionError>>,
    ) -> Result<T, ActionError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ActionError::TimedOut);
            }
            let Some(event) = self.runner.next_event(remaining.min(PUMP_INTERVAL))? else {
                continue;
            };
            let outcome = matcher(&event);
            self.dispatch(event_to_msg(event));
            if let Some(outcome) = outcome {
                engine_debug!("Action finished: {}", self.view().headline);
                return outcome;
            }
        }
    }
}
