use crate::view_model::AppViewModel;
use crate::Generation;

/// UI-facing phase of the single job an orchestrator tracks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClientState {
    #[default]
    Idle,
    Submitting,
    Processing {
        task_id: String,
        progress: u8,
        total_pages: u32,
        processed_pages: u32,
    },
    Completed {
        markdown: String,
        source_url: String,
        task_id: String,
        saved_path: Option<String>,
        upload_link: Option<String>,
    },
    Error {
        message: String,
    },
}

impl ClientState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ClientState::Submitting | ClientState::Processing { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    phase: ClientState,
    generation: Generation,
    source_url: String,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_phase(&self.phase, self.dirty)
    }

    pub fn phase(&self) -> &ClientState {
        &self.phase
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
    }

    /// Starts a new submission, invalidating everything tagged with the old generation.
    pub(crate) fn begin_submission(&mut self, source_url: String) -> Generation {
        self.generation += 1;
        self.source_url = source_url;
        self.phase = ClientState::Submitting;
        self.dirty = true;
        self.generation
    }

    pub(crate) fn reset(&mut self) {
        self.generation += 1;
        self.source_url.clear();
        self.set_phase(ClientState::Idle);
    }

    pub(crate) fn source_url(&self) -> &str {
        &self.source_url
    }

    pub(crate) fn set_phase(&mut self, phase: ClientState) {
        if self.phase != phase {
            self.phase = phase;
            self.dirty = true;
        }
    }
}
