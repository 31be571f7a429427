use crate::{AppState, ClientState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages carrying a generation other than the state's current one come from
/// an abandoned submission and leave the state untouched.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubmitRequested(mut request) => {
            let url = request.url.trim();
            if url.is_empty() {
                return (state, Vec::new());
            }
            request.url = url.to_string();

            let mut effects = Vec::with_capacity(2);
            if state.phase().is_in_flight() {
                effects.push(Effect::CancelTracking {
                    generation: state.generation(),
                });
            }
            let generation = state.begin_submission(request.url.clone());
            effects.push(Effect::SubmitTask {
                generation,
                request,
            });
            effects
        }
        Msg::SubmitSucceeded {
            generation,
            task_id,
        } => {
            if state.is_current(generation) && *state.phase() == ClientState::Submitting {
                state.set_phase(ClientState::Processing {
                    task_id,
                    progress: 0,
                    total_pages: 0,
                    processed_pages: 0,
                });
            }
            Vec::new()
        }
        Msg::SubmitFailed {
            generation,
            message,
        } => {
            if state.is_current(generation) && *state.phase() == ClientState::Submitting {
                state.set_phase(ClientState::Error { message });
            }
            Vec::new()
        }
        Msg::TaskProgress {
            generation,
            progress,
            total_pages,
            processed_pages,
        } => {
            if state.is_current(generation) {
                if let ClientState::Processing { task_id, .. } = state.phase() {
                    let task_id = task_id.clone();
                    state.set_phase(ClientState::Processing {
                        task_id,
                        progress: progress.min(100),
                        total_pages,
                        processed_pages,
                    });
                }
            }
            Vec::new()
        }
        Msg::TaskCompleted {
            generation,
            markdown,
        } => {
            if state.is_current(generation) {
                if let ClientState::Processing { task_id, .. } = state.phase() {
                    let completed = ClientState::Completed {
                        markdown,
                        source_url: state.source_url().to_string(),
                        task_id: task_id.clone(),
                        saved_path: None,
                        upload_link: None,
                    };
                    state.set_phase(completed);
                }
            }
            Vec::new()
        }
        Msg::TaskFailed {
            generation,
            message,
        } => {
            if state.is_current(generation)
                && matches!(state.phase(), ClientState::Processing { .. })
            {
                state.set_phase(ClientState::Error { message });
            }
            Vec::new()
        }
        Msg::SaveClicked => match state.phase() {
            ClientState::Completed {
                markdown,
                source_url,
                ..
            } => vec![Effect::SaveMarkdown {
                generation: state.generation(),
                source_url: source_url.clone(),
                markdown: markdown.clone(),
            }],
            _ => Vec::new(),
        },
        Msg::SaveFinished {
            generation,
            saved_path,
        } => {
            if let (true, Some(path)) = (state.is_current(generation), saved_path) {
                annotate_completed(&mut state, |saved, _| *saved = Some(path));
            }
            Vec::new()
        }
        Msg::UploadClicked {
            access_token,
            filename,
        } => match state.phase() {
            ClientState::Completed { task_id, .. } => vec![Effect::UploadMarkdown {
                generation: state.generation(),
                task_id: task_id.clone(),
                access_token,
                filename,
            }],
            _ => Vec::new(),
        },
        Msg::UploadFinished { generation, result } => {
            // Failures stay with the caller; the user simply retries.
            if let (true, Ok(upload)) = (state.is_current(generation), result) {
                annotate_completed(&mut state, |_, link| *link = Some(upload.web_link));
            }
            Vec::new()
        }
        Msg::ResetClicked => {
            let mut effects = Vec::new();
            if state.phase().is_in_flight() {
                effects.push(Effect::CancelTracking {
                    generation: state.generation(),
                });
            }
            state.reset();
            effects
        }
        Msg::EngineStopped { message } => {
            if state.phase().is_in_flight() {
                state.set_phase(ClientState::Error { message });
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn annotate_completed(
    state: &mut AppState,
    apply: impl FnOnce(&mut Option<String>, &mut Option<String>),
) {
    let mut next = state.phase().clone();
    if let ClientState::Completed {
        saved_path,
        upload_link,
        ..
    } = &mut next
    {
        apply(saved_path, upload_link);
        state.set_phase(next);
    }
}
