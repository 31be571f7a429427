use std::sync::Once;

use clipper_core::{
    update, AppState, ClientState, CrawlMode, CrawlRequest, Effect, Generation, Msg,
    UploadResult,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn submit(state: AppState, url: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::SubmitRequested(CrawlRequest::new(url, CrawlMode::Single)),
    )
}

fn submitted_generation(effects: &[Effect]) -> Generation {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::SubmitTask { generation, .. } => Some(*generation),
            _ => None,
        })
        .expect("submit effect")
}

/// Drives a fresh state to `Completed` with the given markdown.
fn completed(markdown: &str) -> (AppState, Generation) {
    let (state, effects) = submit(AppState::new(), "https://docs.example.com");
    let generation = submitted_generation(&effects);
    let (state, _) = update(
        state,
        Msg::SubmitSucceeded {
            generation,
            task_id: "t1".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::TaskCompleted {
            generation,
            markdown: markdown.to_string(),
        },
    );
    (state, generation)
}

#[test]
fn submit_moves_idle_to_submitting_and_emits_request() {
    init_logging();
    let (mut state, effects) = submit(AppState::new(), "  https://docs.example.com  ");

    assert_eq!(*state.phase(), ClientState::Submitting);
    assert!(state.consume_dirty());
    assert_eq!(
        effects,
        vec![Effect::SubmitTask {
            generation: 1,
            request: CrawlRequest::new("https://docs.example.com", CrawlMode::Single),
        }]
    );
}

#[test]
fn blank_url_is_ignored() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "   ");

    assert_eq!(*state.phase(), ClientState::Idle);
    assert!(effects.is_empty());
}

#[test]
fn happy_path_reaches_completed_with_source_url() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://docs.example.com");
    let generation = submitted_generation(&effects);

    let (state, _) = update(
        state,
        Msg::SubmitSucceeded {
            generation,
            task_id: "t1".to_string(),
        },
    );
    assert_eq!(
        *state.phase(),
        ClientState::Processing {
            task_id: "t1".to_string(),
            progress: 0,
            total_pages: 0,
            processed_pages: 0,
        }
    );

    let (state, _) = update(
        state,
        Msg::TaskProgress {
            generation,
            progress: 40,
            total_pages: 5,
            processed_pages: 2,
        },
    );
    assert_eq!(
        state.view().headline,
        "Converting... 40% (2/5 pages)".to_string()
    );

    let (state, _) = update(
        state,
        Msg::TaskCompleted {
            generation,
            markdown: "# Title\n...".to_string(),
        },
    );
    assert_eq!(
        *state.phase(),
        ClientState::Completed {
            markdown: "# Title\n...".to_string(),
            source_url: "https://docs.example.com".to_string(),
            task_id: "t1".to_string(),
            saved_path: None,
            upload_link: None,
        }
    );
}

#[test]
fn progress_updates_replace_fields() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://example.com");
    let generation = submitted_generation(&effects);
    let (state, _) = update(
        state,
        Msg::SubmitSucceeded {
            generation,
            task_id: "t9".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::TaskProgress {
            generation,
            progress: 70,
            total_pages: 10,
            processed_pages: 7,
        },
    );
    // A lagging poll may report less than the stream did; it is taken as-is.
    let (state, _) = update(
        state,
        Msg::TaskProgress {
            generation,
            progress: 0,
            total_pages: 0,
            processed_pages: 0,
        },
    );

    assert_eq!(
        *state.phase(),
        ClientState::Processing {
            task_id: "t9".to_string(),
            progress: 0,
            total_pages: 0,
            processed_pages: 0,
        }
    );
}

#[test]
fn submit_failure_surfaces_error_and_manual_retry_restarts() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://example.com");
    let generation = submitted_generation(&effects);
    let (state, _) = update(
        state,
        Msg::SubmitFailed {
            generation,
            message: "Submit failed: 502".to_string(),
        },
    );
    assert_eq!(
        *state.phase(),
        ClientState::Error {
            message: "Submit failed: 502".to_string()
        }
    );
    assert_eq!(state.view().headline, "Error: Submit failed: 502");

    let (state, effects) = submit(state, "https://example.com");
    assert_eq!(*state.phase(), ClientState::Submitting);
    assert_eq!(submitted_generation(&effects), generation + 1);
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::CancelTracking { .. })));
}

#[test]
fn task_failure_moves_processing_to_error() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://example.com");
    let generation = submitted_generation(&effects);
    let (state, _) = update(
        state,
        Msg::SubmitSucceeded {
            generation,
            task_id: "t1".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::TaskFailed {
            generation,
            message: "Crawl failed".to_string(),
        },
    );

    assert_eq!(
        *state.phase(),
        ClientState::Error {
            message: "Crawl failed".to_string()
        }
    );
}

#[test]
fn terminal_states_ignore_late_progress() {
    init_logging();
    let (state, generation) = completed("X");
    let before = state.phase().clone();

    let (state, _) = update(
        state,
        Msg::TaskProgress {
            generation,
            progress: 10,
            total_pages: 1,
            processed_pages: 0,
        },
    );
    let (state, _) = update(
        state,
        Msg::TaskFailed {
            generation,
            message: "late".to_string(),
        },
    );

    assert_eq!(*state.phase(), before);
}

#[test]
fn save_emits_effect_and_attaches_path() {
    init_logging();
    let (state, generation) = completed("X");

    let (state, effects) = update(state, Msg::SaveClicked);
    assert_eq!(
        effects,
        vec![Effect::SaveMarkdown {
            generation,
            source_url: "https://docs.example.com".to_string(),
            markdown: "X".to_string(),
        }]
    );

    let (state, _) = update(
        state,
        Msg::SaveFinished {
            generation,
            saved_path: Some("/tmp/docs.example.com.md".to_string()),
        },
    );
    match state.phase() {
        ClientState::Completed { saved_path, .. } => {
            assert_eq!(saved_path.as_deref(), Some("/tmp/docs.example.com.md"));
        }
        other => panic!("unexpected phase {other:?}"),
    }
}

#[test]
fn failed_save_leaves_completed_unchanged() {
    init_logging();
    let (state, generation) = completed("X");
    let before = state.phase().clone();

    let (state, _) = update(
        state,
        Msg::SaveFinished {
            generation,
            saved_path: None,
        },
    );

    assert_eq!(*state.phase(), before);
}

#[test]
fn upload_success_attaches_link() {
    init_logging();
    let (state, generation) = completed("X");

    let (state, effects) = update(
        state,
        Msg::UploadClicked {
            access_token: "tok".to_string(),
            filename: None,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::UploadMarkdown {
            generation,
            task_id: "t1".to_string(),
            access_token: "tok".to_string(),
            filename: None,
        }]
    );

    let (state, _) = update(
        state,
        Msg::UploadFinished {
            generation,
            result: Ok(UploadResult {
                file_id: "f1".to_string(),
                display_name: "docs.md".to_string(),
                web_link: "https://drive.example.com/f1".to_string(),
            }),
        },
    );
    match state.phase() {
        ClientState::Completed { upload_link, .. } => {
            assert_eq!(upload_link.as_deref(), Some("https://drive.example.com/f1"));
        }
        other => panic!("unexpected phase {other:?}"),
    }
}

#[test]
fn upload_auth_failure_leaves_completed_unchanged() {
    init_logging();
    let (state, generation) = completed("X");
    let before = state.phase().clone();

    let (mut state, _) = update(
        state,
        Msg::UploadFinished {
            generation,
            result: Err("access token rejected".to_string()),
        },
    );

    assert_eq!(*state.phase(), before);
    assert!(matches!(state.phase(), ClientState::Completed { upload_link: None, .. }));
    state.consume_dirty();
    assert!(!state.consume_dirty());
}

#[test]
fn post_completion_actions_need_completed_state() {
    init_logging();
    let (state, _) = submit(AppState::new(), "https://example.com");

    let (state, effects) = update(state, Msg::SaveClicked);
    assert!(effects.is_empty());
    let (_state, effects) = update(
        state,
        Msg::UploadClicked {
            access_token: "tok".to_string(),
            filename: None,
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn stopped_engine_fails_the_job_in_flight() {
    init_logging();
    let (state, _) = submit(AppState::new(), "https://docs.example.com");

    let (state, effects) = update(
        state,
        Msg::EngineStopped {
            message: "engine worker stopped".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(
        *state.phase(),
        ClientState::Error {
            message: "engine worker stopped".to_string()
        }
    );
}

#[test]
fn stopped_engine_leaves_completed_result_alone() {
    init_logging();
    let (state, _) = completed("# Kept");

    let (next, _) = update(
        state.clone(),
        Msg::EngineStopped {
            message: "engine worker stopped".to_string(),
        },
    );

    assert_eq!(next.phase(), state.phase());
}
