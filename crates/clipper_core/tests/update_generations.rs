use clipper_core::{update, AppState, ClientState, CrawlMode, CrawlRequest, Effect, Msg};
use pretty_assertions::assert_eq;

fn init_logging() {
    engine_logging::initialize_for_tests();
}

fn request(url: &str) -> Msg {
    Msg::SubmitRequested(CrawlRequest::new(url, CrawlMode::Single))
}

#[test]
fn resubmitting_while_processing_cancels_previous_tracking() {
    init_logging();
    let (state, _) = update(AppState::new(), request("https://a.example.com"));
    let (state, _) = update(
        state,
        Msg::SubmitSucceeded {
            generation: 1,
            task_id: "old".to_string(),
        },
    );

    let (state, effects) = update(state, request("https://b.example.com"));

    assert_eq!(
        effects,
        vec![
            Effect::CancelTracking { generation: 1 },
            Effect::SubmitTask {
                generation: 2,
                request: CrawlRequest::new("https://b.example.com", CrawlMode::Single),
            },
        ]
    );
    assert_eq!(*state.phase(), ClientState::Submitting);
}

#[test]
fn events_from_abandoned_submission_are_discarded() {
    init_logging();
    let (state, _) = update(AppState::new(), request("https://a.example.com"));
    let (state, _) = update(
        state,
        Msg::SubmitSucceeded {
            generation: 1,
            task_id: "old".to_string(),
        },
    );
    let (state, _) = update(state, request("https://b.example.com"));

    let (state, _) = update(
        state,
        Msg::SubmitSucceeded {
            generation: 1,
            task_id: "old-again".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::TaskCompleted {
            generation: 1,
            markdown: "stale".to_string(),
        },
    );
    assert_eq!(*state.phase(), ClientState::Submitting);

    let (state, _) = update(
        state,
        Msg::SubmitSucceeded {
            generation: 2,
            task_id: "new".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::TaskCompleted {
            generation: 2,
            markdown: "fresh".to_string(),
        },
    );
    match state.phase() {
        ClientState::Completed {
            markdown,
            source_url,
            task_id,
            ..
        } => {
            assert_eq!(markdown, "fresh");
            assert_eq!(source_url, "https://b.example.com");
            assert_eq!(task_id, "new");
        }
        other => panic!("unexpected phase {other:?}"),
    }
}

#[test]
fn late_save_result_is_dropped_after_new_submission() {
    init_logging();
    let (state, _) = update(AppState::new(), request("https://a.example.com"));
    let (state, _) = update(
        state,
        Msg::SubmitSucceeded {
            generation: 1,
            task_id: "t1".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::TaskCompleted {
            generation: 1,
            markdown: "X".to_string(),
        },
    );
    let (state, save_effects) = update(state, Msg::SaveClicked);
    assert_eq!(save_effects.len(), 1);

    // Leaving Completed through a new submission must not cancel tracking.
    let (state, effects) = update(state, request("https://b.example.com"));
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::CancelTracking { .. })));

    let (state, _) = update(
        state,
        Msg::SaveFinished {
            generation: 1,
            saved_path: Some("/tmp/a.md".to_string()),
        },
    );
    assert_eq!(*state.phase(), ClientState::Submitting);
}

#[test]
fn reset_returns_to_idle_and_invalidates_generation() {
    init_logging();
    let (state, _) = update(AppState::new(), request("https://a.example.com"));
    let (state, _) = update(
        state,
        Msg::SubmitSucceeded {
            generation: 1,
            task_id: "t1".to_string(),
        },
    );

    let (state, effects) = update(state, Msg::ResetClicked);
    assert_eq!(effects, vec![Effect::CancelTracking { generation: 1 }]);
    assert_eq!(*state.phase(), ClientState::Idle);

    let (state, _) = update(
        state,
        Msg::TaskProgress {
            generation: 1,
            progress: 50,
            total_pages: 2,
            processed_pages: 1,
        },
    );
    assert_eq!(*state.phase(), ClientState::Idle);
}
