use bindery_core::{
    update, AppState, BatchSummary, Bundle, Effect, Job, JobSettings, JobStatus, Msg,
    NotificationLevel, PageSize, PlainFile, PreferencesPatch, Rejection, RejectionReason,
    UploadInput, UploadOutcome, EPUB_MIME_TYPE,
};
use bytes::Bytes;
use pretty_assertions::assert_eq;

fn job(id: &str, name: &str) -> Job {
    Job {
        id: id.to_string(),
        original_filename: name.to_string(),
        status: JobStatus::Queued,
        created_at: "2024-05-01T10:00:00".to_string(),
        updated_at: None,
        completed_at: None,
        size_bytes: Some(4096),
        settings: JobSettings::default(),
        download_url: None,
        error: None,
    }
}

fn file(name: &str) -> UploadInput {
    UploadInput::PlainFile(PlainFile {
        name: name.to_string(),
        content: Bytes::from_static(b"PK\x03\x04"),
    })
}

fn submit(state: AppState, inputs: Vec<UploadInput>) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::UploadBatchSubmitted {
            inputs,
            rejected: Vec::new(),
        },
    )
}

fn upload_target(effects: &[Effect]) -> (u64, usize, String) {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::Upload {
                batch_id,
                index,
                input,
                ..
            } => Some((*batch_id, *index, input.filename().to_string())),
            _ => None,
        })
        .expect("upload effect")
}

fn finish(
    state: AppState,
    effects: &[Effect],
    result: Result<UploadOutcome, String>,
) -> (AppState, Vec<Effect>) {
    let (batch_id, index, _) = upload_target(effects);
    update(
        state,
        Msg::UploadItemFinished {
            batch_id,
            index,
            result,
        },
    )
}

fn fetch_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::FetchJobs))
        .count()
}

#[test]
fn batch_uploads_sequentially_and_refreshes_once_after_partial_failure() {
    let (state, effects) = submit(
        AppState::new(),
        vec![file("one.epub"), file("two.epub"), file("three.epub")],
    );
    assert_eq!(effects.len(), 1);
    assert_eq!(upload_target(&effects), (1, 0, "one.epub".to_string()));

    let mut refreshes = 0;
    let (state, effects) = finish(
        state,
        &effects,
        Ok(UploadOutcome::Created(job("job-1", "one.epub"))),
    );
    refreshes += fetch_count(&effects);
    assert_eq!(upload_target(&effects), (1, 1, "two.epub".to_string()));

    let (state, effects) = finish(state, &effects, Err("connection reset".to_string()));
    refreshes += fetch_count(&effects);
    assert_eq!(upload_target(&effects), (1, 2, "three.epub".to_string()));

    let (mut state, effects) = finish(
        state,
        &effects,
        Ok(UploadOutcome::Created(job("job-3", "three.epub"))),
    );
    refreshes += fetch_count(&effects);
    assert_eq!(effects, vec![Effect::FetchJobs]);
    assert_eq!(refreshes, 1);

    assert_eq!(state.jobs().ids(), vec!["job-3".to_string(), "job-1".to_string()]);
    let view = state.view();
    assert_eq!(
        view.last_batch,
        Some(BatchSummary {
            created: 2,
            skipped: 0,
            failed: 1,
            rejected: 0,
        })
    );
    assert!(!view.uploading);

    let errors: Vec<_> = state
        .take_notifications()
        .into_iter()
        .filter(|note| note.level == NotificationLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].text.contains("two.epub"));
}

#[test]
fn upload_carries_current_settings() {
    let (state, _) = update(
        AppState::new(),
        Msg::PreferencesChanged(PreferencesPatch {
            page_size: Some(PageSize::Letter),
            margin_mm: Some(22.0),
            force_regenerate: Some(true),
            ..PreferencesPatch::default()
        }),
    );
    let (_state, effects) = submit(state, vec![file("book.epub")]);

    match &effects[0] {
        Effect::Upload { settings, .. } => {
            assert_eq!(settings.page_size, PageSize::Letter);
            assert_eq!(settings.margin_mm, 22.0);
            assert!(settings.force);
        }
        other => panic!("unexpected effect {other:?}"),
    }
}

#[test]
fn wrong_extension_is_rejected_without_network() {
    let (mut state, effects) = submit(AppState::new(), vec![file("notes.pdf"), file("book.txt")]);

    assert!(effects.is_empty());
    assert!(state.is_settled());
    let notes = state.take_notifications();
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().all(|n| n.level == NotificationLevel::Error));
    assert_eq!(state.view().last_batch.map(|s| s.rejected), Some(2));
}

#[test]
fn mixed_batch_uploads_only_accepted_inputs() {
    let bundle = UploadInput::Bundle(Bundle {
        filename: "My_Book.epub".to_string(),
        mime_type: EPUB_MIME_TYPE.to_string(),
        payload: Bytes::from_static(b"PK"),
    });
    let (state, effects) = update(
        AppState::new(),
        Msg::UploadBatchSubmitted {
            inputs: vec![file("cover.png"), bundle],
            rejected: vec![Rejection {
                name: "empty-folder".to_string(),
                reason: RejectionReason::EmptyDirectory,
            }],
        },
    );
    assert_eq!(upload_target(&effects), (1, 0, "My_Book.epub".to_string()));

    let (state, _) = finish(
        state,
        &effects,
        Ok(UploadOutcome::Created(job("job-9", "My_Book.epub"))),
    );
    assert_eq!(
        state.view().last_batch,
        Some(BatchSummary {
            created: 1,
            skipped: 0,
            failed: 0,
            rejected: 2,
        })
    );
}

#[test]
fn skipped_upload_moves_existing_job_to_front() {
    let (state, _) = update(AppState::new(), Msg::RefreshRequested);
    let (state, _) = update(
        state,
        Msg::JobsLoaded(Ok(vec![job("newer", "b.epub"), job("cached", "a.epub")])),
    );

    let (state, effects) = submit(state, vec![file("a.epub")]);
    let mut reused = job("cached", "a.epub");
    reused.status = JobStatus::Completed;
    reused.updated_at = Some("2024-04-30T08:00:00".to_string());
    let (state, _) = finish(state, &effects, Ok(UploadOutcome::Skipped(reused.clone())));

    assert_eq!(state.jobs().ids(), vec!["cached".to_string(), "newer".to_string()]);
    // The server timestamp is kept as-is.
    assert_eq!(state.jobs().get("cached"), Some(&reused));
    assert_eq!(state.view().last_batch.map(|s| s.skipped), Some(1));
}

#[test]
fn second_batch_is_deferred_until_first_completes() {
    let (state, first) = submit(AppState::new(), vec![file("one.epub")]);
    let (state, deferred) = submit(state, vec![file("two.epub")]);
    assert!(deferred.is_empty());
    assert_eq!(state.view().queued_batches, 1);

    let (state, effects) = finish(
        state,
        &first,
        Ok(UploadOutcome::Created(job("job-1", "one.epub"))),
    );
    assert_eq!(effects[0], Effect::FetchJobs);
    let (batch_id, index, name) = upload_target(&effects);
    assert_eq!((batch_id, index, name.as_str()), (2, 0, "two.epub"));
    assert_eq!(state.view().queued_batches, 0);
    assert!(!state.is_settled());
}

#[test]
fn post_batch_refresh_waits_behind_in_flight_poll() {
    let (state, effects) = submit(AppState::new(), vec![file("one.epub")]);
    let (state, manual) = update(state, Msg::RefreshRequested);
    assert_eq!(fetch_count(&manual), 1);

    let (state, after_batch) = finish(
        state,
        &effects,
        Ok(UploadOutcome::Created(job("job-1", "one.epub"))),
    );
    assert_eq!(fetch_count(&after_batch), 0);

    // The poll that started before the upload finished does not know the job yet.
    let (state, settled) = update(state, Msg::JobsLoaded(Ok(Vec::new())));
    assert_eq!(settled, vec![Effect::FetchJobs]);

    let (state, _) = update(
        state,
        Msg::JobsLoaded(Ok(vec![job("job-1", "one.epub")])),
    );
    assert_eq!(state.jobs().ids(), vec!["job-1".to_string()]);
    assert!(state.is_settled());
}

#[test]
fn results_for_unknown_uploads_are_ignored() {
    let (state, effects) = update(
        AppState::new(),
        Msg::UploadItemFinished {
            batch_id: 42,
            index: 0,
            result: Ok(UploadOutcome::Created(job("ghost", "ghost.epub"))),
        },
    );
    assert!(effects.is_empty());
    assert!(state.jobs().is_empty());
}

#[test]
fn dropped_paths_wait_for_preparation() {
    let (state, effects) = update(
        AppState::new(),
        Msg::PathsDropped(vec!["/books/MyBook".into()]),
    );
    assert_eq!(
        effects,
        vec![Effect::PrepareUploads {
            paths: vec!["/books/MyBook".into()]
        }]
    );
    assert!(!state.is_settled());

    let (state, effects) = update(
        state,
        Msg::InputsPrepared {
            inputs: Vec::new(),
            rejected: vec![Rejection {
                name: "MyBook".to_string(),
                reason: RejectionReason::BuildFailed("disk read failed".to_string()),
            }],
        },
    );
    assert!(effects.is_empty());
    assert!(state.is_settled());
}
