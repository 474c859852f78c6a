use bindery_core::{Job, JobSettings, JobStatus, PageSize, DEFAULT_MARGIN_MM};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn sparse_job_decodes_with_defaults() {
    let job: Job = serde_json::from_value(json!({
        "id": "j1",
        "originalFilename": "novel.epub",
        "status": "queued",
        "createdAt": "2024-05-01T10:00:00",
        "settings": {},
        "pdfSha256": "ignored",
    }))
    .expect("decode");

    assert_eq!(job.id, "j1");
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.updated_at, None);
    assert_eq!(job.size_bytes, None);
    assert_eq!(job.download_url, None);
    assert_eq!(
        job.settings,
        JobSettings {
            page_size: PageSize::A4,
            margin_mm: DEFAULT_MARGIN_MM,
        }
    );
}

#[test]
fn missing_settings_object_uses_defaults() {
    let job: Job =
        serde_json::from_value(json!({"id": "j2", "status": "failed"})).expect("decode");

    assert_eq!(job.settings, JobSettings::default());
    assert_eq!(job.original_filename, "");
}

#[test]
fn unrecognised_status_does_not_break_the_list() {
    let jobs: Vec<Job> = serde_json::from_value(json!([
        {"id": "a", "status": "completed", "downloadUrl": "/download/a"},
        {"id": "b", "status": "archived", "downloadUrl": "/download/b"},
    ]))
    .expect("decode");

    assert_eq!(jobs[0].status, JobStatus::Completed);
    assert_eq!(jobs[1].status, JobStatus::Unknown);
    assert_eq!(jobs[1].status.label(), "unknown");
    assert!(jobs[1].available_actions().is_empty());
}
