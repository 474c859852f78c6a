use bindery_core::{merge, Job, JobList, JobSettings, JobStatus, MergeSource};
use pretty_assertions::assert_eq;

fn job(id: &str, status: JobStatus) -> Job {
    Job {
        id: id.to_string(),
        original_filename: format!("{id}.epub"),
        status,
        created_at: "2024-05-01T10:00:00".to_string(),
        updated_at: None,
        completed_at: None,
        size_bytes: Some(2048),
        settings: JobSettings::default(),
        download_url: None,
        error: None,
    }
}

fn ids(jobs: &[Job]) -> Vec<&str> {
    jobs.iter().map(|job| job.id.as_str()).collect()
}

/// A handful of list shapes used to exercise the merge rules.
fn fixtures() -> Vec<Vec<Job>> {
    vec![
        Vec::new(),
        vec![job("a", JobStatus::Queued)],
        vec![
            job("c", JobStatus::Processing),
            job("b", JobStatus::Completed),
            job("a", JobStatus::Failed),
        ],
        vec![job("x", JobStatus::Canceled), job("a", JobStatus::Queued)],
    ]
}

#[test]
fn repeated_snapshot_is_idempotent() {
    for current in fixtures() {
        for snapshot in fixtures() {
            let once = merge(&current, snapshot.clone(), MergeSource::Snapshot);
            let twice = merge(&once, snapshot.clone(), MergeSource::Snapshot);
            assert_eq!(once, twice);
        }
    }
}

#[test]
fn snapshot_replaces_local_only_jobs() {
    let current = vec![job("local", JobStatus::Queued), job("a", JobStatus::Queued)];
    let next = merge(&current, vec![job("a", JobStatus::Processing)], MergeSource::Snapshot);

    assert_eq!(next, vec![job("a", JobStatus::Processing)]);
}

#[test]
fn snapshot_with_duplicate_ids_keeps_first() {
    let snapshot = vec![
        job("a", JobStatus::Processing),
        job("b", JobStatus::Queued),
        job("a", JobStatus::Queued),
    ];
    let next = merge(&[], snapshot, MergeSource::Snapshot);

    assert_eq!(ids(&next), vec!["a", "b"]);
    assert_eq!(next[0].status, JobStatus::Processing);
}

#[test]
fn optimistic_insert_then_snapshot_has_single_server_entry() {
    for others in fixtures() {
        let mut list = JobList::new();
        list.apply_server_snapshot(others.clone());
        list.apply_optimistic_insert(job("new", JobStatus::Queued));
        assert_eq!(list.get("new").map(|j| j.status), Some(JobStatus::Queued));

        let mut server_version = job("new", JobStatus::Processing);
        server_version.updated_at = Some("2024-05-01T10:00:05".to_string());
        let mut snapshot = vec![server_version.clone()];
        snapshot.extend(others.iter().cloned());
        list.apply_server_snapshot(snapshot);

        let matching: Vec<&Job> = list.iter().filter(|j| j.id == "new").collect();
        assert_eq!(matching, vec![&server_version]);
    }
}

#[test]
fn insert_moves_existing_entry_to_front() {
    let current = vec![
        job("c", JobStatus::Queued),
        job("b", JobStatus::Completed),
        job("a", JobStatus::Completed),
    ];
    let mut refreshed = job("b", JobStatus::Completed);
    refreshed.download_url = Some("/api/jobs/b/download".to_string());

    let next = merge(&current, vec![refreshed.clone()], MergeSource::Insert);

    assert_eq!(ids(&next), vec!["b", "c", "a"]);
    assert_eq!(next[0], refreshed);
}

#[test]
fn upsert_replaces_in_place_and_prepends_unknown() {
    let current = vec![job("b", JobStatus::Failed), job("a", JobStatus::Completed)];

    let next = merge(&current, vec![job("a", JobStatus::Queued)], MergeSource::Upsert);
    assert_eq!(ids(&next), vec!["b", "a"]);
    assert_eq!(next[1].status, JobStatus::Queued);

    let next = merge(&next, vec![job("z", JobStatus::Queued)], MergeSource::Upsert);
    assert_eq!(ids(&next), vec!["z", "b", "a"]);
}

#[test]
fn optimistic_mutations_never_duplicate_ids() {
    let mut list = JobList::new();
    for round in 0..3 {
        for id in ["a", "b", "a", "c", "b"] {
            if round % 2 == 0 {
                list.apply_optimistic_insert(job(id, JobStatus::Queued));
            } else {
                list.apply_optimistic_upsert(job(id, JobStatus::Processing));
            }
            let mut seen = list.ids();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), list.len());
        }
    }
    assert_eq!(list.len(), 3);
}

#[test]
fn removal_only_drops_matching_id() {
    let mut list = JobList::new();
    list.apply_server_snapshot(vec![job("b", JobStatus::Completed), job("a", JobStatus::Failed)]);

    list.apply_removal("a");
    assert_eq!(list.ids(), vec!["b".to_string()]);

    list.apply_removal("missing");
    assert_eq!(list.len(), 1);
}
