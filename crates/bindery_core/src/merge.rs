//! Reconciliation of the local job list with server snapshots and optimistic updates.
//!
//! Everything here is pure so the race between polling and direct action
//! responses can be tested without timers or a server.
use std::collections::HashSet;

use crate::{Job, JobId};

/// Where an incoming batch of jobs came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeSource {
    /// Full server list; replaces local state wholesale.
    Snapshot,
    /// Direct creation response: the job moves to the head of the list.
    Insert,
    /// Direct action response: replaces the job in place, or prepends it if unknown.
    Upsert,
}

/// Merge `incoming` into `current` and return the next list.
///
/// The result never holds two jobs with the same id. For optimistic sources
/// the incoming jobs are applied in order, so the last one inserted ends up first.
pub fn merge(current: &[Job], incoming: Vec<Job>, source: MergeSource) -> Vec<Job> {
    match source {
        MergeSource::Snapshot => dedupe(incoming),
        MergeSource::Insert => incoming
            .into_iter()
            .fold(current.to_vec(), |mut jobs, job| {
                jobs.retain(|existing| existing.id != job.id);
                jobs.insert(0, job);
                jobs
            }),
        MergeSource::Upsert => incoming
            .into_iter()
            .fold(current.to_vec(), |mut jobs, job| {
                match jobs.iter_mut().find(|existing| existing.id == job.id) {
                    Some(slot) => *slot = job,
                    None => jobs.insert(0, job),
                }
                jobs
            }),
    }
}

/// Drop the job with `id`, if present.
pub fn remove(current: &[Job], id: &str) -> Vec<Job> {
    current.iter().filter(|job| job.id != id).cloned().collect()
}

// The first occurrence wins; later duplicates in a snapshot are discarded.
fn dedupe(jobs: Vec<Job>) -> Vec<Job> {
    let mut seen = HashSet::with_capacity(jobs.len());
    jobs.into_iter()
        .filter(|job| seen.insert(job.id.clone()))
        .collect()
}

/// Ordered job list, newest first, at most one entry per id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobList {
    jobs: Vec<Job>,
}

impl JobList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_server_snapshot(&mut self, jobs: Vec<Job>) {
        self.jobs = merge(&self.jobs, jobs, MergeSource::Snapshot);
    }

    pub fn apply_optimistic_insert(&mut self, job: Job) {
        self.jobs = merge(&self.jobs, vec![job], MergeSource::Insert);
    }

    pub fn apply_optimistic_upsert(&mut self, job: Job) {
        self.jobs = merge(&self.jobs, vec![job], MergeSource::Upsert);
    }

    pub fn apply_removal(&mut self, id: &str) {
        self.jobs = remove(&self.jobs, id);
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn ids(&self) -> Vec<JobId> {
        self.jobs.iter().map(|job| job.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn as_slice(&self) -> &[Job] {
        &self.jobs
    }
}
