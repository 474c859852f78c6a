use std::collections::VecDeque;

use crate::{Job, UploadInput};

pub type BatchId = u64;

/// Server reply to a job-creation request.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Created(Job),
    /// The server reused a cached result for identical input.
    Skipped(Job),
}

impl UploadOutcome {
    pub fn job(&self) -> &Job {
        match self {
            UploadOutcome::Created(job) | UploadOutcome::Skipped(job) => job,
        }
    }

    pub fn into_job(self) -> Job {
        match self {
            UploadOutcome::Created(job) | UploadOutcome::Skipped(job) => job,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    pub rejected: usize,
}

impl BatchSummary {
    pub fn attempted(&self) -> usize {
        self.created + self.skipped + self.failed
    }
}

/// The next item the orchestrator wants uploaded.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UploadRequest {
    pub batch_id: BatchId,
    pub index: usize,
    pub input: UploadInput,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ItemSettled {
    /// Result for an item that is not the one in flight.
    Ignored,
    Next { filename: String, request: UploadRequest },
    BatchDone {
        filename: String,
        summary: BatchSummary,
        next_batch: Option<UploadRequest>,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct PendingBatch {
    inputs: Vec<UploadInput>,
    rejected: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct ActiveBatch {
    id: BatchId,
    remaining: VecDeque<UploadInput>,
    in_flight: Option<(usize, String)>,
    next_index: usize,
    summary: BatchSummary,
}

impl ActiveBatch {
    fn take_next(&mut self) -> Option<UploadRequest> {
        let input = self.remaining.pop_front()?;
        let index = self.next_index;
        self.next_index += 1;
        self.in_flight = Some((index, input.filename().to_string()));
        Some(UploadRequest {
            batch_id: self.id,
            index,
            input,
        })
    }
}

/// Sequential upload orchestration: one batch at a time, one item at a time.
///
/// A batch submitted while another is uploading waits in `deferred`.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct UploadQueue {
    next_batch_id: BatchId,
    active: Option<ActiveBatch>,
    deferred: VecDeque<PendingBatch>,
}

impl UploadQueue {
    /// Returns the first request when the batch starts immediately, None when deferred.
    pub(crate) fn submit(
        &mut self,
        inputs: Vec<UploadInput>,
        rejected: usize,
    ) -> Option<UploadRequest> {
        let pending = PendingBatch { inputs, rejected };
        if self.active.is_some() {
            self.deferred.push_back(pending);
            return None;
        }
        self.start(pending)
    }

    /// Record the result of the item in flight; `None` means it failed.
    pub(crate) fn settle(
        &mut self,
        batch_id: BatchId,
        index: usize,
        outcome: Option<&UploadOutcome>,
    ) -> ItemSettled {
        let Some(active) = self.active.as_mut() else {
            return ItemSettled::Ignored;
        };
        let filename = match &active.in_flight {
            Some((in_flight, name)) if active.id == batch_id && *in_flight == index => {
                name.clone()
            }
            _ => return ItemSettled::Ignored,
        };
        active.in_flight = None;
        match outcome {
            Some(UploadOutcome::Created(_)) => active.summary.created += 1,
            Some(UploadOutcome::Skipped(_)) => active.summary.skipped += 1,
            None => active.summary.failed += 1,
        }

        if let Some(request) = active.take_next() {
            return ItemSettled::Next { filename, request };
        }

        let summary = active.summary.clone();
        self.active = None;
        let next_batch = self.start_deferred();
        ItemSettled::BatchDone {
            filename,
            summary,
            next_batch,
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.active.is_none() && self.deferred.is_empty()
    }

    pub(crate) fn is_uploading(&self) -> bool {
        self.active.is_some()
    }

    pub(crate) fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    fn start_deferred(&mut self) -> Option<UploadRequest> {
        while let Some(pending) = self.deferred.pop_front() {
            if let Some(request) = self.start(pending) {
                return Some(request);
            }
        }
        None
    }

    fn start(&mut self, pending: PendingBatch) -> Option<UploadRequest> {
        if pending.inputs.is_empty() {
            return None;
        }
        self.next_batch_id += 1;
        let mut batch = ActiveBatch {
            id: self.next_batch_id,
            remaining: pending.inputs.into(),
            in_flight: None,
            next_index: 0,
            summary: BatchSummary {
                rejected: pending.rejected,
                ..BatchSummary::default()
            },
        };
        let first = batch.take_next();
        self.active = Some(batch);
        first
    }
}
