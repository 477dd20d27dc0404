//! Bucket status records into ok / fail / other.

use serde::Serialize;

use crate::status::{EntityStatusRecord, Mode};

/// Counts produced by one classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationCounts {
    pub ok: usize,
    pub fail: usize,
    pub other: usize,
    pub timed_out: bool,
}

impl ClassificationCounts {
    /// Counts for a fetch that never completed.
    pub fn timed_out() -> Self {
        Self {
            timed_out: true,
            ..Self::default()
        }
    }

    /// Entities that were actually judged (excludes suppressed ones).
    pub fn judged(&self) -> usize {
        self.ok + self.fail
    }

    pub fn total(&self) -> usize {
        self.ok + self.fail + self.other
    }

    fn add(mut self, bucket: Bucket) -> Self {
        match bucket {
            Bucket::Ok => self.ok += 1,
            Bucket::Fail => self.fail += 1,
            Bucket::Other => self.other += 1,
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Ok,
    Fail,
    Other,
}

/// Classification inputs that do not change between records.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    pub mode: Mode,
    pub exclude: Option<&'a str>,
    pub honor_soft_state: bool,
}

impl Classifier<'_> {
    /// First matching rule wins. Name exclusion beats everything, including a
    /// good status; suppression reasons only apply to non-good rows.
    pub fn bucket(&self, record: &EntityStatusRecord) -> Bucket {
        if let Some(pattern) = self.exclude {
            if record.name().contains(pattern) {
                return Bucket::Other;
            }
        }
        if record.status == self.mode.good_status() {
            return Bucket::Ok;
        }
        if record.in_scheduled_downtime
            || record.has_been_acknowledged
            || record.notifications_disabled()
            || (self.honor_soft_state && record.is_soft_state())
        {
            return Bucket::Other;
        }
        Bucket::Fail
    }

    pub fn classify(&self, records: &[EntityStatusRecord]) -> ClassificationCounts {
        records
            .iter()
            .fold(ClassificationCounts::default(), |counts, record| {
                counts.add(self.bucket(record))
            })
    }
}

/// Classify `records` for `mode`. An empty slice yields all-zero counts.
pub fn classify(
    mode: Mode,
    records: &[EntityStatusRecord],
    exclude: Option<&str>,
    honor_soft_state: bool,
) -> ClassificationCounts {
    Classifier {
        mode,
        exclude,
        honor_soft_state,
    }
    .classify(records)
}
