//! Outcomes of a dispatched batch

use pcpe_bio::ArchiveReport;
use pcpe_core::{PcpeError, PcpeResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Result of processing a single archive
#[derive(Debug)]
pub struct ArchiveOutcome {
    pub path: PathBuf,
    pub result: PcpeResult<ArchiveReport>,
}

impl ArchiveOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Every archive outcome of a batch, in the order the paths were given
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<ArchiveOutcome>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn new(outcomes: Vec<ArchiveOutcome>, elapsed: Duration) -> Self {
        Self { outcomes, elapsed }
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ArchiveReport> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &PcpeError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.path.as_path(), e)))
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(ArchiveOutcome::is_success)
    }

    pub fn total_records(&self) -> usize {
        self.succeeded().map(|r| r.records).sum()
    }

    pub fn total_groups(&self) -> usize {
        self.succeeded().map(|r| r.groups).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.succeeded().map(ArchiveReport::skipped).sum()
    }

    /// Exit code of the first failure, or 0 when every archive succeeded
    pub fn exit_code(&self) -> i32 {
        self.failures()
            .next()
            .map(|(_, e)| e.exit_code())
            .unwrap_or(0)
    }
}
