//! Execution report types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scripts::Phase;

/// Statement counts for one script file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub phase: Phase,
    pub attempted: usize,
    pub succeeded: usize,
}

impl FileReport {
    pub fn new(path: &Path, phase: Phase) -> Self {
        Self {
            path: path.to_path_buf(),
            phase,
            attempted: 0,
            succeeded: 0,
        }
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

/// One failed statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementFailure {
    pub file: PathBuf,
    pub phase: Phase,
    pub statement: String,
    pub error: String,
}

/// Outcome of running one or more phases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Per-file counts, in execution order.
    pub files: Vec<FileReport>,
    /// Failed statements, in execution order.
    pub failures: Vec<StatementFailure>,
}

impl ExecutionReport {
    pub fn attempted(&self) -> usize {
        self.files.iter().map(|f| f.attempted).sum()
    }

    pub fn succeeded(&self) -> usize {
        self.files.iter().map(|f| f.succeeded).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// (attempted, succeeded) for one phase.
    pub fn phase_totals(&self, phase: Phase) -> (usize, usize) {
        self.files
            .iter()
            .filter(|f| f.phase == phase)
            .fold((0, 0), |(a, s), f| (a + f.attempted, s + f.succeeded))
    }
}
