//! Script execution with per-statement reporting.
//!
//! Two modes:
//!
//! - [`ExecutionMode::BestEffort`]: a failing statement is recorded and
//!   execution moves on to the next statement and file (initial build).
//!   A script that cannot be read is recorded the same way and skipped.
//! - [`ExecutionMode::Transactional`]: the first failing statement stops the
//!   run and is returned as an error; the caller rolls back (update).

mod report;

pub use report::{ExecutionReport, FileReport, StatementFailure};

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::traits::StatementRunner;
use crate::error::{Result, SchemaError};
use crate::scripts::{splitter_for, ClassifiedScripts, Phase, StatementSplitter};

/// Failure policy for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    BestEffort,
    Transactional,
}

/// Runs classified scripts against a [`StatementRunner`].
pub struct ScriptExecutor {
    statement_splitter: Box<dyn StatementSplitter>,
    procedure_splitter: Box<dyn StatementSplitter>,
}

impl Default for ScriptExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptExecutor {
    /// Executor with the default splitter of each phase.
    pub fn new() -> Self {
        Self {
            statement_splitter: splitter_for(Phase::Table),
            procedure_splitter: splitter_for(Phase::Procedure),
        }
    }

    /// Replace the splitter used for domain and table scripts.
    pub fn with_statement_splitter(mut self, splitter: Box<dyn StatementSplitter>) -> Self {
        self.statement_splitter = splitter;
        self
    }

    fn splitter(&self, phase: Phase) -> &dyn StatementSplitter {
        match phase {
            Phase::Procedure => self.procedure_splitter.as_ref(),
            Phase::Domain | Phase::Table => self.statement_splitter.as_ref(),
        }
    }

    /// Run every phase in dependency order.
    pub async fn execute_all<R>(
        &self,
        runner: &mut R,
        scripts: &ClassifiedScripts,
        mode: ExecutionMode,
    ) -> Result<ExecutionReport>
    where
        R: StatementRunner + ?Sized,
    {
        let mut report = ExecutionReport::default();
        for (phase, files) in scripts.phases() {
            self.execute_phase(runner, phase, files, mode, &mut report)
                .await?;
        }
        Ok(report)
    }

    /// Run the files of one phase, appending results to `report`.
    ///
    /// In transactional mode the first failing statement is recorded and
    /// returned as [`SchemaError::StatementExecution`].
    pub async fn execute_phase<R>(
        &self,
        runner: &mut R,
        phase: Phase,
        files: &[PathBuf],
        mode: ExecutionMode,
        report: &mut ExecutionReport,
    ) -> Result<()>
    where
        R: StatementRunner + ?Sized,
    {
        if files.is_empty() {
            debug!("No {} scripts", phase);
            return Ok(());
        }

        let start = Instant::now();
        info!("Running {} phase: {} file(s)", phase, files.len());

        for file in files {
            self.execute_file(runner, phase, file, mode, report).await?;
        }

        let (attempted, succeeded) = report.phase_totals(phase);
        info!(
            "{} phase done in {:?}: {}/{} statements succeeded",
            phase,
            start.elapsed(),
            succeeded,
            attempted
        );
        Ok(())
    }

    async fn execute_file<R>(
        &self,
        runner: &mut R,
        phase: Phase,
        file: &Path,
        mode: ExecutionMode,
        report: &mut ExecutionReport,
    ) -> Result<()>
    where
        R: StatementRunner + ?Sized,
    {
        let script = match std::fs::read_to_string(file) {
            Ok(script) => script,
            Err(e) if mode == ExecutionMode::BestEffort => {
                let message = format!("cannot read script: {}", e);
                warn!("Skipping {}: {}", file.display(), message);
                report.failures.push(StatementFailure {
                    file: file.to_path_buf(),
                    phase,
                    statement: String::new(),
                    error: message,
                });
                report.files.push(FileReport::new(file, phase));
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let statements = self.splitter(phase).split(&script);
        debug!("{}: {} statement(s)", file.display(), statements.len());

        let mut entry = FileReport::new(file, phase);

        for statement in statements {
            entry.attempted += 1;
            match runner.execute(statement).await {
                Ok(()) => entry.succeeded += 1,
                Err(e) => {
                    let message = e.to_string();
                    warn!("Statement failed in {}: {}", file.display(), message);
                    report.failures.push(StatementFailure {
                        file: file.to_path_buf(),
                        phase,
                        statement: statement.to_string(),
                        error: message.clone(),
                    });

                    if mode == ExecutionMode::Transactional {
                        report.files.push(entry);
                        return Err(SchemaError::statement(file, statement, message));
                    }
                }
            }
        }

        report.files.push(entry);
        Ok(())
    }
}
