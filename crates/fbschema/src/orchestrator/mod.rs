//! Workflow coordinator: build, export and update.
//!
//! Each workflow owns its session from open to close. Sessions are closed on
//! every exit path; an update also commits or rolls back its transaction
//! before closing.

mod output;

pub use output::{
    append_error_log, procedure_file_name, BUILD_REPORT, DOMAINS_FILE, ERROR_LOG, TABLES_FILE,
};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::catalog::CatalogReader;
use crate::config::Config;
use crate::core::schema::{DomainDescriptor, ProcedureDescriptor, TableDescriptor};
use crate::core::traits::{Connector, Session};
use crate::error::{Result, SchemaError};
use crate::executor::{ExecutionMode, ExecutionReport, ScriptExecutor};
use crate::scripts::{self, ClassifiedScripts};

/// Workflow coordinator over a [`Connector`].
pub struct Orchestrator<C: Connector> {
    config: Config,
    connector: C,
    executor: ScriptExecutor,
}

/// Result of a build run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOutcome {
    /// Unique run identifier.
    pub run_id: String,

    /// "completed", or "completed_with_errors" when any statement failed.
    pub status: String,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: f64,

    /// Database file that was created.
    pub database_path: PathBuf,

    pub scripts_dir: PathBuf,

    /// `*.sql` files that matched no phase and were skipped.
    pub unclassified: Vec<PathBuf>,

    pub report: ExecutionReport,
}

/// Result of an export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub output_dir: PathBuf,
    pub domains: usize,
    pub tables: usize,
    pub procedures: usize,
    /// Files written, in write order.
    pub files: Vec<PathBuf>,
}

/// Result of an update run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub scripts_dir: PathBuf,
    pub unclassified: Vec<PathBuf>,
    pub report: ExecutionReport,
}

/// Everything read from a catalog.
struct CatalogSnapshot {
    domains: Vec<DomainDescriptor>,
    tables: Vec<TableDescriptor>,
    procedures: Vec<ProcedureDescriptor>,
}

impl<C: Connector> Orchestrator<C> {
    /// Create a new orchestrator.
    pub fn new(config: Config, connector: C) -> Self {
        Self {
            config,
            connector,
            executor: ScriptExecutor::new(),
        }
    }

    /// Replace the script executor (e.g., to change statement splitting).
    pub fn with_executor(mut self, executor: ScriptExecutor) -> Self {
        self.executor = executor;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    fn log_dir(&self) -> PathBuf {
        self.config.log_dir()
    }

    /// Log a fatal workflow error to error.log and hand it back.
    fn record_failure(&self, run_id: &str, err: SchemaError) -> SchemaError {
        error!("Run {} failed: {}", run_id, err);
        output::record_errors(&self.log_dir(), run_id, &[err.to_string()]);
        err
    }

    fn classify(&self, scripts_dir: &Path) -> Result<ClassifiedScripts> {
        scripts::classify(scripts_dir, self.config.scripts.multi_match)
    }

    /// Create a new database under `db_dir` and run every script against it.
    ///
    /// Statement failures are recorded and execution continues; each one is
    /// appended to error.log. A summary is written to report.txt.
    pub async fn build(&self, db_dir: &Path, scripts_dir: &Path) -> Result<BuildOutcome> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        info!("Starting build run: {}", run_id);

        let scripts = self
            .classify(scripts_dir)
            .map_err(|e| self.record_failure(&run_id, e))?;

        std::fs::create_dir_all(db_dir).map_err(|e| self.record_failure(&run_id, e.into()))?;
        let database_path = db_dir.join(&self.config.build.database_file);

        info!(
            "Creating database {} via {}",
            database_path.display(),
            self.connector.name()
        );
        let mut session = self
            .connector
            .create_database(&database_path, &self.config.connection)
            .await
            .map_err(|e| self.record_failure(&run_id, e))?;

        let executed = self
            .executor
            .execute_all(&mut session, &scripts, ExecutionMode::BestEffort)
            .await;
        close_session(&mut session).await;
        let report = executed.map_err(|e| self.record_failure(&run_id, e))?;

        let failures: Vec<String> = report
            .failures
            .iter()
            .map(|f| {
                let mut message = format!("{} ({} phase): {}", f.file.display(), f.phase, f.error);
                if !f.statement.is_empty() {
                    message.push_str(&format!("\n  Statement: {}", f.statement));
                }
                message
            })
            .collect();
        output::record_errors(&self.log_dir(), &run_id, &failures);

        let completed_at = Utc::now();
        let outcome = BuildOutcome {
            run_id,
            status: if report.is_clean() {
                "completed".to_string()
            } else {
                "completed_with_errors".to_string()
            },
            started_at,
            completed_at,
            duration_seconds: elapsed_seconds(started_at, completed_at),
            database_path,
            scripts_dir: scripts_dir.to_path_buf(),
            unclassified: scripts.unclassified,
            report,
        };

        let report_path = output::write_build_report(&self.log_dir(), &outcome)?;
        info!(
            "Build {}: {}/{} statements succeeded in {:.1}s (report: {})",
            outcome.status,
            outcome.report.succeeded(),
            outcome.report.attempted(),
            outcome.duration_seconds,
            report_path.display()
        );
        Ok(outcome)
    }

    /// Reverse-engineer the schema of a live database into scripts.
    ///
    /// The catalog is read completely before any file is written; a catalog
    /// failure leaves `output_dir` untouched.
    pub async fn export(&self, connection_string: &str, output_dir: &Path) -> Result<ExportSummary> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        info!("Starting export run: {}", run_id);

        let mut session = self
            .connector
            .connect(connection_string)
            .await
            .map_err(|e| self.record_failure(&run_id, e))?;

        let snapshot = read_catalog(&mut session).await;
        close_session(&mut session).await;
        let snapshot = snapshot.map_err(|e| self.record_failure(&run_id, e))?;

        let files = output::write_export_files(
            output_dir,
            &snapshot.domains,
            &snapshot.tables,
            &snapshot.procedures,
        )
        .map_err(|e| self.record_failure(&run_id, e))?;

        let completed_at = Utc::now();
        let summary = ExportSummary {
            run_id,
            started_at,
            completed_at,
            duration_seconds: elapsed_seconds(started_at, completed_at),
            output_dir: output_dir.to_path_buf(),
            domains: snapshot.domains.len(),
            tables: snapshot.tables.len(),
            procedures: snapshot.procedures.len(),
            files,
        };

        info!(
            "Export completed: {} domains, {} tables, {} procedures to {}",
            summary.domains,
            summary.tables,
            summary.procedures,
            output_dir.display()
        );
        Ok(summary)
    }

    /// Apply scripts to a live database in a single transaction.
    ///
    /// The scripts directory is checked before connecting. Any statement
    /// failure rolls back the whole run.
    pub async fn update(&self, connection_string: &str, scripts_dir: &Path) -> Result<UpdateOutcome> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        info!("Starting update run: {}", run_id);

        let scripts = self
            .classify(scripts_dir)
            .map_err(|e| self.record_failure(&run_id, e))?;

        let mut session = self
            .connector
            .connect(connection_string)
            .await
            .map_err(|e| self.record_failure(&run_id, e))?;

        let applied = self.apply_in_transaction(&mut session, &scripts).await;
        close_session(&mut session).await;
        let report = applied.map_err(|e| self.record_failure(&run_id, e))?;

        let completed_at = Utc::now();
        let outcome = UpdateOutcome {
            run_id,
            started_at,
            completed_at,
            duration_seconds: elapsed_seconds(started_at, completed_at),
            scripts_dir: scripts_dir.to_path_buf(),
            unclassified: scripts.unclassified,
            report,
        };

        info!(
            "Update committed: {} statements in {:.1}s",
            outcome.report.succeeded(),
            outcome.duration_seconds
        );
        Ok(outcome)
    }

    async fn apply_in_transaction(
        &self,
        session: &mut C::Session,
        scripts: &ClassifiedScripts,
    ) -> Result<ExecutionReport> {
        session.begin().await?;

        let result = match self
            .executor
            .execute_all(session, scripts, ExecutionMode::Transactional)
            .await
        {
            Ok(report) => session.commit().await.map(|()| report),
            Err(e) => Err(e),
        };

        if result.is_err() {
            warn!("Rolling back update on {}", session.describe());
            if let Err(e) = session.rollback().await {
                warn!("Rollback failed: {}", e);
            }
        }
        result
    }
}

async fn read_catalog<S: Session + ?Sized>(session: &mut S) -> Result<CatalogSnapshot> {
    let mut reader = CatalogReader::new(session);
    Ok(CatalogSnapshot {
        domains: reader.read_domains().await?,
        tables: reader.read_tables().await?,
        procedures: reader.read_procedures().await?,
    })
}

async fn close_session<S: Session + ?Sized>(session: &mut S) {
    if let Err(e) = session.close().await {
        warn!("Failed to close {}: {}", session.describe(), e);
    }
}

fn elapsed_seconds(started_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> f64 {
    (completed_at - started_at).num_milliseconds() as f64 / 1000.0
}

impl BuildOutcome {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ExportSummary {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl UpdateOutcome {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
