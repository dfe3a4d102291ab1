//! Files written by the workflows: error log, build report, exported scripts.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::core::schema::{DomainDescriptor, ProcedureDescriptor, TableDescriptor};
use crate::ddl;
use crate::error::Result;
use crate::scripts::Phase;

use super::BuildOutcome;

pub const ERROR_LOG: &str = "error.log";
pub const BUILD_REPORT: &str = "report.txt";
pub const DOMAINS_FILE: &str = "domains.sql";
pub const TABLES_FILE: &str = "tables.sql";

/// `procedures<N>.sql`, numbered from 1.
pub fn procedure_file_name(index: usize) -> String {
    format!("procedures{}.sql", index + 1)
}

/// Append timestamped lines to `<log_dir>/error.log`.
pub fn append_error_log(log_dir: &Path, run_id: &str, messages: &[String]) -> Result<()> {
    if messages.is_empty() {
        return Ok(());
    }
    fs::create_dir_all(log_dir)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(ERROR_LOG))?;

    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC");
    for message in messages {
        writeln!(file, "{} [{}] {}", timestamp, run_id, message)?;
    }
    Ok(())
}

/// Like [`append_error_log`], but a failure to write is only logged so it
/// cannot mask the error being recorded.
pub fn record_errors(log_dir: &Path, run_id: &str, messages: &[String]) {
    if let Err(e) = append_error_log(log_dir, run_id, messages) {
        warn!(
            "Could not write {}: {}",
            log_dir.join(ERROR_LOG).display(),
            e
        );
    }
}

/// Write `<log_dir>/report.txt` for a build.
pub fn write_build_report(log_dir: &Path, outcome: &BuildOutcome) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(BUILD_REPORT);
    fs::write(&path, render_build_report(outcome))?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

fn render_build_report(outcome: &BuildOutcome) -> String {
    let report = &outcome.report;
    let mut text = String::new();
    text.push_str("Schema build report\n");
    text.push_str(&format!("Run id:       {}\n", outcome.run_id));
    text.push_str(&format!("Started:      {}\n", timestamp(&outcome.started_at)));
    text.push_str(&format!("Completed:    {}\n", timestamp(&outcome.completed_at)));
    text.push_str(&format!("Database:     {}\n", outcome.database_path.display()));
    text.push_str(&format!("Scripts:      {}\n", outcome.scripts_dir.display()));
    text.push_str(&format!("Status:       {}\n", outcome.status));
    text.push('\n');

    for phase in Phase::ORDERED {
        let (attempted, succeeded) = report.phase_totals(phase);
        text.push_str(&format!(
            "{:<10} {} attempted, {} succeeded, {} failed\n",
            phase.to_string(),
            attempted,
            succeeded,
            attempted - succeeded
        ));
    }
    text.push_str(&format!(
        "{:<10} {} attempted, {} succeeded, {} failed\n",
        "total",
        report.attempted(),
        report.succeeded(),
        report.failure_count()
    ));

    if !outcome.unclassified.is_empty() {
        text.push_str("\nSkipped (no phase keyword):\n");
        for path in &outcome.unclassified {
            text.push_str(&format!("  {}\n", path.display()));
        }
    }
    if !report.failures.is_empty() {
        text.push_str(&format!("\nFailures logged to {}\n", ERROR_LOG));
    }
    text
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Write the exported scripts into `output_dir` and return their paths.
pub fn write_export_files(
    output_dir: &Path,
    domains: &[DomainDescriptor],
    tables: &[TableDescriptor],
    procedures: &[ProcedureDescriptor],
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;
    let mut written = Vec::with_capacity(2 + procedures.len());

    let path = output_dir.join(DOMAINS_FILE);
    fs::write(&path, ddl::domains_script(domains))?;
    written.push(path);

    let path = output_dir.join(TABLES_FILE);
    fs::write(&path, ddl::tables_script(tables))?;
    written.push(path);

    for (index, procedure) in procedures.iter().enumerate() {
        let path = output_dir.join(procedure_file_name(index));
        fs::write(&path, ddl::generate_procedure_ddl(procedure))?;
        debug!("{} -> {}", procedure.name, path.display());
        written.push(path);
    }

    Ok(written)
}
