//! Dry-run driver.
//!
//! Sessions accept every statement without touching a database, log it,
//! and record it for inspection. Catalog queries return no rows, so an
//! export against a dry-run session produces empty scripts.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::ConnectionSettings;
use crate::core::traits::{CatalogSource, Connector, Session, StatementRunner};
use crate::core::value::CatalogRow;
use crate::error::{Result, SchemaError};

/// A statement seen by a dry-run session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedStatement {
    pub target: String,
    pub sql: String,
    /// True when issued inside an explicit transaction.
    pub in_transaction: bool,
}

/// Connector whose sessions only record statements.
#[derive(Debug, Clone, Default)]
pub struct DryRunConnector {
    recorded: Arc<Mutex<Vec<RecordedStatement>>>,
}

impl DryRunConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements recorded by every session opened from this connector.
    pub fn recorded(&self) -> Vec<RecordedStatement> {
        self.recorded
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    fn session(&self, target: String) -> DryRunSession {
        DryRunSession {
            target,
            recorded: Arc::clone(&self.recorded),
            in_transaction: false,
            closed: false,
        }
    }
}

#[async_trait(?Send)]
impl Connector for DryRunConnector {
    type Session = DryRunSession;

    async fn connect(&self, connection_string: &str) -> Result<DryRunSession> {
        info!("[dry-run] Connecting to {}", connection_string);
        Ok(self.session(connection_string.to_string()))
    }

    async fn create_database(
        &self,
        path: &Path,
        settings: &ConnectionSettings,
    ) -> Result<DryRunSession> {
        info!(
            "[dry-run] Would create database {} as {}",
            path.display(),
            settings.user
        );
        Ok(self.session(path.display().to_string()))
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}

/// Session opened by [`DryRunConnector`].
#[derive(Debug)]
pub struct DryRunSession {
    target: String,
    recorded: Arc<Mutex<Vec<RecordedStatement>>>,
    in_transaction: bool,
    closed: bool,
}

impl DryRunSession {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(SchemaError::Driver(format!(
                "dry-run session for {} is closed",
                self.target
            )));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl CatalogSource for DryRunSession {
    async fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        self.ensure_open()?;
        debug!("[dry-run] Catalog query with {:?}: {}", params, sql.trim());
        Ok(Vec::new())
    }
}

#[async_trait(?Send)]
impl StatementRunner for DryRunSession {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.ensure_open()?;
        info!("[dry-run] {}", sql);
        match self.recorded.lock() {
            Ok(mut log) => log.push(RecordedStatement {
                target: self.target.clone(),
                sql: sql.to_string(),
                in_transaction: self.in_transaction,
            }),
            Err(_) => warn!("[dry-run] Statement log unavailable"),
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl Session for DryRunSession {
    async fn begin(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.in_transaction {
            return Err(SchemaError::Driver("transaction already active".into()));
        }
        debug!("[dry-run] BEGIN");
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.ensure_open()?;
        if !self.in_transaction {
            return Err(SchemaError::Driver("no active transaction to commit".into()));
        }
        debug!("[dry-run] COMMIT");
        self.in_transaction = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.ensure_open()?;
        debug!("[dry-run] ROLLBACK");
        self.in_transaction = false;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            debug!("[dry-run] Closing session for {}", self.target);
            self.closed = true;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("dry-run:{}", self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_statements_across_sessions() {
        let connector = DryRunConnector::new();

        let mut build = connector
            .create_database(Path::new("/tmp/x.fdb"), &ConnectionSettings::default())
            .await
            .unwrap();
        build.execute("CREATE DOMAIN A AS INTEGER").await.unwrap();
        build.close().await.unwrap();

        let mut update = connector.connect("localhost:/db/x.fdb").await.unwrap();
        update.begin().await.unwrap();
        update.execute("CREATE TABLE T (ID A)").await.unwrap();
        update.commit().await.unwrap();
        update.close().await.unwrap();

        let recorded = connector.recorded();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].target, "/tmp/x.fdb");
        assert!(!recorded[0].in_transaction);
        assert_eq!(recorded[1].sql, "CREATE TABLE T (ID A)");
        assert!(recorded[1].in_transaction);
    }

    #[tokio::test]
    async fn test_catalog_is_empty() {
        let mut session = DryRunConnector::new().connect("db").await.unwrap();
        assert!(session.query("SELECT 1 FROM RDB$DATABASE", &[]).await.unwrap().is_empty());
        assert_eq!(session.describe(), "dry-run:db");
    }

    #[tokio::test]
    async fn test_closed_session_rejects_work() {
        let mut session = DryRunConnector::new().connect("db").await.unwrap();
        session.close().await.unwrap();
        session.close().await.unwrap();

        let err = session.execute("CREATE DOMAIN A AS INTEGER").await.unwrap_err();
        assert!(matches!(err, SchemaError::Driver(_)));
    }

    #[tokio::test]
    async fn test_commit_without_begin_fails() {
        let mut session = DryRunConnector::new().connect("db").await.unwrap();
        assert!(session.commit().await.is_err());
        session.begin().await.unwrap();
        assert!(session.begin().await.is_err());
    }
}
