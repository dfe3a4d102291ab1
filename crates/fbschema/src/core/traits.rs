//! Core traits for talking to a live database.
//!
//! The engine never depends on a concrete driver. It sees:
//!
//! - [`CatalogSource`]: runs catalog queries and returns decoded rows
//! - [`StatementRunner`]: executes one DDL or procedure statement
//! - [`Session`]: an open connection offering both, plus transaction control
//! - [`Connector`]: opens sessions (connect to an existing database, or
//!   create a new one)
//!
//! Sessions are single-owner blocking resources used sequentially, so the
//! traits are declared `?Send`.

use std::path::Path;

use async_trait::async_trait;

use crate::config::ConnectionSettings;
use crate::error::Result;

use super::value::CatalogRow;

/// Read rows from the database system catalog.
#[async_trait(?Send)]
pub trait CatalogSource {
    /// Run a catalog query with positional text parameters.
    async fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>>;
}

/// Execute DDL and procedure statements.
#[async_trait(?Send)]
pub trait StatementRunner {
    /// Execute a single statement. No result rows are expected.
    ///
    /// Outside an explicit transaction each statement is committed on its
    /// own; inside one it becomes visible only on [`Session::commit`].
    async fn execute(&mut self, sql: &str) -> Result<()>;
}

/// An open database connection.
#[async_trait(?Send)]
pub trait Session: CatalogSource + StatementRunner {
    /// Start an explicit transaction.
    async fn begin(&mut self) -> Result<()>;

    /// Commit the explicit transaction.
    async fn commit(&mut self) -> Result<()>;

    /// Roll back the explicit transaction.
    async fn rollback(&mut self) -> Result<()>;

    /// Release the connection. Further calls are errors.
    async fn close(&mut self) -> Result<()>;

    /// Human-readable target, for logs and reports.
    fn describe(&self) -> String;
}

/// Opens sessions against a database engine.
#[async_trait(?Send)]
pub trait Connector {
    type Session: Session;

    /// Connect to an existing database.
    async fn connect(&self, connection_string: &str) -> Result<Self::Session>;

    /// Create a new database file at `path` and connect to it.
    async fn create_database(
        &self,
        path: &Path,
        settings: &ConnectionSettings,
    ) -> Result<Self::Session>;

    /// Driver identifier (e.g., "firebird", "dry-run").
    fn name(&self) -> &'static str;
}
