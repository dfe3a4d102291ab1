//! # fbschema
//!
//! Schema build, export and update for Firebird databases.
//!
//! - **Build**: create a new database and run a directory of scripts against
//!   it, continuing past failing statements
//! - **Export**: read domains, tables and procedures from the system catalog
//!   and write them out as DDL scripts
//! - **Update**: apply a directory of scripts to a live database in a single
//!   transaction, rolling back on the first failure
//!
//! Scripts are grouped into phases by file name (`domain`, `table`,
//! `procedure`) and always run in that order.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use fbschema::{Config, DryRunConnector, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> fbschema::Result<()> {
//!     let config = Config::load("fbschema.yaml")?;
//!     let orchestrator = Orchestrator::new(config, DryRunConnector::new());
//!     let outcome = orchestrator
//!         .build(Path::new("./db"), Path::new("./scripts"))
//!         .await?;
//!     println!("{} statements succeeded", outcome.report.succeeded());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod ddl;
pub mod drivers;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod scripts;
pub mod typemap;

// Re-exports for convenient access
pub use catalog::CatalogReader;
pub use config::{Config, ConnectionSettings, MultiMatchPolicy};
pub use crate::core::{
    CatalogRow, CatalogSource, CatalogValue, ColumnDescriptor, ConstraintDescriptor, Connector,
    DomainDescriptor, ProcedureDescriptor, ProcedureParameter, Session, StatementRunner,
    TableDescriptor, TypeDescriptor,
};
pub use drivers::DryRunConnector;
#[cfg(feature = "firebird")]
pub use drivers::FirebirdConnector;
pub use error::{Result, SchemaError};
pub use executor::{ExecutionMode, ExecutionReport, ScriptExecutor};
pub use orchestrator::{BuildOutcome, ExportSummary, Orchestrator, UpdateOutcome};
pub use scripts::{classify, ClassifiedScripts, Phase};
pub use typemap::map_type;
