//! Core abstractions shared by the catalog reader, generator and executor.
//!
//! - [`schema`]: catalog descriptor types (domains, tables, procedures)
//! - [`value`]: catalog row values with typed accessors
//! - [`traits`]: catalog-query, statement-execution and connection traits

pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{
    ColumnDescriptor, ConstraintDescriptor, DomainDescriptor, ProcedureDescriptor,
    ProcedureParameter, TableDescriptor, TypeDescriptor,
};
pub use traits::{CatalogSource, Connector, Session, StatementRunner};
pub use value::{CatalogRow, CatalogValue};
