//! Database driver implementations.
//!
//! Each driver implements [`Connector`](crate::core::traits::Connector) and
//! its [`Session`](crate::core::traits::Session):
//!
//! - [`dry_run`]: records and logs statements, reads an empty catalog
//! - [`firebird`]: live Firebird server via `rsfbclient` (feature `firebird`)

pub mod dry_run;
#[cfg(feature = "firebird")]
pub mod firebird;

pub use dry_run::{DryRunConnector, DryRunSession, RecordedStatement};
#[cfg(feature = "firebird")]
pub use firebird::{FirebirdConnector, FirebirdSession};
