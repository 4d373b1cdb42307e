//! Universal Core CMS sync core.
//!
//! Editorial models live in a relational database and are mirrored into a
//! version-controlled, git-backed document store which feeds a search index.
//! This crate is the bridge between the two: the explicit synchronizer
//! invoked on every write, and the batch commands that reconcile the stores
//! after divergence.

pub mod assets;
pub mod commands;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod shared;
pub mod sync;
pub mod tasks;

pub use config::AppConfig;
pub use error::{CmsError, Result};
pub use infrastructure::database::Database;
pub use infrastructure::gitstore::{Author, Workspace};
pub use sync::{MissingDocumentPolicy, SyncMode, SyncService};
