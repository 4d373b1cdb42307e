//! Operator batch commands: reconciliation sweeps and bulk import.
//!
//! Each command writes per-entity progress lines to the supplied writer,
//! the way an operator expects to follow a long-running sweep.

use crate::config::AppConfig;
use crate::error::Result;
use crate::infrastructure::database::Database;
use crate::infrastructure::gitstore::Workspace;
use crate::sync::MissingDocumentPolicy;
use sea_orm::DatabaseConnection;

pub mod fix_locales;
pub mod import;
pub mod resync_db;
pub mod resync_index;

/// One lock name shared by every command that mutates the working copy, so
/// an import and a resync can never run concurrently against it
pub const BATCH_LOCK: &str = "batch";

/// Everything a batch command needs: config, database, workspace
pub struct CommandContext {
    pub config: AppConfig,
    pub database: Database,
    pub workspace: Workspace,
}

impl CommandContext {
    /// Open the database (running migrations) and the content repository
    pub async fn init(config: AppConfig) -> Result<Self> {
        let database = Database::open(&config.data_dir.join("cms.db")).await?;
        database.migrate().await?;
        let workspace = Workspace::open(&config)?;
        workspace.refresh_index()?;
        Ok(Self {
            config,
            database,
            workspace,
        })
    }

    pub fn db(&self) -> &DatabaseConnection {
        self.database.conn()
    }

    /// Missing-document policy from configuration
    pub fn missing_policy(&self) -> MissingDocumentPolicy {
        if self.config.recreate_missing_documents {
            MissingDocumentPolicy::Recreate
        } else {
            MissingDocumentPolicy::Error
        }
    }
}
