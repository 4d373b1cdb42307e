//! Background dispatch for the push-to-remote step.
//!
//! Commits happen synchronously inside the save path; delivery to remotes
//! is decoupled onto a blocking task, best-effort with no retry. When
//! publishing targets are configured every target URL is pushed; otherwise
//! the workspace's own configured remote is used. Callers await the returned
//! handle so the attempt finishes before the process exits.

use crate::config::AppConfig;
use crate::infrastructure::database::entities::publishing_target;
use crate::infrastructure::gitstore::Workspace;
use tokio::task::JoinHandle;
use tracing::warn;

/// Push the content repository to its publish destinations; failures are
/// logged, never propagated
pub fn spawn_push(config: AppConfig, targets: Vec<publishing_target::Model>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let workspace = match Workspace::open(&config) {
            Ok(workspace) => workspace,
            Err(err) => {
                warn!("Could not open workspace for push: {}", err);
                return;
            }
        };

        if targets.is_empty() {
            if let Err(err) = workspace.push() {
                warn!("Push to remote failed: {}", err);
            }
            return;
        }
        for target in targets {
            if let Err(err) = workspace.push_url(&target.url) {
                warn!("Push to {} failed: {}", target.name, err);
            }
        }
    })
}
