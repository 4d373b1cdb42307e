//! Advisory single-flight lock for batch commands.
//!
//! Import and resync share one working copy; two runs racing on it would
//! corrupt the reconciliation. The lock is a plainly-named file created
//! exclusively and removed on drop.

use crate::error::{CmsError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct CommandLock {
    path: PathBuf,
}

impl CommandLock {
    /// Acquire the named lock in `dir`, failing fast if it is already held
    pub fn acquire(dir: &Path, name: &str) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.lock", name));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                let _ = writeln!(file, "{}", std::process::id());
                Ok(Self { path })
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(CmsError::Locked(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl Drop for CommandLock {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            warn!("Could not release lock {:?}: {}", self.path, err);
        }
    }
}
