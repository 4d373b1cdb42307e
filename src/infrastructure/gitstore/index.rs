//! On-disk search index kept alongside the content repository.
//!
//! Stands in for the search engine the documents are indexed into: one
//! directory per document type (`<prefix>_<dir>`), one JSON entry per key.
//! The index is written through on every save/delete but can drift when the
//! repository is manipulated out-of-band; `Workspace::sync` reconciles it.

use crate::error::Result;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

pub struct SearchIndex {
    root: PathBuf,
    prefix: String,
}

impl SearchIndex {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    fn type_dir(&self, dir: &str) -> PathBuf {
        self.root.join(format!("{}_{}", self.prefix, dir))
    }

    fn entry_path(&self, dir: &str, key: &str) -> PathBuf {
        self.type_dir(dir).join(format!("{}.json", key))
    }

    /// Write or replace the entry for `key`
    pub fn upsert(&self, dir: &str, key: &str, entry: &serde_json::Value) -> Result<()> {
        fs::create_dir_all(self.type_dir(dir))?;
        fs::write(self.entry_path(dir, key), serde_json::to_vec_pretty(entry)?)?;
        Ok(())
    }

    /// Remove the entry for `key`; returns false if it was already absent
    pub fn remove(&self, dir: &str, key: &str) -> Result<bool> {
        let path = self.entry_path(dir, key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    pub fn get(&self, dir: &str, key: &str) -> Result<Option<serde_json::Value>> {
        let path = self.entry_path(dir, key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// All keys currently present for a document type
    pub fn keys(&self, dir: &str) -> Result<Vec<String>> {
        let type_dir = self.type_dir(dir);
        if !type_dir.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&type_dir)? {
            let path = entry?.path();
            match (path.extension(), path.file_stem()) {
                (Some(ext), Some(stem)) if ext == "json" => {
                    keys.push(stem.to_string_lossy().into_owned());
                }
                _ => warn!("Ignoring unexpected index file {:?}", path),
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Make sure the type directory exists
    pub fn ensure(&self, dir: &str) -> Result<()> {
        fs::create_dir_all(self.type_dir(dir))?;
        Ok(())
    }
}
