//! Git-backed document store.
//!
//! A non-bare repository whose working tree holds one JSON document per
//! entity. Every mutation is staged and committed with an author signature,
//! and written through to the sidecar search index.

use crate::config::AppConfig;
use crate::error::{CmsError, Result};
use git2::build::RepoBuilder;
use git2::{Cred, FetchOptions, PushOptions, Remote, RemoteCallbacks, Repository, Signature};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub mod documents;
pub mod index;

pub use documents::{CategoryDocument, Document, LocalisationDocument, PageDocument};
pub use index::SearchIndex;

const LICENSE_FILE: &str = "LICENSE";
const DEFAULT_AUTHOR_NAME: &str = "unicore-cms";
const DEFAULT_AUTHOR_EMAIL: &str = "author@unicore.io";

/// Commit attribution for document mutations
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    /// Attribution for a known editor; a missing email falls back to the
    /// repository's default address
    pub fn for_user(name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            name: name.into(),
            email: email.unwrap_or_else(|| DEFAULT_AUTHOR_EMAIL.to_string()),
        }
    }
}

#[derive(Clone, Debug)]
struct SshKeys {
    public: PathBuf,
    private: PathBuf,
    passphrase: Option<String>,
}

/// Handle on the content repository working copy and its search index
pub struct Workspace {
    repo: Repository,
    root: PathBuf,
    index: SearchIndex,
    remote_name: String,
    ssh_keys: Option<SshKeys>,
}

impl Workspace {
    /// Open the workspace described by the configuration.
    ///
    /// Clones the remote when a URL is configured and no working copy
    /// exists yet; initialises a fresh repository otherwise.
    pub fn open(config: &AppConfig) -> Result<Self> {
        let ssh_keys = match (&config.ssh_pubkey_path, &config.ssh_privkey_path) {
            (Some(public), Some(private)) => Some(SshKeys {
                public: public.clone(),
                private: private.clone(),
                passphrase: config.ssh_passphrase.clone(),
            }),
            _ => None,
        };

        let repo_path = &config.repo_path;
        let repo = if repo_path.join(".git").exists() {
            Repository::open(repo_path)?
        } else if let Some(url) = &config.repo_url {
            info!("Cloning {} into {:?}", url, repo_path);
            let mut fetch = FetchOptions::new();
            fetch.remote_callbacks(callbacks(ssh_keys.clone()));
            RepoBuilder::new()
                .fetch_options(fetch)
                .clone(url, repo_path)?
        } else {
            info!("Initialising content repository at {:?}", repo_path);
            Repository::init(repo_path)?
        };

        Ok(Self {
            repo,
            root: repo_path.clone(),
            index: SearchIndex::new(&config.index_dir, &config.index_prefix),
            remote_name: config.remote_name.clone(),
            ssh_keys,
        })
    }

    pub fn working_dir(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    fn doc_rel_path<D: Document>(key: &str) -> PathBuf {
        Path::new(D::DIR).join(format!("{}.json", key))
    }

    fn doc_path<D: Document>(&self, key: &str) -> PathBuf {
        self.root.join(Self::doc_rel_path::<D>(key))
    }

    /// Save a document: assigns a key on first save, writes the file,
    /// commits, and writes through to the search index. Returns the key.
    pub fn save<D: Document>(
        &self,
        doc: &mut D,
        message: &str,
        author: Option<&Author>,
    ) -> Result<String> {
        doc.assign_key();
        let key = doc.key();
        if key.is_empty() {
            return Err(CmsError::Validation(format!(
                "{} document has no key",
                D::KIND
            )));
        }

        let path = self.doc_path::<D>(&key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut json = serde_json::to_string_pretty(doc)?;
        json.push('\n');
        fs::write(&path, json)?;

        self.commit_path(&Self::doc_rel_path::<D>(&key), message, author, false)?;
        self.index.upsert(D::DIR, &key, &doc.index_entry())?;
        Ok(key)
    }

    /// Delete a document by key. Returns false if it was already absent;
    /// an absent document is not an error.
    pub fn delete<D: Document>(
        &self,
        key: &str,
        message: &str,
        author: Option<&Author>,
    ) -> Result<bool> {
        let path = self.doc_path::<D>(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        self.commit_path(&Self::doc_rel_path::<D>(key), message, author, true)?;
        self.index.remove(D::DIR, key)?;
        Ok(true)
    }

    /// Look up a document by key
    pub fn get<D: Document>(&self, key: &str) -> Result<Option<D>> {
        let path = self.doc_path::<D>(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// All documents of a type, in directory order
    pub fn iterate<D: Document>(&self) -> Result<Vec<D>> {
        let dir = self.root.join(D::DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut docs = Vec::new();
        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        for path in paths {
            let bytes = fs::read(&path)?;
            match serde_json::from_slice(&bytes) {
                Ok(doc) => docs.push(doc),
                Err(err) => warn!("Skipping unreadable document {:?}: {}", path, err),
            }
        }
        Ok(docs)
    }

    /// Commit the license text as the repository LICENSE file
    pub fn save_license(&self, text: &str, message: &str, author: Option<&Author>) -> Result<()> {
        fs::write(self.root.join(LICENSE_FILE), text)?;
        self.commit_path(Path::new(LICENSE_FILE), message, author, false)
    }

    pub fn license(&self) -> Result<Option<String>> {
        let path = self.root.join(LICENSE_FILE);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    /// Make index writes visible; the sidecar index needs only its
    /// directories to exist
    pub fn refresh_index(&self) -> Result<()> {
        self.index.ensure(PageDocument::DIR)?;
        self.index.ensure(CategoryDocument::DIR)?;
        self.index.ensure(LocalisationDocument::DIR)?;
        Ok(())
    }

    /// Reconcile the search index against current document contents.
    /// Returns the keys updated and the stale keys removed.
    pub fn sync<D: Document>(&self) -> Result<(Vec<String>, Vec<String>)> {
        let docs = self.iterate::<D>()?;
        let mut updated = Vec::with_capacity(docs.len());
        for doc in &docs {
            let key = doc.key();
            self.index.upsert(D::DIR, &key, &doc.index_entry())?;
            updated.push(key);
        }

        let live: HashSet<&String> = updated.iter().collect();
        let mut removed = Vec::new();
        for key in self.index.keys(D::DIR)? {
            if !live.contains(&key) {
                self.index.remove(D::DIR, &key)?;
                removed.push(key);
            }
        }
        Ok((updated, removed))
    }

    /// Push the current branch to the configured remote
    pub fn push(&self) -> Result<()> {
        let mut remote = self.repo.find_remote(&self.remote_name)?;
        self.push_remote(&mut remote)
    }

    /// Push the current branch to an explicit URL, used for publishing
    /// targets configured in the database
    pub fn push_url(&self, url: &str) -> Result<()> {
        let mut remote = self.repo.remote_anonymous(url)?;
        self.push_remote(&mut remote)
    }

    fn push_remote(&self, remote: &mut Remote<'_>) -> Result<()> {
        let branch = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.shorthand().map(str::to_owned))
            .unwrap_or_else(|| "master".to_string());
        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");

        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks(self.ssh_keys.clone()));
        remote.push(&[refspec.as_str()], Some(&mut options))?;
        info!(
            "Pushed {} to {}",
            branch,
            remote.url().unwrap_or("<anonymous>")
        );
        Ok(())
    }

    fn commit_path(
        &self,
        rel_path: &Path,
        message: &str,
        author: Option<&Author>,
        removed: bool,
    ) -> Result<()> {
        let mut index = self.repo.index()?;
        if removed {
            index.remove_path(rel_path)?;
        } else {
            index.add_path(rel_path)?;
        }
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let signature = match author {
            Some(author) => Signature::now(&author.name, &author.email)?,
            None => self
                .repo
                .signature()
                .or_else(|_| Signature::now(DEFAULT_AUTHOR_NAME, DEFAULT_AUTHOR_EMAIL))?,
        };

        // Append to the latest commit on HEAD; an unborn HEAD has no parent
        let mut parents = Vec::new();
        if let Some(oid) = self.repo.head().ok().and_then(|head| head.target()) {
            parents.push(self.repo.find_commit(oid)?);
        }
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parent_refs)?;
        Ok(())
    }
}

fn callbacks(ssh_keys: Option<SshKeys>) -> RemoteCallbacks<'static> {
    let mut cb = RemoteCallbacks::new();
    if let Some(keys) = ssh_keys {
        cb.credentials(move |_url, username, _allowed| {
            Cred::ssh_key(
                username.unwrap_or("git"),
                Some(&keys.public),
                &keys.private,
                keys.passphrase.as_deref(),
            )
        });
    }
    cb
}
