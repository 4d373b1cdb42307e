//! Document schemas stored in the content repository.
//!
//! Each document is a JSON file in the repository working tree, one
//! directory per type. Pages and categories are keyed by a store-assigned
//! uuid; localisations are keyed by their composed locale code.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// A file-backed, commit-tracked document in the content repository
pub trait Document: Serialize + DeserializeOwned {
    /// Directory under the repository root holding this type
    const DIR: &'static str;
    /// Human-readable type name used in log lines
    const KIND: &'static str;

    /// Key identifying the document within its directory
    fn key(&self) -> String;

    /// Assign a fresh key if the document does not have one yet.
    /// Types whose keys are caller-provided leave this a no-op.
    fn assign_key(&mut self) {}

    /// Compact summary written into the search index
    fn index_entry(&self) -> serde_json::Value;
}

fn new_uuid() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Mirrored form of a Post
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    #[serde(default)]
    pub uuid: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub slug: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub featured: bool,
    pub featured_in_category: bool,
    pub position: i32,
    /// Composed locale code of the page's localisation
    pub language: Option<String>,
    /// Document uuid of the primary category, never a row pk
    pub primary_category: Option<String>,
    /// Document uuid of the source page for derivative copies
    pub source: Option<String>,
    /// Ordered document uuids of related pages; asymmetric
    #[serde(default)]
    pub linked_pages: Vec<String>,
    #[serde(default)]
    pub author_tags: Vec<String>,
    pub image: Option<String>,
    pub image_host: Option<String>,
}

impl Document for PageDocument {
    const DIR: &'static str = "pages";
    const KIND: &'static str = "Page";

    fn key(&self) -> String {
        self.uuid.clone()
    }

    fn assign_key(&mut self) {
        if self.uuid.is_empty() {
            self.uuid = new_uuid();
        }
    }

    fn index_entry(&self) -> serde_json::Value {
        json!({
            "uuid": self.uuid,
            "slug": self.slug,
            "title": self.title,
            "language": self.language,
            "primary_category": self.primary_category,
            "source": self.source,
        })
    }
}

/// Mirrored form of a Category
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryDocument {
    #[serde(default)]
    pub uuid: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub slug: String,
    pub language: Option<String>,
    pub source: Option<String>,
    pub featured_in_navbar: bool,
    pub position: i32,
    pub image: Option<String>,
    pub image_host: Option<String>,
}

impl Document for CategoryDocument {
    const DIR: &'static str = "categories";
    const KIND: &'static str = "Category";

    fn key(&self) -> String {
        self.uuid.clone()
    }

    fn assign_key(&mut self) {
        if self.uuid.is_empty() {
            self.uuid = new_uuid();
        }
    }

    fn index_entry(&self) -> serde_json::Value {
        json!({
            "uuid": self.uuid,
            "slug": self.slug,
            "title": self.title,
            "language": self.language,
            "source": self.source,
        })
    }
}

/// Mirrored form of a Localisation, keyed by locale code
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalisationDocument {
    pub locale: String,
    pub image: Option<String>,
    pub image_host: Option<String>,
    pub logo_text: Option<String>,
    pub logo_description: Option<String>,
}

impl Document for LocalisationDocument {
    const DIR: &'static str = "localisations";
    const KIND: &'static str = "Localisation";

    fn key(&self) -> String {
        self.locale.clone()
    }

    fn index_entry(&self) -> serde_json::Value {
        json!({ "locale": self.locale })
    }
}
