//! Pure row-to-document field mappers.
//!
//! Each mapper is a total, explicit transform from a relational-row snapshot
//! to a document. Reference fields carry the *document* identifier of the
//! target, never its row primary key; the snapshot types capture those
//! resolved identifiers so the transforms stay unit-testable without a live
//! store.

use crate::infrastructure::database::entities::{category, localisation, post};
use crate::infrastructure::gitstore::{CategoryDocument, LocalisationDocument, PageDocument};

/// A post row with its cross-references resolved to document identifiers
#[derive(Clone, Debug)]
pub struct PostSnapshot {
    pub post: post::Model,
    pub locale: Option<String>,
    pub primary_category_uuid: Option<String>,
    pub source_uuid: Option<String>,
    pub linked_page_uuids: Vec<String>,
    pub author_tags: Vec<String>,
}

pub fn page_document(snapshot: &PostSnapshot) -> PageDocument {
    let post = &snapshot.post;
    PageDocument {
        uuid: post.uuid.clone().unwrap_or_default(),
        title: post.title.clone(),
        subtitle: post.subtitle.clone(),
        slug: post.slug.clone(),
        description: post.description.clone(),
        content: post.content.clone(),
        created_at: Some(post.created),
        modified_at: Some(post.modified),
        featured: post.featured,
        featured_in_category: post.featured_in_category,
        position: post.position,
        language: snapshot.locale.clone(),
        primary_category: snapshot.primary_category_uuid.clone(),
        source: snapshot.source_uuid.clone(),
        linked_pages: snapshot.linked_page_uuids.clone(),
        author_tags: snapshot.author_tags.clone(),
        image: post.image.clone(),
        image_host: post.image_host.clone(),
    }
}

/// A category row with its cross-references resolved
#[derive(Clone, Debug)]
pub struct CategorySnapshot {
    pub category: category::Model,
    pub locale: Option<String>,
    pub source_uuid: Option<String>,
}

pub fn category_document(snapshot: &CategorySnapshot) -> CategoryDocument {
    let category = &snapshot.category;
    CategoryDocument {
        uuid: category.uuid.clone().unwrap_or_default(),
        title: category.title.clone(),
        subtitle: category.subtitle.clone(),
        slug: category.slug.clone(),
        language: snapshot.locale.clone(),
        source: snapshot.source_uuid.clone(),
        featured_in_navbar: category.featured_in_navbar,
        position: category.position,
        image: category.image.clone(),
        image_host: category.image_host.clone(),
    }
}

pub fn localisation_document(localisation: &localisation::Model) -> LocalisationDocument {
    LocalisationDocument {
        locale: localisation.locale_code(),
        image: localisation.image.clone(),
        image_host: localisation.image_host.clone(),
        logo_text: localisation.logo_text.clone(),
        logo_description: localisation.logo_description.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_post() -> post::Model {
        post::Model {
            id: 7,
            uuid: Some("abc123".to_string()),
            title: "Sample".to_string(),
            subtitle: Some("sub".to_string()),
            slug: "sample".to_string(),
            description: None,
            content: Some("body".to_string()),
            created: Utc::now(),
            modified: Utc::now(),
            owner_name: None,
            owner_email: None,
            primary_category_id: Some(3),
            source_id: None,
            localisation_id: Some(1),
            position: 2,
            featured: true,
            featured_in_category: false,
            image: None,
            image_host: None,
        }
    }

    #[test]
    fn references_become_document_uuids() {
        let snapshot = PostSnapshot {
            post: sample_post(),
            locale: Some("eng_GB".to_string()),
            primary_category_uuid: Some("cat-uuid".to_string()),
            source_uuid: None,
            linked_page_uuids: vec!["linked-uuid".to_string()],
            author_tags: vec!["health".to_string()],
        };

        let doc = page_document(&snapshot);
        assert_eq!(doc.uuid, "abc123");
        // The row pk (3) must never leak into the document
        assert_eq!(doc.primary_category.as_deref(), Some("cat-uuid"));
        assert_eq!(doc.language.as_deref(), Some("eng_GB"));
        assert_eq!(doc.linked_pages, vec!["linked-uuid".to_string()]);
        assert_eq!(doc.position, 2);
        assert!(doc.featured);
    }

    #[test]
    fn unset_uuid_maps_to_empty_key() {
        let mut post = sample_post();
        post.uuid = None;
        let snapshot = PostSnapshot {
            post,
            locale: None,
            primary_category_uuid: None,
            source_uuid: None,
            linked_page_uuids: Vec::new(),
            author_tags: Vec::new(),
        };
        assert!(page_document(&snapshot).uuid.is_empty());
    }

    #[test]
    fn localisation_maps_to_composed_code() {
        let model = localisation::Model {
            id: 1,
            language_code: "swa".to_string(),
            country_code: "TZ".to_string(),
            image: None,
            image_host: None,
            logo_text: Some("logo".to_string()),
            logo_description: None,
        };
        let doc = localisation_document(&model);
        assert_eq!(doc.locale, "swa_TZ");
        assert_eq!(doc.logo_text.as_deref(), Some("logo"));
    }
}
