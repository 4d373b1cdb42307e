//! Import relational rows from the content repository.
//!
//! The inverse bulk operation: walks the document store (freshly cloned when
//! a remote is configured) and populates the relational tables. Runs with
//! the synchronizer in Import mode so row writes are not mirrored straight
//! back. Cross-references are resolved in a second pass per type, since the
//! referenced entities may appear later in the store's iteration order.

use crate::assets::{self, AssetClient};
use crate::commands::CommandContext;
use crate::error::{CmsError, Result};
use crate::infrastructure::database::entities::{category, post, post_tag, related_post};
use crate::infrastructure::gitstore::{CategoryDocument, LocalisationDocument, PageDocument};
use crate::shared::lock::CommandLock;
use crate::sync::{SyncMode, SyncService};
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, Set,
};
use std::io::{BufRead, Write};
use tracing::warn;

pub struct ImportOptions {
    /// Skip the interactive prompt and assume existing data may be deleted
    pub quiet: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub localisations: usize,
    pub categories: usize,
    pub posts: usize,
    pub skipped: usize,
}

pub async fn run(
    ctx: &CommandContext,
    options: &ImportOptions,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<ImportReport> {
    let _lock = CommandLock::acquire(&ctx.config.data_dir, super::BATCH_LOCK)?;

    let must_delete = if options.quiet {
        true
    } else {
        write!(out, "Do you want to delete existing data? Y/n: ")?;
        out.flush()?;
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        let answer = answer.trim().to_lowercase();
        answer.is_empty() || answer == "y"
    };

    if must_delete {
        writeln!(out, "deleting existing content..")?;
        related_post::Entity::delete_many().exec(ctx.db()).await?;
        post_tag::Entity::delete_many().exec(ctx.db()).await?;
        post::Entity::delete_many().exec(ctx.db()).await?;
        category::Entity::delete_many().exec(ctx.db()).await?;
    }

    let service = SyncService::new(ctx.db(), &ctx.workspace).with_mode(SyncMode::Import);
    let asset_client = ctx.config.asset_host.as_deref().map(AssetClient::new);
    let mut report = ImportReport::default();

    // Localisations first: everything else references them by locale code.
    // An existing code pair is left alone to avoid overwriting local edits.
    writeln!(out, "creating localisations..")?;
    for doc in ctx.workspace.iterate::<LocalisationDocument>()? {
        match import_localisation(&service, &asset_client, &doc).await {
            Ok(true) => report.localisations += 1,
            Ok(false) => {}
            Err(CmsError::Validation(msg)) => {
                warn!("Skipping localisation {}: {}", doc.locale, msg);
                report.skipped += 1;
            }
            Err(other) => return Err(other),
        }
    }

    writeln!(out, "creating categories..")?;
    let category_docs = ctx.workspace.iterate::<CategoryDocument>()?;
    for doc in &category_docs {
        match import_category(ctx.db(), &service, &asset_client, doc).await {
            Ok(true) => report.categories += 1,
            Ok(false) => {}
            Err(CmsError::Validation(msg)) => {
                warn!("Skipping category {}: {}", doc.uuid, msg);
                report.skipped += 1;
            }
            Err(other) => return Err(other),
        }
    }
    // Second pass: sources can now be resolved regardless of store order
    for doc in &category_docs {
        let Some(source_uuid) = &doc.source else { continue };
        let Some(row) = category_by_uuid(ctx.db(), &doc.uuid).await? else {
            continue;
        };
        let Some(source_row) = category_by_uuid(ctx.db(), source_uuid).await? else {
            warn!("Category {} references unknown source {}", doc.uuid, source_uuid);
            report.skipped += 1;
            continue;
        };
        let mut active = row.into_active_model();
        active.source_id = Set(Some(source_row.id));
        service.save_category(active, None).await?;
    }

    writeln!(out, "creating pages..")?;
    let page_docs = ctx.workspace.iterate::<PageDocument>()?;
    for doc in &page_docs {
        match import_page(ctx.db(), &service, &asset_client, doc).await {
            Ok(true) => report.posts += 1,
            Ok(false) => {}
            Err(CmsError::Validation(msg)) => {
                warn!("Skipping page {}: {}", doc.uuid, msg);
                report.skipped += 1;
            }
            Err(other) => return Err(other),
        }
    }
    // Second pass: source links, ordered related pages and author tags
    for doc in &page_docs {
        let Some(row) = post_by_uuid(ctx.db(), &doc.uuid).await? else {
            continue;
        };

        if let Some(source_uuid) = &doc.source {
            if let Some(source_row) = post_by_uuid(ctx.db(), source_uuid).await? {
                let mut active = row.clone().into_active_model();
                active.source_id = Set(Some(source_row.id));
                service.save_post(active, None).await?;
            } else {
                warn!("Page {} references unknown source {}", doc.uuid, source_uuid);
                report.skipped += 1;
            }
        }

        if !doc.linked_pages.is_empty() {
            let mut related_ids = Vec::with_capacity(doc.linked_pages.len());
            for linked_uuid in &doc.linked_pages {
                match post_by_uuid(ctx.db(), linked_uuid).await? {
                    Some(linked) => related_ids.push(linked.id),
                    None => warn!("Page {} links unknown page {}", doc.uuid, linked_uuid),
                }
            }
            service.set_related_posts(row.id, &related_ids, None).await?;
        }

        if !doc.author_tags.is_empty() {
            service.set_tags(row.id, &doc.author_tags, None).await?;
        }
    }

    writeln!(out, "done.")?;
    Ok(report)
}

async fn import_localisation(
    service: &SyncService<'_>,
    asset_client: &Option<AssetClient>,
    doc: &LocalisationDocument,
) -> Result<bool> {
    use crate::infrastructure::database::entities::localisation;

    let (language, country) = localisation::split_locale_code(&doc.locale)
        .ok_or_else(|| CmsError::Validation(format!("malformed locale code '{}'", doc.locale)))?;

    let exists = localisation::Entity::find()
        .filter(localisation::Column::LanguageCode.eq(language))
        .filter(localisation::Column::CountryCode.eq(country))
        .count(service.db())
        .await?
        > 0;
    if exists {
        return Ok(false);
    }

    let (image, image_host) = migrate_asset(asset_client, &doc.image, &doc.image_host);
    service
        .save_localisation(
            localisation::ActiveModel {
                language_code: Set(language.to_string()),
                country_code: Set(country.to_string()),
                image: Set(image),
                image_host: Set(image_host),
                logo_text: Set(doc.logo_text.clone()),
                logo_description: Set(doc.logo_description.clone()),
                ..Default::default()
            },
            None,
        )
        .await?;
    Ok(true)
}

async fn import_category(
    db: &DatabaseConnection,
    service: &SyncService<'_>,
    asset_client: &Option<AssetClient>,
    doc: &CategoryDocument,
) -> Result<bool> {
    if doc.uuid.is_empty() {
        return Err(CmsError::Validation("category document has no uuid".to_string()));
    }
    if category_by_uuid(db, &doc.uuid).await?.is_some() {
        return Ok(false);
    }

    let localisation_id = match &doc.language {
        Some(code) => Some(service.localisation_for(code, None).await?.id),
        None => None,
    };
    let (image, image_host) = migrate_asset(asset_client, &doc.image, &doc.image_host);

    // Keep the document's slug when it is free; a collision falls back to
    // regeneration with a numeric suffix
    let slug_taken = category::Entity::find()
        .filter(category::Column::Slug.eq(doc.slug.clone()))
        .count(db)
        .await?
        > 0;

    service
        .save_category(
            category::ActiveModel {
                uuid: Set(Some(doc.uuid.clone())),
                title: Set(doc.title.clone()),
                subtitle: Set(doc.subtitle.clone()),
                slug: if slug_taken { NotSet } else { Set(doc.slug.clone()) },
                localisation_id: Set(localisation_id),
                featured_in_navbar: Set(doc.featured_in_navbar),
                position: Set(doc.position),
                image: Set(image),
                image_host: Set(image_host),
                ..Default::default()
            },
            None,
        )
        .await?;
    Ok(true)
}

async fn import_page(
    db: &DatabaseConnection,
    service: &SyncService<'_>,
    asset_client: &Option<AssetClient>,
    doc: &PageDocument,
) -> Result<bool> {
    if doc.uuid.is_empty() {
        return Err(CmsError::Validation("page document has no uuid".to_string()));
    }
    if post_by_uuid(db, &doc.uuid).await?.is_some() {
        return Ok(false);
    }

    let localisation_id = match &doc.language {
        Some(code) => Some(service.localisation_for(code, None).await?.id),
        None => None,
    };
    let primary_category_id = match &doc.primary_category {
        Some(uuid) => match category_by_uuid(db, uuid).await? {
            Some(row) => Some(row.id),
            None => {
                return Err(CmsError::Validation(format!(
                    "page references unknown category {}",
                    uuid
                )))
            }
        },
        None => None,
    };
    let (image, image_host) = migrate_asset(asset_client, &doc.image, &doc.image_host);

    let mut active = post::ActiveModel {
        uuid: Set(Some(doc.uuid.clone())),
        title: Set(doc.title.clone()),
        subtitle: Set(doc.subtitle.clone()),
        description: Set(doc.description.clone()),
        content: Set(doc.content.clone()),
        primary_category_id: Set(primary_category_id),
        localisation_id: Set(localisation_id),
        position: Set(doc.position),
        featured: Set(doc.featured),
        featured_in_category: Set(doc.featured_in_category),
        image: Set(image),
        image_host: Set(image_host),
        ..Default::default()
    };
    if let Some(created_at) = doc.created_at {
        active.created = Set(created_at);
    }

    service.save_post(active, None).await?;
    Ok(true)
}

/// Row lookup by document uuid. More than one match is ambiguous; the
/// entity is skipped rather than failing the whole import.
async fn category_by_uuid(
    db: &DatabaseConnection,
    uuid: &str,
) -> Result<Option<category::Model>> {
    let mut rows = category::Entity::find()
        .filter(category::Column::Uuid.eq(uuid))
        .all(db)
        .await?;
    if rows.len() > 1 {
        warn!("Ambiguous category uuid {} ({} rows)", uuid, rows.len());
        return Ok(None);
    }
    Ok(rows.pop())
}

async fn post_by_uuid(db: &DatabaseConnection, uuid: &str) -> Result<Option<post::Model>> {
    let mut rows = post::Entity::find()
        .filter(post::Column::Uuid.eq(uuid))
        .all(db)
        .await?;
    if rows.len() > 1 {
        warn!("Ambiguous page uuid {} ({} rows)", uuid, rows.len());
        return Ok(None);
    }
    Ok(rows.pop())
}

fn migrate_asset(
    client: &Option<AssetClient>,
    image: &Option<String>,
    image_host: &Option<String>,
) -> (Option<String>, Option<String>) {
    match (client, image, image_host) {
        (Some(client), Some(id), Some(host)) => match assets::migrate_image(client, id, host) {
            Some((new_id, new_host)) => (Some(new_id), Some(new_host)),
            None => (None, None),
        },
        // No target asset host configured: carry the reference as-is
        _ => (image.clone(), image_host.clone()),
    }
}
