//! Row-to-document synchronization.
//!
//! `SyncService` is the single write path for the editorial models: it
//! persists the relational row and mirrors it into the content repository in
//! one explicit call, replacing the implicit save/delete hooks of a framework
//! signal registry. Recursion cannot occur because the uuid write-back after
//! document creation is a targeted column update, not a service call.

use crate::error::{CmsError, Result};
use crate::infrastructure::database::entities::{
    category, content_repository, localisation, post, post_tag, related_post,
};
use crate::infrastructure::gitstore::{
    Author, CategoryDocument, LocalisationDocument, PageDocument, Workspace,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::{info, warn};

pub mod mapping;
pub mod slug;

use mapping::{CategorySnapshot, PostSnapshot};

/// Whether relational writes are mirrored into the document store.
///
/// `Import` is the bulk-load mode: the document store is the source being
/// read from, so re-mirroring every row write would be redundant and could
/// race with the importer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    Mirror,
    Import,
}

/// What to do when a row's uuid no longer resolves to a document.
///
/// `Recreate` preserves the historical self-healing behaviour: a document
/// deleted out-of-band is transparently recreated on the next edit. It can
/// also resurrect intentionally-deleted content, so the policy is explicit
/// and every recreation is logged. `Error` surfaces the anomaly instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingDocumentPolicy {
    Recreate,
    Error,
}

/// The synchronizer: one instance per command or request
pub struct SyncService<'a> {
    db: &'a DatabaseConnection,
    workspace: &'a Workspace,
    mode: SyncMode,
    missing_policy: MissingDocumentPolicy,
}

/// Commit attribution derived from the row's owning editor
fn owner_author(model: &post::Model) -> Option<Author> {
    model
        .owner_name
        .clone()
        .map(|name| Author::for_user(name, model.owner_email.clone()))
}

fn value_of<T>(value: &ActiveValue<T>) -> Option<T>
where
    T: Clone + Into<sea_orm::Value>,
{
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v.clone()),
        ActiveValue::NotSet => None,
    }
}

impl<'a> SyncService<'a> {
    pub fn new(db: &'a DatabaseConnection, workspace: &'a Workspace) -> Self {
        Self {
            db,
            workspace,
            mode: SyncMode::Mirror,
            missing_policy: MissingDocumentPolicy::Recreate,
        }
    }

    pub fn with_mode(mut self, mode: SyncMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_missing_policy(mut self, policy: MissingDocumentPolicy) -> Self {
        self.missing_policy = policy;
        self
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub fn db(&self) -> &DatabaseConnection {
        self.db
    }

    // ---- posts ----------------------------------------------------------

    /// Save a post row and mirror it into the store.
    ///
    /// A fresh insert lands at position 0 and every other post moves down
    /// one; this happens before the document write so the mirrored document
    /// carries the final position. Update callers must build the active
    /// model from the loaded row.
    pub async fn save_post(
        &self,
        mut post: post::ActiveModel,
        author: Option<&Author>,
    ) -> Result<post::Model> {
        let is_insert = value_of(&post.id).is_none();
        let title = value_of(&post.title)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CmsError::Validation("post requires a title".to_string()))?;

        post.slug = Set(slug::unique_post_slug(self.db, &title, value_of(&post.id)).await?);

        let now = Utc::now();
        if value_of(&post.created).is_none() {
            post.created = Set(now);
        }
        post.modified = Set(now);

        let model = if is_insert {
            if value_of(&post.position).is_none() {
                post.position = Set(0);
            }
            if value_of(&post.featured).is_none() {
                post.featured = Set(false);
            }
            if value_of(&post.featured_in_category).is_none() {
                post.featured_in_category = Set(false);
            }
            // Insert at the top: every existing post moves down one.
            // Import mode loads positions verbatim and must not renumber.
            if self.mode == SyncMode::Mirror {
                post::Entity::update_many()
                    .col_expr(
                        post::Column::Position,
                        Expr::col(post::Column::Position).add(1),
                    )
                    .exec(self.db)
                    .await?;
            }
            post.insert(self.db).await?
        } else {
            post.update(self.db).await?
        };

        if self.mode == SyncMode::Mirror {
            self.mirror_post(model, true, author).await
        } else {
            Ok(model)
        }
    }

    /// Delete a post row together with its relation rows and its mirrored
    /// document. An already-absent document is not an error.
    pub async fn delete_post(&self, model: post::Model, author: Option<&Author>) -> Result<()> {
        related_post::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(related_post::Column::FromPostId.eq(model.id))
                    .add(related_post::Column::ToPostId.eq(model.id)),
            )
            .exec(self.db)
            .await?;
        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(model.id))
            .exec(self.db)
            .await?;
        post::Entity::delete_by_id(model.id).exec(self.db).await?;

        if self.mode == SyncMode::Mirror {
            if let Some(uuid) = model.uuid.as_deref().filter(|u| !u.is_empty()) {
                let owner = owner_author(&model);
                let removed = self.workspace.delete::<PageDocument>(
                    uuid,
                    &format!("Page deleted: {}", model.title),
                    author.or(owner.as_ref()),
                )?;
                if !removed {
                    info!("Page document {} was already absent", uuid);
                }
            }
        }
        Ok(())
    }

    /// Replace the ordered related-posts list of a post.
    ///
    /// The relation is persisted after the row save completes, so this runs
    /// as a separate step; the re-mirror takes the update path only — a
    /// relation-only change never creates a document.
    pub async fn set_related_posts(
        &self,
        post_id: i32,
        related_ids: &[i32],
        author: Option<&Author>,
    ) -> Result<post::Model> {
        let model = self.require_post(post_id).await?;

        related_post::Entity::delete_many()
            .filter(related_post::Column::FromPostId.eq(post_id))
            .exec(self.db)
            .await?;
        for (position, to_post_id) in related_ids.iter().enumerate() {
            related_post::ActiveModel {
                from_post_id: Set(post_id),
                to_post_id: Set(*to_post_id),
                position: Set(position as i32),
                ..Default::default()
            }
            .insert(self.db)
            .await?;
        }

        if self.mode == SyncMode::Mirror {
            self.mirror_post(model, false, author).await
        } else {
            Ok(model)
        }
    }

    /// Replace a post's author tags; update-path-only re-mirror, like
    /// `set_related_posts`
    pub async fn set_tags(
        &self,
        post_id: i32,
        tags: &[String],
        author: Option<&Author>,
    ) -> Result<post::Model> {
        let model = self.require_post(post_id).await?;

        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .exec(self.db)
            .await?;
        for tag in tags {
            post_tag::ActiveModel {
                post_id: Set(post_id),
                tag: Set(tag.clone()),
                ..Default::default()
            }
            .insert(self.db)
            .await?;
        }

        if self.mode == SyncMode::Mirror {
            self.mirror_post(model, false, author).await
        } else {
            Ok(model)
        }
    }

    async fn require_post(&self, post_id: i32) -> Result<post::Model> {
        post::Entity::find_by_id(post_id)
            .one(self.db)
            .await?
            .ok_or_else(|| CmsError::Validation(format!("no post with id {}", post_id)))
    }

    /// Mirror a post row into the store: update the existing document when
    /// the row's uuid resolves, otherwise create (subject to the missing
    /// policy and `allow_create`).
    async fn mirror_post(
        &self,
        model: post::Model,
        allow_create: bool,
        author: Option<&Author>,
    ) -> Result<post::Model> {
        let snapshot = self.post_snapshot(&model).await?;
        let mut doc = mapping::page_document(&snapshot);

        // The commit is attributed to the row's owning editor unless the
        // caller supplied an explicit author
        let owner = owner_author(&model);
        let author = author.or(owner.as_ref());

        if let Some(uuid) = model.uuid.clone().filter(|u| !u.is_empty()) {
            let existing = match self.workspace.get::<PageDocument>(&uuid) {
                Ok(found) => found,
                Err(err) => {
                    // Anomalous lookup: recoverability takes priority
                    warn!("Page lookup for {} failed ({}); treating as missing", uuid, err);
                    None
                }
            };
            if existing.is_some() {
                self.workspace.save(
                    &mut doc,
                    &format!("Page updated: {}", model.title),
                    author,
                )?;
                return Ok(model);
            }
            if !allow_create {
                warn!(
                    "Page document {} missing on relation-only change; not recreating",
                    uuid
                );
                return Ok(model);
            }
            match self.missing_policy {
                MissingDocumentPolicy::Recreate => {
                    warn!("Page document {} missing for post {}; recreating", uuid, model.id);
                }
                MissingDocumentPolicy::Error => {
                    return Err(CmsError::DocumentMissing(uuid));
                }
            }
        } else if !allow_create {
            warn!(
                "Post {} has no document yet; relation-only change not mirrored",
                model.id
            );
            return Ok(model);
        }

        // Create path: the store assigns the uuid, which is written back to
        // the row without re-entering this service and without touching
        // the modified timestamp
        doc.uuid.clear();
        let uuid = self.workspace.save(
            &mut doc,
            &format!("Page created: {}", model.title),
            author,
        )?;
        post::Entity::update_many()
            .col_expr(post::Column::Uuid, Expr::value(uuid.clone()))
            .filter(post::Column::Id.eq(model.id))
            .exec(self.db)
            .await?;

        let mut model = model;
        model.uuid = Some(uuid);
        Ok(model)
    }

    async fn post_snapshot(&self, model: &post::Model) -> Result<PostSnapshot> {
        let locale = match model.localisation_id {
            Some(id) => localisation::Entity::find_by_id(id)
                .one(self.db)
                .await?
                .map(|l| l.locale_code()),
            None => None,
        };
        let primary_category_uuid = match model.primary_category_id {
            Some(id) => category::Entity::find_by_id(id)
                .one(self.db)
                .await?
                .and_then(|c| c.uuid),
            None => None,
        };
        let source_uuid = match model.source_id {
            Some(id) => post::Entity::find_by_id(id)
                .one(self.db)
                .await?
                .and_then(|p| p.uuid),
            None => None,
        };

        let links = related_post::Entity::find()
            .filter(related_post::Column::FromPostId.eq(model.id))
            .order_by_asc(related_post::Column::Position)
            .all(self.db)
            .await?;
        let mut linked_page_uuids = Vec::with_capacity(links.len());
        for link in links {
            if let Some(target) = post::Entity::find_by_id(link.to_post_id).one(self.db).await? {
                if let Some(uuid) = target.uuid.filter(|u| !u.is_empty()) {
                    linked_page_uuids.push(uuid);
                }
            }
        }

        let author_tags = post_tag::Entity::find()
            .filter(post_tag::Column::PostId.eq(model.id))
            .order_by_asc(post_tag::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(|t| t.tag)
            .collect();

        Ok(PostSnapshot {
            post: model.clone(),
            locale,
            primary_category_uuid,
            source_uuid,
            linked_page_uuids,
            author_tags,
        })
    }

    // ---- categories -----------------------------------------------------

    pub async fn save_category(
        &self,
        mut category: category::ActiveModel,
        author: Option<&Author>,
    ) -> Result<category::Model> {
        let is_insert = value_of(&category.id).is_none();
        let title = value_of(&category.title)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CmsError::Validation("category requires a title".to_string()))?;

        // Slug stays dirty on every save so a bare re-save (resync, locale
        // fix-up) still produces a valid update statement
        category.slug = match value_of(&category.slug).filter(|s| !s.is_empty()) {
            Some(slug) => Set(slug),
            None => Set(slug::unique_category_slug(self.db, &title, value_of(&category.id)).await?),
        };
        if is_insert {
            if value_of(&category.position).is_none() {
                category.position = Set(0);
            }
            if value_of(&category.featured_in_navbar).is_none() {
                category.featured_in_navbar = Set(false);
            }
        }

        let model = if is_insert {
            category.insert(self.db).await?
        } else {
            category.update(self.db).await?
        };

        if self.mode == SyncMode::Mirror {
            self.mirror_category(model, true, author).await
        } else {
            Ok(model)
        }
    }

    pub async fn delete_category(
        &self,
        model: category::Model,
        author: Option<&Author>,
    ) -> Result<()> {
        category::Entity::delete_by_id(model.id).exec(self.db).await?;

        if self.mode == SyncMode::Mirror {
            if let Some(uuid) = model.uuid.as_deref().filter(|u| !u.is_empty()) {
                let removed = self.workspace.delete::<CategoryDocument>(
                    uuid,
                    &format!("Category deleted: {}", model.title),
                    author,
                )?;
                if !removed {
                    info!("Category document {} was already absent", uuid);
                }
            }
        }
        Ok(())
    }

    async fn mirror_category(
        &self,
        model: category::Model,
        allow_create: bool,
        author: Option<&Author>,
    ) -> Result<category::Model> {
        let snapshot = self.category_snapshot(&model).await?;
        let mut doc = mapping::category_document(&snapshot);

        if let Some(uuid) = model.uuid.clone().filter(|u| !u.is_empty()) {
            let existing = match self.workspace.get::<CategoryDocument>(&uuid) {
                Ok(found) => found,
                Err(err) => {
                    warn!(
                        "Category lookup for {} failed ({}); treating as missing",
                        uuid, err
                    );
                    None
                }
            };
            if existing.is_some() {
                self.workspace.save(
                    &mut doc,
                    &format!("Category updated: {}", model.title),
                    author,
                )?;
                return Ok(model);
            }
            if !allow_create {
                warn!(
                    "Category document {} missing on relation-only change; not recreating",
                    uuid
                );
                return Ok(model);
            }
            match self.missing_policy {
                MissingDocumentPolicy::Recreate => {
                    warn!(
                        "Category document {} missing for category {}; recreating",
                        uuid, model.id
                    );
                }
                MissingDocumentPolicy::Error => {
                    return Err(CmsError::DocumentMissing(uuid));
                }
            }
        }

        doc.uuid.clear();
        let uuid = self.workspace.save(
            &mut doc,
            &format!("Category created: {}", model.title),
            author,
        )?;
        category::Entity::update_many()
            .col_expr(category::Column::Uuid, Expr::value(uuid.clone()))
            .filter(category::Column::Id.eq(model.id))
            .exec(self.db)
            .await?;

        let mut model = model;
        model.uuid = Some(uuid);
        Ok(model)
    }

    async fn category_snapshot(&self, model: &category::Model) -> Result<CategorySnapshot> {
        let locale = match model.localisation_id {
            Some(id) => localisation::Entity::find_by_id(id)
                .one(self.db)
                .await?
                .map(|l| l.locale_code()),
            None => None,
        };
        let source_uuid = match model.source_id {
            Some(id) => category::Entity::find_by_id(id)
                .one(self.db)
                .await?
                .and_then(|c| c.uuid),
            None => None,
        };
        Ok(CategorySnapshot {
            category: model.clone(),
            locale,
            source_uuid,
        })
    }

    // ---- localisations --------------------------------------------------

    /// Get or create the localisation for a composed locale code
    pub async fn localisation_for(
        &self,
        code: &str,
        author: Option<&Author>,
    ) -> Result<localisation::Model> {
        let (language, country) = localisation::split_locale_code(code)
            .ok_or_else(|| CmsError::Validation(format!("malformed locale code '{}'", code)))?;

        if let Some(existing) = localisation::Entity::find()
            .filter(localisation::Column::LanguageCode.eq(language))
            .filter(localisation::Column::CountryCode.eq(country))
            .one(self.db)
            .await?
        {
            return Ok(existing);
        }

        self.save_localisation(
            localisation::ActiveModel {
                language_code: Set(language.to_string()),
                country_code: Set(country.to_string()),
                ..Default::default()
            },
            author,
        )
        .await
    }

    pub async fn save_localisation(
        &self,
        localisation: localisation::ActiveModel,
        author: Option<&Author>,
    ) -> Result<localisation::Model> {
        let is_insert = value_of(&localisation.id).is_none();
        let model = if is_insert {
            localisation.insert(self.db).await?
        } else {
            localisation.update(self.db).await?
        };

        if self.mode == SyncMode::Mirror {
            let mut doc = mapping::localisation_document(&model);
            let message = if self.workspace.get::<LocalisationDocument>(&doc.locale)?.is_some() {
                format!("Localisation updated: {}", doc.locale)
            } else {
                format!("Localisation created: {}", doc.locale)
            };
            self.workspace.save(&mut doc, &message, author)?;
        }
        Ok(model)
    }

    pub async fn delete_localisation(
        &self,
        model: localisation::Model,
        author: Option<&Author>,
    ) -> Result<()> {
        let locale = model.locale_code();
        localisation::Entity::delete_by_id(model.id)
            .exec(self.db)
            .await?;

        if self.mode == SyncMode::Mirror {
            let removed = self.workspace.delete::<LocalisationDocument>(
                &locale,
                &format!("Localisation deleted: {}", locale),
                author,
            )?;
            if !removed {
                info!("Localisation document {} was already absent", locale);
            }
        }
        Ok(())
    }

    // ---- repository configuration ---------------------------------------

    /// Save repository configuration; a license change is committed into the
    /// store as the LICENSE file
    pub async fn save_repository(
        &self,
        repository: content_repository::ActiveModel,
        author: Option<&Author>,
    ) -> Result<content_repository::Model> {
        let is_insert = value_of(&repository.id).is_none();
        let model = if is_insert {
            repository.insert(self.db).await?
        } else {
            repository.update(self.db).await?
        };

        if self.mode == SyncMode::Mirror {
            if let Some(license) = &model.license {
                self.workspace.save_license(
                    license,
                    &format!("License updated: {}", model.name),
                    author,
                )?;
            }
        }
        Ok(model)
    }
}
