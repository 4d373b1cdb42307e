//! Row-to-document mirroring behaviour

mod helpers;

use helpers::{post_draft, setup};
use pretty_assertions::assert_eq;
use sea_orm::{EntityTrait, IntoActiveModel, QueryOrder, Set};
use unicore_cms::infrastructure::database::entities::{category, content_repository, post};
use unicore_cms::infrastructure::gitstore::{CategoryDocument, PageDocument};
use unicore_cms::sync::{MissingDocumentPolicy, SyncService};
use unicore_cms::CmsError;

#[tokio::test]
async fn post_round_trips_field_for_field() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);

    let localisation = service.localisation_for("eng_GB", None).await.unwrap();
    let category = service
        .save_category(
            category::ActiveModel {
                title: Set("Guides".to_string()),
                localisation_id: Set(Some(localisation.id)),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    let mut draft = post_draft("Sample title");
    draft.subtitle = Set(Some("subtitle".to_string()));
    draft.description = Set(Some("description".to_string()));
    draft.content = Set(Some("sample content".to_string()));
    draft.primary_category_id = Set(Some(category.id));
    draft.localisation_id = Set(Some(localisation.id));
    draft.featured = Set(true);
    let saved = service.save_post(draft, None).await.unwrap();

    let uuid = saved.uuid.clone().expect("store assigned a uuid");
    let doc: PageDocument = env.ctx.workspace.get(&uuid).unwrap().expect("mirrored doc");

    assert_eq!(doc.title, "Sample title");
    assert_eq!(doc.subtitle.as_deref(), Some("subtitle"));
    assert_eq!(doc.slug, "sample-title");
    assert_eq!(doc.description.as_deref(), Some("description"));
    assert_eq!(doc.content.as_deref(), Some("sample content"));
    assert_eq!(doc.language.as_deref(), Some("eng_GB"));
    assert_eq!(doc.position, 0);
    assert!(doc.featured);
    assert!(!doc.featured_in_category);
    // References carry the document uuid, never the row pk
    assert_eq!(doc.primary_category, category.uuid);
    assert!(doc.created_at.is_some());
    assert!(doc.modified_at.is_some());
}

#[tokio::test]
async fn updating_a_post_updates_the_same_document() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);

    let saved = service.save_post(post_draft("First title"), None).await.unwrap();
    let uuid = saved.uuid.clone().unwrap();

    let mut active = saved.into_active_model();
    active.title = Set("Changed title".to_string());
    let updated = service.save_post(active, None).await.unwrap();

    assert_eq!(updated.uuid.as_deref(), Some(uuid.as_str()));
    let docs = env.ctx.workspace.iterate::<PageDocument>().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].title, "Changed title");
    assert_eq!(docs[0].uuid, uuid);
}

#[tokio::test]
async fn uuid_write_back_does_not_touch_modified() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);

    let saved = service.save_post(post_draft("Timestamps"), None).await.unwrap();
    let row = post::Entity::find_by_id(saved.id)
        .one(env.ctx.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.uuid, saved.uuid);
    assert_eq!(row.modified, saved.modified);
}

#[tokio::test]
async fn slug_collisions_get_numeric_suffixes() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);

    let first = service.save_post(post_draft("Sample title"), None).await.unwrap();
    let second = service.save_post(post_draft("Sample title"), None).await.unwrap();
    let third = service.save_post(post_draft("Sample title"), None).await.unwrap();

    assert_eq!(first.slug, "sample-title");
    assert_eq!(second.slug, "sample-title-1");
    assert_eq!(third.slug, "sample-title-2");
}

#[tokio::test]
async fn new_posts_insert_at_position_zero() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);

    let p1 = service.save_post(post_draft("New page"), None).await.unwrap();
    assert_eq!(p1.position, 0);

    let p2 = service.save_post(post_draft("New page 2"), None).await.unwrap();
    assert_eq!(p2.position, 0);

    let ordered = post::Entity::find()
        .order_by_asc(post::Column::Position)
        .all(env.ctx.db())
        .await
        .unwrap();
    assert_eq!(ordered[0].title, "New page 2");
    assert_eq!(ordered[0].position, 0);
    assert_eq!(ordered[1].title, "New page");
    assert_eq!(ordered[1].position, 1);

    // The first page's document is stale at position 0 until it is
    // saved again; a re-save picks up the shifted position
    let p1_doc: PageDocument = env
        .ctx
        .workspace
        .get(p1.uuid.as_deref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(p1_doc.position, 0);
    let resynced = service
        .save_post(
            post::Entity::find_by_id(p1.id)
                .one(env.ctx.db())
                .await
                .unwrap()
                .unwrap()
                .into_active_model(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(resynced.position, 1);
}

#[tokio::test]
async fn deleted_post_removes_document_idempotently() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);

    let saved = service.save_post(post_draft("Short lived"), None).await.unwrap();
    let uuid = saved.uuid.clone().unwrap();

    service.delete_post(saved.clone(), None).await.unwrap();
    assert!(env
        .ctx
        .workspace
        .get::<PageDocument>(&uuid)
        .unwrap()
        .is_none());

    // Deleting the already-absent document must not raise
    let removed = env
        .ctx
        .workspace
        .delete::<PageDocument>(&uuid, "gone already", None)
        .unwrap();
    assert!(!removed);
    assert_eq!(post::Entity::find().all(env.ctx.db()).await.unwrap().len(), 0);
}

#[tokio::test]
async fn missing_document_is_recreated_on_next_save() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);

    let saved = service.save_post(post_draft("Sample test title"), None).await.unwrap();
    let old_uuid = saved.uuid.clone().unwrap();

    // Remove the mirrored document out-of-band
    env.ctx
        .workspace
        .delete::<PageDocument>(&old_uuid, "removed out of band", None)
        .unwrap();

    let mut active = saved.into_active_model();
    active.title = Set("new title".to_string());
    let healed = service.save_post(active, None).await.unwrap();

    // Exactly one document, carrying the current values, not stale ones
    let docs = env.ctx.workspace.iterate::<PageDocument>().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].title, "new title");
    assert_eq!(healed.uuid.as_deref(), Some(docs[0].uuid.as_str()));

    let row = post::Entity::find_by_id(healed.id)
        .one(env.ctx.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.uuid, healed.uuid);
}

#[tokio::test]
async fn strict_policy_surfaces_missing_documents() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace)
        .with_missing_policy(MissingDocumentPolicy::Error);

    let saved = service.save_post(post_draft("Strict"), None).await.unwrap();
    let uuid = saved.uuid.clone().unwrap();
    env.ctx
        .workspace
        .delete::<PageDocument>(&uuid, "removed out of band", None)
        .unwrap();

    let mut active = saved.into_active_model();
    active.title = Set("edited".to_string());
    match service.save_post(active, None).await {
        Err(CmsError::DocumentMissing(missing)) => assert_eq!(missing, uuid),
        other => panic!("expected DocumentMissing, got {:?}", other.map(|m| m.id)),
    }
}

#[tokio::test]
async fn related_posts_are_ordered_and_asymmetric() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);

    let a = service.save_post(post_draft("Post A"), None).await.unwrap();
    let b = service.save_post(post_draft("Post B"), None).await.unwrap();

    service.set_related_posts(b.id, &[a.id], None).await.unwrap();

    let b_doc: PageDocument = env
        .ctx
        .workspace
        .get(b.uuid.as_deref().unwrap())
        .unwrap()
        .unwrap();
    let a_doc: PageDocument = env
        .ctx
        .workspace
        .get(a.uuid.as_deref().unwrap())
        .unwrap()
        .unwrap();

    assert_eq!(b_doc.linked_pages, vec![a.uuid.clone().unwrap()]);
    assert!(a_doc.linked_pages.is_empty());
}

#[tokio::test]
async fn relation_only_change_never_creates_a_document() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);

    let a = service.save_post(post_draft("Target"), None).await.unwrap();
    let b = service.save_post(post_draft("Holder"), None).await.unwrap();
    let b_uuid = b.uuid.clone().unwrap();

    env.ctx
        .workspace
        .delete::<PageDocument>(&b_uuid, "removed out of band", None)
        .unwrap();

    // The update-only path must not recreate the missing document
    service.set_related_posts(b.id, &[a.id], None).await.unwrap();
    assert_eq!(env.ctx.workspace.iterate::<PageDocument>().unwrap().len(), 1);
}

#[tokio::test]
async fn category_with_source_mirrors_source_uuid() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);

    let afr = service.localisation_for("afr_ZA", None).await.unwrap();
    let eng = service.localisation_for("eng_GB", None).await.unwrap();

    let original = service
        .save_category(
            category::ActiveModel {
                title: Set("Sample title".to_string()),
                localisation_id: Set(Some(afr.id)),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    let derived = service
        .save_category(
            category::ActiveModel {
                title: Set("Sample title".to_string()),
                localisation_id: Set(Some(eng.id)),
                source_id: Set(Some(original.id)),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    let doc: CategoryDocument = env
        .ctx
        .workspace
        .get(derived.uuid.as_deref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(doc.language.as_deref(), Some("eng_GB"));
    assert_eq!(doc.source, original.uuid);
    // Slug collision between the two got a suffix
    assert_eq!(original.slug, "sample-title");
    assert_eq!(derived.slug, "sample-title-1");
}

#[tokio::test]
async fn localisation_for_is_get_or_create() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);

    let first = service.localisation_for("eng_GB", None).await.unwrap();
    let second = service.localisation_for("eng_GB", None).await.unwrap();
    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn commits_are_attributed_to_the_owning_editor() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);

    let mut draft = post_draft("Owned page");
    draft.owner_name = Set(Some("Jess Editor".to_string()));
    draft.owner_email = Set(Some("jess@example.org".to_string()));
    service.save_post(draft, None).await.unwrap();

    let repo = git2::Repository::open(env.ctx.workspace.working_dir()).unwrap();
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(head.message(), Some("Page created: Owned page"));
    assert_eq!(head.author().name(), Some("Jess Editor"));
    assert_eq!(head.author().email(), Some("jess@example.org"));
}

#[tokio::test]
async fn owner_without_email_falls_back_to_default_address() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);

    let mut draft = post_draft("Half attributed");
    draft.owner_name = Set(Some("Sam".to_string()));
    service.save_post(draft, None).await.unwrap();

    let repo = git2::Repository::open(env.ctx.workspace.working_dir()).unwrap();
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(head.author().name(), Some("Sam"));
    assert_eq!(head.author().email(), Some("author@unicore.io"));
}

#[tokio::test]
async fn license_save_commits_license_file() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);

    service
        .save_repository(
            content_repository::ActiveModel {
                name: Set("main".to_string()),
                license: Set(Some("CC-BY-4.0".to_string())),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(
        env.ctx.workspace.license().unwrap().as_deref(),
        Some("CC-BY-4.0")
    );
}
