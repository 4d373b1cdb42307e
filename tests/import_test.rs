//! Bulk import from the content repository

mod helpers;

use helpers::{post_draft, setup};
use pretty_assertions::assert_eq;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::io::Cursor;
use unicore_cms::commands::import::{self, ImportOptions, ImportReport};
use unicore_cms::infrastructure::database::entities::{
    category, localisation, post, post_tag, related_post,
};
use unicore_cms::infrastructure::gitstore::{
    CategoryDocument, LocalisationDocument, PageDocument,
};
use unicore_cms::sync::SyncService;

const QUIET: ImportOptions = ImportOptions { quiet: true };

fn uuid_of(fill: char) -> String {
    std::iter::repeat(fill).take(32).collect()
}

fn page(uuid: &str, title: &str, slug: &str) -> PageDocument {
    PageDocument {
        uuid: uuid.to_string(),
        title: title.to_string(),
        slug: slug.to_string(),
        ..Default::default()
    }
}

async fn run_quiet(env: &helpers::TestEnv) -> ImportReport {
    let mut input = Cursor::new(Vec::new());
    let mut out = Vec::new();
    import::run(&env.ctx, &QUIET, &mut input, &mut out)
        .await
        .expect("import run")
}

#[tokio::test]
async fn import_populates_rows_from_documents() {
    let env = setup().await;

    env.ctx
        .workspace
        .save(
            &mut LocalisationDocument {
                locale: "eng_GB".to_string(),
                logo_text: Some("logo".to_string()),
                ..Default::default()
            },
            "Localisation created: eng_GB",
            None,
        )
        .unwrap();
    let cat_uuid = uuid_of('c');
    env.ctx
        .workspace
        .save(
            &mut CategoryDocument {
                uuid: cat_uuid.clone(),
                title: "Guides".to_string(),
                slug: "guides".to_string(),
                language: Some("eng_GB".to_string()),
                position: 3,
                ..Default::default()
            },
            "Category created: Guides",
            None,
        )
        .unwrap();
    let mut doc = page(&uuid_of('a'), "Imported page", "imported-page");
    doc.language = Some("eng_GB".to_string());
    doc.primary_category = Some(cat_uuid.clone());
    doc.position = 7;
    env.ctx
        .workspace
        .save(&mut doc, "Page created: Imported page", None)
        .unwrap();

    let report = run_quiet(&env).await;
    assert_eq!(
        report,
        ImportReport {
            localisations: 1,
            categories: 1,
            posts: 1,
            skipped: 0
        }
    );

    let row = post::Entity::find().one(env.ctx.db()).await.unwrap().unwrap();
    assert_eq!(row.uuid.as_deref(), Some(uuid_of('a').as_str()));
    assert_eq!(row.title, "Imported page");
    // Positions load verbatim; the import never renumbers
    assert_eq!(row.position, 7);
    assert!(row.primary_category_id.is_some());
    assert!(row.localisation_id.is_some());

    let cat = category::Entity::find().one(env.ctx.db()).await.unwrap().unwrap();
    assert_eq!(cat.uuid.as_deref(), Some(cat_uuid.as_str()));
    assert_eq!(cat.slug, "guides");
    assert_eq!(cat.position, 3);

    let locale = localisation::Entity::find()
        .one(env.ctx.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(locale.locale_code(), "eng_GB");
    assert_eq!(locale.logo_text.as_deref(), Some("logo"));
}

#[tokio::test]
async fn import_resolves_sources_regardless_of_store_order() {
    let env = setup().await;

    // The child sorts before its source in directory order, so a single
    // pass could not resolve the link
    let child_uuid = uuid_of('a');
    let source_uuid = uuid_of('z');
    let mut child = page(&child_uuid, "Derived", "derived");
    child.source = Some(source_uuid.clone());
    env.ctx
        .workspace
        .save(&mut child, "Page created: Derived", None)
        .unwrap();
    env.ctx
        .workspace
        .save(
            &mut page(&source_uuid, "Original", "original"),
            "Page created: Original",
            None,
        )
        .unwrap();

    let report = run_quiet(&env).await;
    assert_eq!(report.posts, 2);
    assert_eq!(report.skipped, 0);

    let child_row = post::Entity::find()
        .filter(post::Column::Uuid.eq(child_uuid))
        .one(env.ctx.db())
        .await
        .unwrap()
        .unwrap();
    let source_row = post::Entity::find()
        .filter(post::Column::Uuid.eq(source_uuid))
        .one(env.ctx.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(child_row.source_id, Some(source_row.id));
    assert_eq!(source_row.source_id, None);
}

#[tokio::test]
async fn import_restores_linked_pages_and_tags() {
    let env = setup().await;

    let first_uuid = uuid_of('1');
    let second_uuid = uuid_of('2');
    let holder_uuid = uuid_of('9');
    env.ctx
        .workspace
        .save(&mut page(&first_uuid, "First", "first"), "Page created: First", None)
        .unwrap();
    env.ctx
        .workspace
        .save(
            &mut page(&second_uuid, "Second", "second"),
            "Page created: Second",
            None,
        )
        .unwrap();
    let mut holder = page(&holder_uuid, "Holder", "holder");
    holder.linked_pages = vec![second_uuid.clone(), first_uuid.clone()];
    holder.author_tags = vec!["news".to_string(), "feature".to_string()];
    env.ctx
        .workspace
        .save(&mut holder, "Page created: Holder", None)
        .unwrap();

    run_quiet(&env).await;

    let holder_row = post::Entity::find()
        .filter(post::Column::Uuid.eq(holder_uuid))
        .one(env.ctx.db())
        .await
        .unwrap()
        .unwrap();
    let related = related_post::Entity::find()
        .filter(related_post::Column::FromPostId.eq(holder_row.id))
        .order_by_asc(related_post::Column::Position)
        .all(env.ctx.db())
        .await
        .unwrap();
    assert_eq!(related.len(), 2);

    let second_row = post::Entity::find()
        .filter(post::Column::Uuid.eq(second_uuid))
        .one(env.ctx.db())
        .await
        .unwrap()
        .unwrap();
    // Document order is preserved in relation positions
    assert_eq!(related[0].to_post_id, second_row.id);

    let tags: Vec<String> = post_tag::Entity::find()
        .filter(post_tag::Column::PostId.eq(holder_row.id))
        .all(env.ctx.db())
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.tag)
        .collect();
    assert_eq!(tags.len(), 2);
    assert!(tags.contains(&"news".to_string()));
    assert!(tags.contains(&"feature".to_string()));
}

#[tokio::test]
async fn page_with_unknown_category_is_skipped_not_fatal() {
    let env = setup().await;

    let mut broken = page(&uuid_of('b'), "Broken", "broken");
    broken.primary_category = Some(uuid_of('0'));
    env.ctx
        .workspace
        .save(&mut broken, "Page created: Broken", None)
        .unwrap();
    env.ctx
        .workspace
        .save(&mut page(&uuid_of('f'), "Fine", "fine"), "Page created: Fine", None)
        .unwrap();

    let report = run_quiet(&env).await;
    assert_eq!(report.posts, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(post::Entity::find().all(env.ctx.db()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn import_prompts_before_deleting_and_respects_no() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);
    let existing = service.save_post(post_draft("Existing"), None).await.unwrap();

    let mut input = Cursor::new(b"n\n".to_vec());
    let mut out = Vec::new();
    import::run(&env.ctx, &ImportOptions { quiet: false }, &mut input, &mut out)
        .await
        .unwrap();

    let output = String::from_utf8(out).unwrap();
    assert!(output.starts_with("Do you want to delete existing data? Y/n: "));
    assert!(!output.contains("deleting existing content.."));

    // The existing row survived and its own document counted as present
    let row = post::Entity::find_by_id(existing.id)
        .one(env.ctx.db())
        .await
        .unwrap();
    assert!(row.is_some());
}

#[tokio::test]
async fn quiet_import_deletes_existing_rows_first() {
    let env = setup().await;
    let service = SyncService::new(env.ctx.db(), &env.ctx.workspace);
    service.save_post(post_draft("Old row"), None).await.unwrap();

    env.ctx
        .workspace
        .save(
            &mut page(&uuid_of('d'), "From store", "from-store"),
            "Page created: From store",
            None,
        )
        .unwrap();

    let mut input = Cursor::new(Vec::new());
    let mut out = Vec::new();
    import::run(&env.ctx, &QUIET, &mut input, &mut out)
        .await
        .unwrap();

    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("deleting existing content.."));
    assert!(output.contains("creating pages.."));
    assert!(output.ends_with("done.\n"));

    // Both documents are in the store, so both come back as rows
    let titles: Vec<String> = post::Entity::find()
        .all(env.ctx.db())
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"From store".to_string()));
    assert!(titles.contains(&"Old row".to_string()));
}

#[tokio::test]
async fn image_fields_pass_through_without_an_asset_host() {
    let env = setup().await;

    let mut doc = page(&uuid_of('7'), "Pictured", "pictured");
    doc.image = Some("img-1".to_string());
    doc.image_host = Some("http://assets.example.org".to_string());
    env.ctx
        .workspace
        .save(&mut doc, "Page created: Pictured", None)
        .unwrap();

    run_quiet(&env).await;

    // No asset host configured: references carry over untouched
    let row = post::Entity::find().one(env.ctx.db()).await.unwrap().unwrap();
    assert_eq!(row.image.as_deref(), Some("img-1"));
    assert_eq!(row.image_host.as_deref(), Some("http://assets.example.org"));
}

#[tokio::test]
async fn repeated_import_is_stable() {
    let env = setup().await;

    env.ctx
        .workspace
        .save(
            &mut page(&uuid_of('e'), "Stable", "stable"),
            "Page created: Stable",
            None,
        )
        .unwrap();

    let first = run_quiet(&env).await;
    let second = run_quiet(&env).await;
    assert_eq!(first, second);
    assert_eq!(post::Entity::find().all(env.ctx.db()).await.unwrap().len(), 1);
}
