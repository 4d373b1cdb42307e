//! Resync the content repository with the relational database.
//!
//! Relational deletes already propagate at delete time; this sweep exists to
//! catch divergence introduced by direct repository manipulation. Every row
//! is re-saved (forcing the create-or-update mirror path) and every document
//! without a matching row is deleted as an orphan.

use crate::commands::CommandContext;
use crate::error::Result;
use crate::infrastructure::database::entities::{category, post};
use crate::infrastructure::gitstore::{CategoryDocument, Document, PageDocument};
use crate::shared::lock::CommandLock;
use crate::sync::SyncService;
use sea_orm::{EntityTrait, IntoActiveModel};
use std::collections::HashSet;
use std::io::Write;

const ORPHAN_MESSAGE: &str = "This has been deleted in the CMS";

pub async fn run(ctx: &CommandContext, out: &mut dyn Write) -> Result<()> {
    let _lock = CommandLock::acquire(&ctx.config.data_dir, super::BATCH_LOCK)?;
    let service =
        SyncService::new(ctx.db(), &ctx.workspace).with_missing_policy(ctx.missing_policy());

    // Posts
    let mut live = HashSet::new();
    for model in post::Entity::find().all(ctx.db()).await? {
        let saved = service.save_post(model.into_active_model(), None).await?;
        if let Some(uuid) = saved.uuid {
            live.insert(uuid);
        }
    }
    for doc in ctx.workspace.iterate::<PageDocument>()? {
        if live.contains(&doc.uuid) {
            writeln!(out, "Kept {}: {}.", PageDocument::KIND, doc.uuid)?;
        } else {
            ctx.workspace
                .delete::<PageDocument>(&doc.uuid, ORPHAN_MESSAGE, None)?;
            // Stale index entries are removed too; already-absent is fine
            ctx.workspace.index().remove(PageDocument::DIR, &doc.uuid)?;
            writeln!(out, "Deleted {}: {}.", PageDocument::KIND, doc.uuid)?;
        }
    }

    // Categories
    let mut live = HashSet::new();
    for model in category::Entity::find().all(ctx.db()).await? {
        let saved = service
            .save_category(model.into_active_model(), None)
            .await?;
        if let Some(uuid) = saved.uuid {
            live.insert(uuid);
        }
    }
    for doc in ctx.workspace.iterate::<CategoryDocument>()? {
        if live.contains(&doc.uuid) {
            writeln!(out, "Kept {}: {}.", CategoryDocument::KIND, doc.uuid)?;
        } else {
            ctx.workspace
                .delete::<CategoryDocument>(&doc.uuid, ORPHAN_MESSAGE, None)?;
            ctx.workspace
                .index()
                .remove(CategoryDocument::DIR, &doc.uuid)?;
            writeln!(out, "Deleted {}: {}.", CategoryDocument::KIND, doc.uuid)?;
        }
    }

    Ok(())
}
