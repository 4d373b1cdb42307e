//! Fix rows carrying incorrect locale codes.
//!
//! Historic content used `swh` for Swahili and `UK` for Great Britain;
//! the correct codes are `swa` and `GB`. Affected categories and posts are
//! re-saved afterwards so their mirrored documents pick up the corrected
//! locale string.

use crate::commands::CommandContext;
use crate::error::Result;
use crate::infrastructure::database::entities::{category, localisation, post, publishing_target};
use crate::infrastructure::gitstore::LocalisationDocument;
use crate::shared::lock::CommandLock;
use crate::sync::SyncService;
use crate::tasks;
use sea_orm::{ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set};
use std::io::Write;
use tracing::warn;

pub async fn run(ctx: &CommandContext, push: bool, out: &mut dyn Write) -> Result<()> {
    let _lock = CommandLock::acquire(&ctx.config.data_dir, super::BATCH_LOCK)?;
    let service =
        SyncService::new(ctx.db(), &ctx.workspace).with_missing_policy(ctx.missing_policy());

    writeln!(out, "Fixing localisations..")?;
    let mut fixed_ids = Vec::new();
    for model in localisation::Entity::find().all(ctx.db()).await? {
        let old_locale = model.locale_code();
        let mut active = model.clone().into_active_model();
        let mut changed = false;

        if model.language_code == "swh" {
            active.language_code = Set("swa".to_string());
            changed = true;
        }
        if model.country_code == "UK" {
            active.country_code = Set("GB".to_string());
            changed = true;
        }
        if !changed {
            continue;
        }

        let updated = service.save_localisation(active, None).await?;
        // The document key changed with the code; drop the stale one
        ctx.workspace.delete::<LocalisationDocument>(
            &old_locale,
            &format!(
                "Localisation re-coded: {} -> {}",
                old_locale,
                updated.locale_code()
            ),
            None,
        )?;
        fixed_ids.push(updated.id);
        writeln!(out, "Fixed {} -> {}", old_locale, updated.locale_code())?;
    }

    for model in category::Entity::find()
        .filter(category::Column::LocalisationId.is_in(fixed_ids.clone()))
        .all(ctx.db())
        .await?
    {
        service.save_category(model.into_active_model(), None).await?;
    }
    for model in post::Entity::find()
        .filter(post::Column::LocalisationId.is_in(fixed_ids.clone()))
        .all(ctx.db())
        .await?
    {
        service.save_post(model.into_active_model(), None).await?;
    }

    if push {
        let targets = publishing_target::Entity::find().all(ctx.db()).await?;
        // Push failures are tolerated, but the attempt must finish before
        // the command returns
        if let Err(err) = tasks::spawn_push(ctx.config.clone(), targets).await {
            warn!("Push task did not complete: {}", err);
        }
    }

    writeln!(out, "done.")?;
    Ok(())
}
