//! Resync the search index with the content repository.
//!
//! Each tracked document type is reconciled against current document
//! contents; localisation entries are keyed by locale code rather than uuid.

use crate::commands::CommandContext;
use crate::error::Result;
use crate::infrastructure::gitstore::{
    CategoryDocument, Document, LocalisationDocument, PageDocument,
};
use crate::shared::lock::CommandLock;
use std::io::Write;

pub async fn run(ctx: &CommandContext, out: &mut dyn Write) -> Result<()> {
    let _lock = CommandLock::acquire(&ctx.config.data_dir, super::BATCH_LOCK)?;

    let (updated, removed) = ctx.workspace.sync::<PageDocument>()?;
    writeln!(
        out,
        "{}: {} updated, {} removed.",
        PageDocument::KIND,
        updated.len(),
        removed.len()
    )?;

    let (updated, removed) = ctx.workspace.sync::<CategoryDocument>()?;
    writeln!(
        out,
        "{}: {} updated, {} removed.",
        CategoryDocument::KIND,
        updated.len(),
        removed.len()
    )?;

    let (updated, removed) = ctx.workspace.sync::<LocalisationDocument>()?;
    writeln!(
        out,
        "{}: {} updated, {} removed.",
        LocalisationDocument::KIND,
        updated.len(),
        removed.len()
    )?;

    Ok(())
}
