//! Slug derivation with numeric-suffix collision resolution

use crate::error::Result;
use crate::infrastructure::database::entities::{category, post};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

/// Reduce a title to a url-safe slug
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("untitled");
    }
    slug
}

/// Unique slug for a post title, skipping the post's own row on update
pub async fn unique_post_slug(
    db: &DatabaseConnection,
    title: &str,
    exclude_id: Option<i32>,
) -> Result<String> {
    let base = slugify(title);
    let mut candidate = base.clone();
    let mut suffix = 1;
    loop {
        let mut query = post::Entity::find().filter(post::Column::Slug.eq(candidate.clone()));
        if let Some(id) = exclude_id {
            query = query.filter(post::Column::Id.ne(id));
        }
        if query.count(db).await? == 0 {
            return Ok(candidate);
        }
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
}

/// Unique slug for a category title, skipping the category's own row
pub async fn unique_category_slug(
    db: &DatabaseConnection,
    title: &str,
    exclude_id: Option<i32>,
) -> Result<String> {
    let base = slugify(title);
    let mut candidate = base.clone();
    let mut suffix = 1;
    loop {
        let mut query =
            category::Entity::find().filter(category::Column::Slug.eq(candidate.clone()));
        if let Some(id) = exclude_id {
            query = query.filter(category::Column::Id.ne(id));
        }
        if query.count(db).await? == 0 {
            return Ok(candidate);
        }
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
}
