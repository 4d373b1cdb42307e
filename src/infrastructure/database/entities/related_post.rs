//! Ordered, asymmetric self-referential relation between posts.
//!
//! "B relates to A" does not imply "A relates to B"; the `position` column
//! keeps the list order stable.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "related_posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub from_post_id: i32,
    pub to_post_id: i32,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::FromPostId",
        to = "super::post::Column::Id"
    )]
    FromPost,
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::ToPostId",
        to = "super::post::Column::Id"
    )]
    ToPost,
}

impl ActiveModelBehavior for ActiveModel {}
