//! Content repository configuration — license text committed into the store

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_repositories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub license: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::publishing_target::Entity")]
    PublishingTargets,
}

impl Related<super::publishing_target::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PublishingTargets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
