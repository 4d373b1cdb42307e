//! Post entity — the editable article row mirrored into the content repository

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Assigned by the document store on first mirror, not by us
    pub uuid: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub slug: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub created: DateTimeUtc,
    pub modified: DateTimeUtc,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub primary_category_id: Option<i32>,
    pub source_id: Option<i32>,
    pub localisation_id: Option<i32>,
    /// Ordering key; new posts are inserted at 0
    pub position: i32,
    pub featured: bool,
    pub featured_in_category: bool,
    pub image: Option<String>,
    pub image_host: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::PrimaryCategoryId",
        to = "super::category::Column::Id"
    )]
    PrimaryCategory,
    #[sea_orm(belongs_to = "Entity", from = "Column::SourceId", to = "Column::Id")]
    Source,
    #[sea_orm(
        belongs_to = "super::localisation::Entity",
        from = "Column::LocalisationId",
        to = "super::localisation::Column::Id"
    )]
    Localisation,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PrimaryCategory.def()
    }
}

impl Related<super::localisation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Localisation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
