//! Category entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Assigned by the document store on first mirror
    pub uuid: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub slug: String,
    pub localisation_id: Option<i32>,
    /// Localised derivative categories point at their source
    pub source_id: Option<i32>,
    pub featured_in_navbar: bool,
    pub position: i32,
    pub image: Option<String>,
    pub image_host: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(belongs_to = "Entity", from = "Column::SourceId", to = "Column::Id")]
    Source,
    #[sea_orm(
        belongs_to = "super::localisation::Entity",
        from = "Column::LocalisationId",
        to = "super::localisation::Column::Id"
    )]
    Localisation,
}

impl Related<super::localisation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Localisation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
