//! Localisation entity — the locale identity referenced by posts and categories

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "localisations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// ISO-639 style language code, e.g. "eng"
    pub language_code: String,
    /// ISO-3166 style country code, e.g. "GB"
    pub country_code: String,
    pub image: Option<String>,
    pub image_host: Option<String>,
    pub logo_text: Option<String>,
    pub logo_description: Option<String>,
}

impl Model {
    /// Composed locale code, e.g. "eng_GB"
    pub fn locale_code(&self) -> String {
        format!("{}_{}", self.language_code, self.country_code)
    }
}

/// Split a composed locale code into (language, country)
pub fn split_locale_code(code: &str) -> Option<(&str, &str)> {
    let mut parts = code.splitn(2, '_');
    match (parts.next(), parts.next()) {
        (Some(language), Some(country)) if !language.is_empty() && !country.is_empty() => {
            Some((language, country))
        }
        _ => None,
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
    #[sea_orm(has_many = "super::category::Entity")]
    Categories,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
