use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book_information")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub authors: String,
    pub categories: String,
    pub publisher: String,
    pub file_name: String,
    pub info_link: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::BookInformation {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            authors: model.authors,
            categories: model.categories,
            publisher: model.publisher,
            file_name: model.file_name,
            info_link: model.info_link,
            created_at: model.created_at,
        }
    }
}
