use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "genre_predictions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub genre: String,
    pub confidence: String, // decimal string, as returned by the model
    pub file_name: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::GenrePrediction {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            genre: model.genre,
            confidence: model.confidence,
            file_name: model.file_name,
            created_at: model.created_at,
        }
    }
}
