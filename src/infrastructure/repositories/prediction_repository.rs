//! SeaORM implementation of PredictionRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set,
    TransactionTrait,
};

use crate::domain::{
    BookInformation, DomainError, GenrePrediction, NewBookInformation, NewGenrePrediction, Page,
    PredictionRepository,
};
use crate::models::{book_information, genre_prediction};

/// SeaORM-based implementation of PredictionRepository
pub struct SeaOrmPredictionRepository {
    db: DatabaseConnection,
}

impl SeaOrmPredictionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PredictionRepository for SeaOrmPredictionRepository {
    async fn record_confirmed(
        &self,
        genre: NewGenrePrediction,
        info: NewBookInformation,
    ) -> Result<(GenrePrediction, BookInformation), DomainError> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.db.begin().await?;

        let info_model = book_information::ActiveModel {
            title: Set(info.title),
            authors: Set(info.authors),
            categories: Set(info.categories),
            publisher: Set(info.publisher),
            file_name: Set(info.file_name),
            info_link: Set(info.info_link),
            created_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let genre_model = genre_prediction::ActiveModel {
            genre: Set(genre.genre),
            confidence: Set(genre.confidence),
            file_name: Set(genre.file_name),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(
            "Recorded confirmed upload '{}' (genre #{}, info #{})",
            info_model.file_name,
            genre_model.id,
            info_model.id
        );

        Ok((genre_model.into(), info_model.into()))
    }

    async fn genre_predictions_page(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<Page<GenrePrediction>, DomainError> {
        let paginator = genre_prediction::Entity::find()
            .order_by_asc(genre_prediction::Column::Id)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(Page::new(
            items.into_iter().map(GenrePrediction::from).collect(),
            page,
            per_page,
            total,
        ))
    }

    async fn book_information_page(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<Page<BookInformation>, DomainError> {
        let paginator = book_information::Entity::find()
            .order_by_asc(book_information::Column::Id)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(Page::new(
            items.into_iter().map(BookInformation::from).collect(),
            page,
            per_page,
            total,
        ))
    }

    async fn all_genre_predictions(&self) -> Result<Vec<GenrePrediction>, DomainError> {
        let rows = genre_prediction::Entity::find()
            .order_by_asc(genre_prediction::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(GenrePrediction::from).collect())
    }

    async fn all_book_information(&self) -> Result<Vec<BookInformation>, DomainError> {
        let rows = book_information::Entity::find()
            .order_by_asc(book_information::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(BookInformation::from).collect())
    }
}
