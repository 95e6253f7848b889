//! Repository implementations using SeaORM

pub mod prediction_repository;

pub use prediction_repository::SeaOrmPredictionRepository;
