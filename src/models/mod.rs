pub mod book_information;
pub mod genre_prediction;
