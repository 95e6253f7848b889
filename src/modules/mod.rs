pub mod inference;
pub mod integrations;
