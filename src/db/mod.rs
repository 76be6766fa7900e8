pub mod nft_prediction_repo;
pub mod prediction_repo;

pub use nft_prediction_repo::NftPredictionStore;
pub use prediction_repo::{InMemoryPredictionRepo, PredictionRepository};
