//! Cached reads and notifying mutations sitting between the HTTP handlers
//! and the services.

pub mod cache;
pub mod contract_queries;
pub mod nft_queries;
pub mod prediction_queries;

pub use cache::{QueryCache, QueryKey};
pub use contract_queries::ContractQueries;
pub use nft_queries::NftQueries;
pub use prediction_queries::PredictionQueries;
