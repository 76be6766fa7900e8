pub mod contract_service;
pub mod digest;
pub mod nft_service;
pub mod notifier;
pub mod prediction_service;
pub mod simulator;
