use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{PredictionStatus, TimeFrame};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftTrait {
    pub trait_type: String,
    pub value: String,
}

/// Static catalog entry. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nft {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub collection: String,
    #[serde(default)]
    pub floor_price: Option<Decimal>,
    #[serde(default)]
    pub last_sale_price: Option<Decimal>,
    pub blockchain: String,
    pub token_id: String,
    #[serde(default)]
    pub traits: Option<Vec<NftTrait>>,
}

impl Nft {
    /// Case-insensitive match on name or collection, plus optional
    /// case-insensitive blockchain equality.
    pub fn matches(&self, request: &NftSearchRequest) -> bool {
        let query = request.query.to_lowercase();
        let matches_query = self.name.to_lowercase().contains(&query)
            || self.collection.to_lowercase().contains(&query);

        let matches_chain = match request.blockchain.as_deref() {
            Some(chain) if !chain.is_empty() => self.blockchain.eq_ignore_ascii_case(chain),
            _ => true,
        };

        matches_query && matches_chain
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftSearchRequest {
    pub query: String,
    #[serde(default)]
    pub blockchain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftPrediction {
    pub id: String,
    pub nft_id: String,
    pub nft_name: String,
    pub nft_image: String,
    pub collection: String,
    pub current_floor_price: Decimal,
    pub predicted_floor_price: Decimal,
    pub percentage_change: Decimal,
    pub confidence: u8,
    pub timestamp: DateTime<Utc>,
    pub timeframe: TimeFrame,
    pub prediction_rationale: String,
    pub status: PredictionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ape() -> Nft {
        Nft {
            id: "nft-1".into(),
            name: "Bored Ape #7329".into(),
            description: String::new(),
            image: String::new(),
            collection: "Bored Ape Yacht Club".into(),
            floor_price: Some(Decimal::new(185, 1)),
            last_sale_price: None,
            blockchain: "Ethereum".into(),
            token_id: "7329".into(),
            traits: None,
        }
    }

    #[test]
    fn test_matches_name_or_collection() {
        let nft = ape();
        let by_name = NftSearchRequest { query: "ape #73".into(), blockchain: None };
        let by_collection = NftSearchRequest { query: "YACHT".into(), blockchain: None };
        let miss = NftSearchRequest { query: "punk".into(), blockchain: None };

        assert!(nft.matches(&by_name));
        assert!(nft.matches(&by_collection));
        assert!(!nft.matches(&miss));
    }

    #[test]
    fn test_matches_blockchain_filter() {
        let nft = ape();
        let eth = NftSearchRequest { query: "ape".into(), blockchain: Some("ethereum".into()) };
        let sol = NftSearchRequest { query: "ape".into(), blockchain: Some("Solana".into()) };

        assert!(nft.matches(&eth));
        assert!(!nft.matches(&sol));
    }
}
