//! Static seed data: supported assets, timeframes, example predictions and
//! the NFT catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{
    percentage_change, CryptoCurrency, Nft, NftTrait, Prediction, PredictionStatus, TimeFrame,
};

#[derive(Debug, Clone, Serialize)]
pub struct CryptoInfo {
    pub id: CryptoCurrency,
    pub name: &'static str,
    pub logo: &'static str,
    /// Anchor used by the simulator when no stored prediction exists yet.
    pub reference_price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeFrameInfo {
    pub id: TimeFrame,
    pub name: &'static str,
    pub days: u32,
}

pub fn crypto_info(crypto: CryptoCurrency) -> CryptoInfo {
    let (name, logo, reference_price) = match crypto {
        CryptoCurrency::Btc => ("Bitcoin", "₿", Decimal::new(4_236_589, 2)),
        CryptoCurrency::Eth => ("Ethereum", "Ξ", Decimal::new(224_512, 2)),
        CryptoCurrency::Sol => ("Solana", "◎", Decimal::new(13_790, 2)),
        CryptoCurrency::Ada => ("Cardano", "₳", Decimal::new(37, 2)),
        CryptoCurrency::Dot => ("Polkadot", "●", Decimal::new(643, 2)),
        CryptoCurrency::Avax => ("Avalanche", "Ⓐ", Decimal::new(1_578, 2)),
        CryptoCurrency::Matic => ("Polygon", "Ⓟ", Decimal::new(68, 2)),
        CryptoCurrency::Link => ("Chainlink", "⌁", Decimal::new(1_452, 2)),
        CryptoCurrency::Xrp => ("Ripple", "✕", Decimal::new(52, 2)),
        CryptoCurrency::Doge => ("Dogecoin", "Ð", Decimal::new(8, 2)),
    };

    CryptoInfo {
        id: crypto,
        name,
        logo,
        reference_price,
    }
}

pub fn cryptocurrencies() -> Vec<CryptoInfo> {
    CryptoCurrency::ALL.into_iter().map(crypto_info).collect()
}

pub fn timeframes() -> Vec<TimeFrameInfo> {
    TimeFrame::ALL
        .into_iter()
        .map(|t| TimeFrameInfo {
            id: t,
            name: t.display_name(),
            days: t.days(),
        })
        .collect()
}

fn ts(raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn seed(
    id: &str,
    crypto: CryptoCurrency,
    current: Decimal,
    predicted: Decimal,
    confidence: u8,
    timestamp: &str,
    timeframe: TimeFrame,
    status: PredictionStatus,
    hash: Option<&str>,
) -> Prediction {
    Prediction {
        id: id.into(),
        crypto_id: crypto,
        crypto_name: crypto_info(crypto).name.into(),
        current_price: current,
        predicted_price: predicted,
        percentage_change: percentage_change(current, predicted),
        confidence,
        timestamp: ts(timestamp),
        timeframe,
        status,
        verification_hash: hash.map(String::from),
    }
}

/// Example predictions the store starts with, newest first.
pub fn seed_predictions() -> Vec<Prediction> {
    use CryptoCurrency::*;
    use PredictionStatus::*;

    vec![
        seed(
            "pred-001",
            Btc,
            Decimal::new(4_236_589, 2),
            Decimal::new(4_512_037, 2),
            85,
            "2023-06-12T14:23:45Z",
            TimeFrame::Month,
            Verified,
            Some("0x8f41b6c4a3c3b8d9e8d2a2f8c3d7e5f2a1b0c9d8"),
        ),
        seed(
            "pred-002",
            Eth,
            Decimal::new(224_512, 2),
            Decimal::new(256_784, 2),
            78,
            "2023-06-13T09:12:32Z",
            TimeFrame::Week,
            Completed,
            None,
        ),
        seed(
            "pred-003",
            Sol,
            Decimal::new(13_790, 2),
            Decimal::new(15_342, 2),
            82,
            "2023-06-13T11:45:18Z",
            TimeFrame::Day,
            Pending,
            None,
        ),
        seed(
            "pred-004",
            Dot,
            Decimal::new(643, 2),
            Decimal::new(598, 2),
            72,
            "2023-06-12T18:37:21Z",
            TimeFrame::Quarter,
            Incorrect,
            None,
        ),
        seed(
            "pred-005",
            Ada,
            Decimal::new(37, 2),
            Decimal::new(42, 2),
            68,
            "2023-06-11T21:14:53Z",
            TimeFrame::Month,
            Verified,
            Some("0x3a4b5c6d7e8f9a0b1c2d3e4f5a6b7c8d9e0f1a2b"),
        ),
        seed(
            "pred-006",
            Avax,
            Decimal::new(1_578, 2),
            Decimal::new(1_835, 2),
            76,
            "2023-06-10T15:42:37Z",
            TimeFrame::Week,
            Verified,
            Some("0x2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b0c1d"),
        ),
    ]
}

fn traits(pairs: &[(&str, &str)]) -> Option<Vec<NftTrait>> {
    Some(
        pairs
            .iter()
            .map(|(t, v)| NftTrait {
                trait_type: (*t).into(),
                value: (*v).into(),
            })
            .collect(),
    )
}

pub fn nft_catalog() -> Vec<Nft> {
    vec![
        Nft {
            id: "nft-1".into(),
            name: "Bored Ape #7329".into(),
            description: "Bored Ape Yacht Club is a collection of 10,000 unique Bored Ape NFTs."
                .into(),
            image: "https://i.seadn.io/gae/Ju9CkWtV-1Okvf45wo8UctR-M9He2PjILP0oOvxE89AyiPPGtrR3gysu1Zgy0hjd2xKIgjJJtWIc0ybj4Vd7wv8t3pxDGHoJBzDB?auto=format&dpr=1&w=1000".into(),
            collection: "Bored Ape Yacht Club".into(),
            floor_price: Some(Decimal::new(185, 1)),
            last_sale_price: Some(Decimal::new(203, 1)),
            blockchain: "Ethereum".into(),
            token_id: "7329".into(),
            traits: traits(&[
                ("Background", "Blue"),
                ("Fur", "Brown"),
                ("Eyes", "Bored"),
                ("Mouth", "Bored Cigarette"),
            ]),
        },
        Nft {
            id: "nft-2".into(),
            name: "CryptoPunk #5822".into(),
            description: "CryptoPunks launched as a fixed set of 10,000 items in mid-2017 and became one of the inspirations for the ERC-721 standard.".into(),
            image: "https://i.seadn.io/gae/H-eyNE1MwL5ohL-tCfn_Xa1Sl9M9B4612tLYeUlQubzt4ewhr4huJIR5OLuyO3Z5PpJFSwdm7rq-TikAh7f5eUw338A2cy6HRH75?auto=format&dpr=1&w=1000".into(),
            collection: "CryptoPunks".into(),
            floor_price: Some(Decimal::new(502, 1)),
            last_sale_price: Some(Decimal::new(550, 1)),
            blockchain: "Ethereum".into(),
            token_id: "5822".into(),
            traits: traits(&[("Type", "Alien"), ("Accessories", "Bandana")]),
        },
        Nft {
            id: "nft-3".into(),
            name: "DeGods #1337".into(),
            description: "A deflationary collection of degenerates, punks, and misfits. Gods of the metaverse & masters of our own universe.".into(),
            image: "https://i.seadn.io/gae/FVYe2qIJhFzVRiUG5VGgSJx9X5Lm0tYrpaq4GgP2-PJoWsRcBhPBJwQxQOrIQBsqLpkEJxC7TCOnj6KAp7kXG5lo_uDOhwHPnQRB8w?auto=format&dpr=1&w=1000".into(),
            collection: "DeGods".into(),
            floor_price: Some(Decimal::new(82, 1)),
            last_sale_price: Some(Decimal::new(79, 1)),
            blockchain: "Solana".into(),
            token_id: "1337".into(),
            traits: traits(&[
                ("Background", "Red"),
                ("Body", "Gold"),
                ("Eyes", "Laser"),
                ("Head", "Crown"),
            ]),
        },
        Nft {
            id: "nft-4".into(),
            name: "Azuki #9402".into(),
            description: "Azuki starts with a collection of 10,000 avatars that give you membership access to The Garden.".into(),
            image: "https://i.seadn.io/gae/ztuE3Pht9_rKVmNfnQtYTWsHLYdT3M1cHReU5gPz8DzX3uZ9oYVMvsVsuWKzFfTCXJeaaP2Bq5PdLxvW9GaOHTJdwiVjJUQPDW-9?auto=format&dpr=1&w=1000".into(),
            collection: "Azuki".into(),
            floor_price: Some(Decimal::new(123, 1)),
            last_sale_price: Some(Decimal::new(131, 1)),
            blockchain: "Ethereum".into(),
            token_id: "9402".into(),
            traits: traits(&[
                ("Type", "Human"),
                ("Hair", "Purple Long"),
                ("Clothing", "Kimono"),
            ]),
        },
        Nft {
            id: "nft-5".into(),
            name: "Okay Bears #1201".into(),
            description: "A collection of 10,000 diverse bears building a virtuous community that will transcend the internet into the real world.".into(),
            image: "https://i.seadn.io/gae/TyPJi06xkQXQgU2QOzA5nI8wVEBtF3YQj-EJZ9xmSOy_6_ibhQz4zQIg6jXPif1wUq2S8s_yQoIrTWsUBPEpnisaRNLg4jRkGBqV?auto=format&dpr=1&w=1000".into(),
            collection: "Okay Bears".into(),
            floor_price: Some(Decimal::new(57, 1)),
            last_sale_price: Some(Decimal::new(62, 1)),
            blockchain: "Solana".into(),
            token_id: "1201".into(),
            traits: traits(&[
                ("Background", "Blue"),
                ("Fur", "Brown"),
                ("Eyes", "Happy"),
                ("Outfit", "Hawaiian Shirt"),
            ]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_crypto_has_positive_reference_price() {
        for info in cryptocurrencies() {
            assert!(info.reference_price > Decimal::ZERO, "{}", info.id);
        }
        assert_eq!(timeframes().len(), 5);
    }

    #[test]
    fn test_seed_predictions_hold_percentage_invariant() {
        for p in seed_predictions() {
            assert_eq!(
                p.percentage_change,
                percentage_change(p.current_price, p.predicted_price)
            );
            assert_ne!(p.timestamp, DateTime::<Utc>::default());
        }
    }
}
