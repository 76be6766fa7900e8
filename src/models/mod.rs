pub mod contract;
pub mod nft;
pub mod prediction;
pub mod wallet;

pub use contract::{ContractTemplate, DeployParams, DeployedContract};
pub use nft::{Nft, NftPrediction, NftSearchRequest, NftTrait};
pub use prediction::{
    checked_percentage_change, is_plausible_price, percentage_change, round_price,
    CryptoCurrency, Prediction, PredictionRequest, PredictionStatus, TimeFrame,
    VerificationResult,
};
pub use wallet::WalletState;

use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Source: which path produced a generated value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Live,
    Simulated,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Live => "live",
            Source::Simulated => "simulated",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value tagged with the path that produced it.
///
/// Live values came from the external providers end to end; simulated values
/// were generated locally, either because mock mode is on or because a
/// provider call failed and the service degraded.
#[derive(Debug, Clone, PartialEq)]
pub enum Sourced<T> {
    Live(T),
    Simulated(T),
}

impl<T> Sourced<T> {
    pub fn source(&self) -> Source {
        match self {
            Sourced::Live(_) => Source::Live,
            Sourced::Simulated(_) => Source::Simulated,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Sourced::Live(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Sourced::Live(v) | Sourced::Simulated(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Sourced::Live(v) | Sourced::Simulated(v) => v,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        match self {
            Sourced::Live(v) => Sourced::Live(f(v)),
            Sourced::Simulated(v) => Sourced::Simulated(f(v)),
        }
    }
}
