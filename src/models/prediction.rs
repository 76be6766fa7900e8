use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// CryptoCurrency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CryptoCurrency {
    Btc,
    Eth,
    Sol,
    Ada,
    Dot,
    Avax,
    Matic,
    Link,
    Xrp,
    Doge,
}

impl CryptoCurrency {
    pub const ALL: [CryptoCurrency; 10] = [
        CryptoCurrency::Btc,
        CryptoCurrency::Eth,
        CryptoCurrency::Sol,
        CryptoCurrency::Ada,
        CryptoCurrency::Dot,
        CryptoCurrency::Avax,
        CryptoCurrency::Matic,
        CryptoCurrency::Link,
        CryptoCurrency::Xrp,
        CryptoCurrency::Doge,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            CryptoCurrency::Btc => "BTC",
            CryptoCurrency::Eth => "ETH",
            CryptoCurrency::Sol => "SOL",
            CryptoCurrency::Ada => "ADA",
            CryptoCurrency::Dot => "DOT",
            CryptoCurrency::Avax => "AVAX",
            CryptoCurrency::Matic => "MATIC",
            CryptoCurrency::Link => "LINK",
            CryptoCurrency::Xrp => "XRP",
            CryptoCurrency::Doge => "DOGE",
        }
    }
}

impl fmt::Display for CryptoCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for CryptoCurrency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        CryptoCurrency::ALL
            .into_iter()
            .find(|c| c.symbol() == upper)
            .ok_or_else(|| format!("unknown cryptocurrency: {s}"))
    }
}

// ---------------------------------------------------------------------------
// TimeFrame
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFrame {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 5] = [
        TimeFrame::Day,
        TimeFrame::Week,
        TimeFrame::Month,
        TimeFrame::Quarter,
        TimeFrame::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Day => "24h",
            TimeFrame::Week => "7d",
            TimeFrame::Month => "30d",
            TimeFrame::Quarter => "90d",
            TimeFrame::Year => "1y",
        }
    }

    /// Prediction horizon in days.
    pub fn days(&self) -> u32 {
        match self {
            TimeFrame::Day => 1,
            TimeFrame::Week => 7,
            TimeFrame::Month => 30,
            TimeFrame::Quarter => 90,
            TimeFrame::Year => 365,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TimeFrame::Day => "24 Hours",
            TimeFrame::Week => "7 Days",
            TimeFrame::Month => "30 Days",
            TimeFrame::Quarter => "90 Days",
            TimeFrame::Year => "1 Year",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeFrame::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| format!("unknown timeframe: {s}"))
    }
}

// ---------------------------------------------------------------------------
// PredictionStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a prediction.
///
/// `Incorrect` is part of the vocabulary (seed data carries it and clients
/// filter on it) but no operation in this crate assigns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Pending,
    Completed,
    Verified,
    Incorrect,
}

impl PredictionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionStatus::Pending => "pending",
            PredictionStatus::Completed => "completed",
            PredictionStatus::Verified => "verified",
            PredictionStatus::Incorrect => "incorrect",
        }
    }
}

impl fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Requests / records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub crypto_id: CryptoCurrency,
    pub timeframe: TimeFrame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub crypto_id: CryptoCurrency,
    pub crypto_name: String,
    pub current_price: Decimal,
    pub predicted_price: Decimal,
    pub percentage_change: Decimal,
    pub confidence: u8,
    pub timestamp: DateTime<Utc>,
    pub timeframe: TimeFrame,
    pub status: PredictionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_hash: Option<String>,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Prediction: id={} crypto={} timeframe={} current={} predicted={} change={}% status={}",
            self.id,
            self.crypto_id,
            self.timeframe,
            self.current_price,
            self.predicted_price,
            self.percentage_change,
            self.status,
        )
    }
}

/// Outcome of a hash verification. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_verified: bool,
    pub original_timestamp: Option<DateTime<Utc>>,
    pub original_prediction: Option<Decimal>,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Price arithmetic
// ---------------------------------------------------------------------------

/// Decimals kept for prices of at least one unit.
const CENT_DP: u32 = 2;

/// Decimals kept for sub-unit prices (DOGE, XRP-style quotes).
const SUB_UNIT_DP: u32 = 6;

/// Round a price half away from zero: cents from 1.00 up, six decimals below.
pub fn round_price(value: Decimal) -> Decimal {
    let dp = if value.abs() >= Decimal::ONE {
        CENT_DP
    } else {
        SUB_UNIT_DP
    };
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// `(predicted - current) / current * 100`, rounded to 2 decimals.
///
/// `None` when `current` is zero or the result does not fit in a `Decimal`.
pub fn checked_percentage_change(current: Decimal, predicted: Decimal) -> Option<Decimal> {
    if current.is_zero() {
        return None;
    }
    predicted
        .checked_sub(current)?
        .checked_div(current)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|pct| pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// [`checked_percentage_change`], with zero standing in when it is undefined.
pub fn percentage_change(current: Decimal, predicted: Decimal) -> Decimal {
    checked_percentage_change(current, predicted).unwrap_or(Decimal::ZERO)
}

/// A generated price is usable when it is positive and its change from
/// `current` is representable.
pub fn is_plausible_price(current: Decimal, predicted: Decimal) -> bool {
    predicted > Decimal::ZERO && checked_percentage_change(current, predicted).is_some()
}
