//! Currency codes for Oremarket
//!
//! Mineral trade settles in fiat, so the set is a fiat subset (ISO 4217).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Settlement currency for listings, offers and transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    USD,
    EUR,
    GBP,
    AUD,
    CAD,
    CNY,
    ZAR,
}

impl Currency {
    /// Get the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::AUD => "AUD",
            Self::CAD => "CAD",
            Self::CNY => "CNY",
            Self::ZAR => "ZAR",
        }
    }

    /// Get the standard decimal places for this currency
    pub fn decimals(&self) -> u8 {
        2
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::USD
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "AUD" => Ok(Self::AUD),
            "CAD" => Ok(Self::CAD),
            "CNY" => Ok(Self::CNY),
            "ZAR" => Ok(Self::ZAR),
            other => Err(format!("unknown currency code: {other}")),
        }
    }
}
