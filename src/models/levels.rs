//! Trade direction and the entry/target/stop triple.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" | "buy" => Ok(Direction::Long),
            "short" | "sell" => Ok(Direction::Short),
            other => anyhow::bail!("Unknown direction '{}' (expected long or short)", other),
        }
    }
}

/// Entry, take-profit and stop-loss prices in quote currency.
///
/// Zero means "not set". Nothing here is validated; the risk calculator
/// rejects degenerate combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceLevels {
    /// Entry price
    pub entry: Decimal,

    /// Take-profit price
    pub target: Decimal,

    /// Stop-loss price
    pub stop: Decimal,
}

impl PriceLevels {
    pub fn new(entry: Decimal, target: Decimal, stop: Decimal) -> Self {
        Self { entry, target, stop }
    }

    /// True when every level has been filled in.
    pub fn is_complete(&self) -> bool {
        !self.entry.is_zero() && !self.target.is_zero() && !self.stop.is_zero()
    }
}
