//! Account and fee configuration.

use std::str::FromStr;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Which side of the book an order fills on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeKind {
    /// Resting limit order
    Maker,
    /// Order that crosses the spread
    Taker,
}

impl FeeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeKind::Maker => "maker",
            FeeKind::Taker => "taker",
        }
    }
}

impl FromStr for FeeKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "maker" | "limit" => Ok(FeeKind::Maker),
            "taker" | "market" => Ok(FeeKind::Taker),
            other => anyhow::bail!("Unknown fee type '{}' (expected maker or taker)", other),
        }
    }
}

/// Account settings that feed every sizing calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Account capital in quote currency
    pub capital: Decimal,

    /// Percentage of capital to lose if the stop is hit (not clamped)
    pub risk_percent: Decimal,

    /// Leverage multiplier
    pub leverage: Decimal,

    /// Maker fee in percent (0.02 means 0.02%)
    pub maker_fee: Decimal,

    /// Taker fee in percent
    pub taker_fee: Decimal,

    /// Fee schedule applied when opening
    pub entry_fee_kind: FeeKind,

    /// Fee schedule applied when closing
    pub exit_fee_kind: FeeKind,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            capital: dec!(100),
            risk_percent: dec!(1),
            leverage: dec!(5),
            maker_fee: dec!(0.02),
            taker_fee: dec!(0.06),
            entry_fee_kind: FeeKind::Maker,
            exit_fee_kind: FeeKind::Taker,
        }
    }
}

impl AccountConfig {
    /// Defaults overridden by any `FIBSIZER_*` variables present in the environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = env_decimal("FIBSIZER_CAPITAL")? {
            config.capital = v;
        }
        if let Some(v) = env_decimal("FIBSIZER_RISK_PERCENT")? {
            config.risk_percent = v;
        }
        if let Some(v) = env_decimal("FIBSIZER_LEVERAGE")? {
            config.leverage = v;
        }
        if let Some(v) = env_decimal("FIBSIZER_MAKER_FEE")? {
            config.maker_fee = v;
        }
        if let Some(v) = env_decimal("FIBSIZER_TAKER_FEE")? {
            config.taker_fee = v;
        }
        if let Ok(v) = std::env::var("FIBSIZER_ENTRY_FEE") {
            config.entry_fee_kind = v.parse().context("Invalid FIBSIZER_ENTRY_FEE")?;
        }
        if let Ok(v) = std::env::var("FIBSIZER_EXIT_FEE") {
            config.exit_fee_kind = v.parse().context("Invalid FIBSIZER_EXIT_FEE")?;
        }

        Ok(config)
    }

    /// Fee rate for `kind` as a fraction (percent / 100).
    pub fn fee_rate(&self, kind: FeeKind) -> Decimal {
        match kind {
            FeeKind::Maker => self.maker_fee / dec!(100),
            FeeKind::Taker => self.taker_fee / dec!(100),
        }
    }

    /// Round-trip fee fraction: entry fee plus exit fee.
    pub fn total_fee_rate(&self) -> Decimal {
        self.fee_rate(self.entry_fee_kind) + self.fee_rate(self.exit_fee_kind)
    }

    /// Capital at risk in quote currency, saturating at the `Decimal` range.
    pub fn risk_amount(&self) -> Decimal {
        self.capital.saturating_mul(self.risk_percent / dec!(100))
    }

    /// Capital at risk, or `None` when it does not fit in a `Decimal`.
    pub fn checked_risk_amount(&self) -> Option<Decimal> {
        self.capital.checked_mul(self.risk_percent / dec!(100))
    }
}

fn env_decimal(key: &str) -> Result<Option<Decimal>> {
    match std::env::var(key) {
        Ok(raw) => {
            let value = Decimal::from_str(raw.trim()).with_context(|| format!("Invalid {}", key))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}
