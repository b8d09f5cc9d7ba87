//! Sizing result for a single leveraged trade.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::Direction;

/// Position size and P&L for one entry/target/stop setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradePlan {
    pub direction: Direction,

    /// Notional at 1x, sized so that hitting the stop loses exactly the risk amount
    pub pos_size_1x: Decimal,

    /// Margin required at the configured leverage
    pub pos_size_lev: Decimal,

    /// Units of the base asset
    pub quantity: Decimal,

    /// Net profit in quote currency if the target is hit
    pub net_profit: Decimal,

    /// Net loss in quote currency if the stop is hit
    pub net_loss: Decimal,

    /// Reward to risk (net profit / net loss), zero when loss is not positive
    pub rr_ratio: Decimal,

    /// Price at which fees alone consume the move
    pub breakeven: Decimal,

    // === Intermediate values ===
    /// Capital at risk in quote currency
    pub risk_amount: Decimal,

    /// Entry plus exit fee as a fraction of notional
    pub total_fee_rate: Decimal,

    /// Loss fraction of notional at the stop, fees included
    pub risk_per_unit: Decimal,

    /// Gain fraction of notional at the target, fees deducted
    pub profit_move: Decimal,
}

impl std::fmt::Display for TradePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n{:=^44}", format!(" {} PLAN ", self.direction))?;
        writeln!(f, "Position (1x):   ${:.2}", self.pos_size_1x)?;
        writeln!(f, "Margin (lev):    ${:.2}", self.pos_size_lev)?;
        writeln!(f, "Quantity:        {:.6}", self.quantity)?;
        writeln!(f)?;
        writeln!(f, "Net Profit:      ${:.2}", self.net_profit)?;
        writeln!(f, "Net Loss:        ${:.2}", self.net_loss)?;
        writeln!(f, "R:R:             {:.2}", self.rr_ratio)?;
        writeln!(f, "Breakeven:       {:.4}", self.breakeven)?;
        writeln!(f)?;
        writeln!(f, "Risk Amount:     ${:.2}", self.risk_amount)?;
        writeln!(f, "Total Fees:      {:.4}%", self.total_fee_rate * dec!(100))?;
        writeln!(f, "{:=^44}", "")?;
        Ok(())
    }
}
