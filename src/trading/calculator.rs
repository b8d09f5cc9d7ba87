//! Stateful calculator session: current account, levels and last result.

use tracing::{info, warn};

use crate::models::{Direction, PriceLevels, TradePlan};

use super::{AccountConfig, RiskCalculator, ValidationError};

/// Holds the inputs a user edits between calculations.
#[derive(Debug, Clone)]
pub struct Calculator {
    pub account: AccountConfig,
    levels: PriceLevels,
    direction: Direction,
    plan: Option<TradePlan>,
    error: Option<ValidationError>,
}

impl Calculator {
    pub fn new(account: AccountConfig) -> Self {
        Self {
            account,
            levels: PriceLevels::default(),
            direction: Direction::Long,
            plan: None,
            error: None,
        }
    }

    pub fn levels(&self) -> PriceLevels {
        self.levels
    }

    /// Replace the entry/target/stop inputs, e.g. with levels read from a chart.
    pub fn set_levels(&mut self, levels: PriceLevels) {
        self.levels = levels;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Last successful plan, if the most recent calculation succeeded.
    pub fn plan(&self) -> Option<&TradePlan> {
        self.plan.as_ref()
    }

    /// Validation failure from the most recent calculation.
    pub fn error(&self) -> Option<ValidationError> {
        self.error
    }

    /// Run the sizing on the current inputs and remember the outcome.
    ///
    /// A failure leaves the previous plan in place, matching how the result
    /// panel keeps its last numbers while showing the error.
    pub fn calculate(&mut self) -> Result<TradePlan, ValidationError> {
        self.error = None;

        match RiskCalculator::calculate(&self.account, &self.levels, self.direction) {
            Ok(plan) => {
                info!(
                    direction = %self.direction,
                    pos_size_1x = %plan.pos_size_1x.round_dp(2),
                    rr = %plan.rr_ratio.round_dp(2),
                    "Calculated trade plan"
                );
                self.plan = Some(plan.clone());
                Ok(plan)
            }
            Err(e) => {
                warn!(direction = %self.direction, error = %e, "Rejected levels");
                self.error = Some(e);
                Err(e)
            }
        }
    }

    /// Reset levels and results; the account settings are kept.
    pub fn clear(&mut self) {
        self.levels = PriceLevels::default();
        self.plan = None;
        self.error = None;
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(AccountConfig::default())
    }
}
