//! Risk-bounded position sizing with asymmetric maker/taker fees.
//!
//! Every quantity is expressed relative to the entry price, so the position
//! is sized such that hitting the stop (fees included) costs exactly the
//! configured share of capital.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Direction, PriceLevels, TradePlan};

use super::AccountConfig;

/// Reasons a set of levels cannot be sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid entry price")]
    InvalidEntryPrice,
    #[error("SL must be below entry for LONG")]
    InvalidStopForLong,
    #[error("SL must be above entry for SHORT")]
    InvalidStopForShort,
    #[error("Levels out of range")]
    OutOfRange,
}

/// Stateless sizing calculator.
pub struct RiskCalculator;

impl RiskCalculator {
    /// Size a trade for the given account, levels and direction.
    ///
    /// Validation runs in a fixed order: entry price first, then the stop
    /// side for the chosen direction. The target is not validated; a target
    /// on the wrong side simply yields a negative net profit. Levels whose
    /// ratios do not fit in a `Decimal` are rejected with `OutOfRange`.
    pub fn calculate(
        account: &AccountConfig,
        levels: &PriceLevels,
        direction: Direction,
    ) -> Result<TradePlan, ValidationError> {
        if levels.entry <= Decimal::ZERO {
            return Err(ValidationError::InvalidEntryPrice);
        }

        match direction {
            Direction::Long if levels.stop >= levels.entry => {
                return Err(ValidationError::InvalidStopForLong);
            }
            Direction::Short if levels.stop <= levels.entry => {
                return Err(ValidationError::InvalidStopForShort);
            }
            _ => {}
        }

        let plan = Self::size(account, levels, direction).ok_or_else(|| {
            warn!(
                direction = %direction,
                entry = %levels.entry,
                stop = %levels.stop,
                target = %levels.target,
                "Sizing overflowed"
            );
            ValidationError::OutOfRange
        })?;

        debug!(
            direction = %direction,
            entry = %levels.entry,
            stop = %levels.stop,
            target = %levels.target,
            risk_per_unit = %plan.risk_per_unit,
            pos_size_1x = %plan.pos_size_1x,
            "Sized trade"
        );

        Ok(plan)
    }

    /// Arithmetic on already validated levels; `None` on overflow.
    fn size(account: &AccountConfig, levels: &PriceLevels, direction: Direction) -> Option<TradePlan> {
        let PriceLevels { entry, target, stop } = *levels;
        let total_fee_rate = account.total_fee_rate();
        let risk_amount = account.checked_risk_amount()?;

        let (risk_per_unit, profit_move, breakeven) = match direction {
            Direction::Long => (
                relative_move(entry, stop, entry)?.checked_add(total_fee_rate)?,
                relative_move(target, entry, entry)?.checked_sub(total_fee_rate)?,
                entry.checked_mul(Decimal::ONE.checked_add(total_fee_rate)?)?,
            ),
            Direction::Short => (
                relative_move(stop, entry, entry)?.checked_add(total_fee_rate)?,
                relative_move(entry, target, entry)?.checked_sub(total_fee_rate)?,
                entry.checked_mul(Decimal::ONE.checked_sub(total_fee_rate)?)?,
            ),
        };

        // Negative fee rates can push risk_per_unit to zero
        let pos_size_1x = if risk_per_unit.is_zero() {
            Decimal::ZERO
        } else {
            risk_amount.checked_div(risk_per_unit)?
        };
        let pos_size_lev = if account.leverage.is_zero() {
            Decimal::ZERO
        } else {
            pos_size_1x.checked_div(account.leverage)?
        };
        let quantity = pos_size_1x.checked_div(entry)?;
        let net_profit = pos_size_1x.checked_mul(profit_move)?;
        let net_loss = pos_size_1x.checked_mul(risk_per_unit)?;
        let rr_ratio = if net_loss > Decimal::ZERO {
            net_profit.checked_div(net_loss)?
        } else {
            Decimal::ZERO
        };

        Some(TradePlan {
            direction,
            pos_size_1x,
            pos_size_lev,
            quantity,
            net_profit,
            net_loss,
            rr_ratio,
            breakeven,
            risk_amount,
            total_fee_rate,
            risk_per_unit,
            profit_move,
        })
    }
}

/// `(from - to) / base`, checked.
fn relative_move(from: Decimal, to: Decimal, base: Decimal) -> Option<Decimal> {
    from.checked_sub(to)?.checked_div(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trading::FeeKind;
    use rust_decimal_macros::dec;

    fn close(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.0001)
    }

    #[test]
    fn test_reference_long_scenario() {
        let account = AccountConfig::default();
        let levels = PriceLevels::new(dec!(100), dec!(106), dec!(98));

        let plan = RiskCalculator::calculate(&account, &levels, Direction::Long).unwrap();

        assert_eq!(plan.total_fee_rate, dec!(0.0008));
        assert_eq!(plan.risk_per_unit, dec!(0.0208));
        assert_eq!(plan.risk_amount, dec!(1));
        assert!(close(plan.pos_size_1x, dec!(48.0769)));
        assert!(close(plan.pos_size_lev, dec!(9.6154)));
        assert!(close(plan.quantity, dec!(0.4808)));
        assert!(close(plan.net_loss, dec!(1)));
        assert_eq!(plan.breakeven, dec!(100.08));

        // profit_move = 0.06 - 0.0008
        assert_eq!(plan.profit_move, dec!(0.0592));
        assert!(close(plan.net_profit, dec!(2.8462)));
        assert!(close(plan.rr_ratio, dec!(2.8462)));
    }

    #[test]
    fn test_short_scenario() {
        let account = AccountConfig::default();
        let levels = PriceLevels::new(dec!(100), dec!(94), dec!(102));

        let plan = RiskCalculator::calculate(&account, &levels, Direction::Short).unwrap();

        assert_eq!(plan.risk_per_unit, dec!(0.0208));
        assert_eq!(plan.profit_move, dec!(0.0592));
        assert_eq!(plan.breakeven, dec!(99.92));
        assert!(close(plan.net_loss, dec!(1)));
    }

    #[test]
    fn test_entry_price_checked_first() {
        let account = AccountConfig::default();

        for entry in [dec!(0), dec!(-1), dec!(-250.5)] {
            for (stop, target) in [(dec!(0), dec!(0)), (dec!(50), dec!(10)), (dec!(-5), dec!(5))] {
                let levels = PriceLevels::new(entry, target, stop);
                for direction in [Direction::Long, Direction::Short] {
                    assert_eq!(
                        RiskCalculator::calculate(&account, &levels, direction),
                        Err(ValidationError::InvalidEntryPrice)
                    );
                }
            }
        }
    }

    #[test]
    fn test_stop_side_validation() {
        let account = AccountConfig::default();

        for stop in [dec!(100), dec!(100.01), dec!(150)] {
            let levels = PriceLevels::new(dec!(100), dec!(110), stop);
            assert_eq!(
                RiskCalculator::calculate(&account, &levels, Direction::Long),
                Err(ValidationError::InvalidStopForLong)
            );
        }

        for stop in [dec!(100), dec!(99.99), dec!(0)] {
            let levels = PriceLevels::new(dec!(100), dec!(90), stop);
            assert_eq!(
                RiskCalculator::calculate(&account, &levels, Direction::Short),
                Err(ValidationError::InvalidStopForShort)
            );
        }
    }

    #[test]
    fn test_valid_longs_are_profitable_and_consistent() {
        let fee_grid = [dec!(0), dec!(0.02), dec!(0.06), dec!(0.1)];
        let entries = [dec!(1.5), dec!(100), dec!(3151.25)];

        for entry in entries {
            for maker in fee_grid {
                for taker in fee_grid {
                    let account = AccountConfig {
                        capital: dec!(2500),
                        risk_percent: dec!(2),
                        leverage: dec!(10),
                        maker_fee: maker,
                        taker_fee: taker,
                        entry_fee_kind: FeeKind::Taker,
                        exit_fee_kind: FeeKind::Maker,
                    };
                    let levels = PriceLevels::new(entry, entry * dec!(1.08), entry * dec!(0.97));
                    let plan = RiskCalculator::calculate(&account, &levels, Direction::Long).unwrap();

                    assert!(plan.profit_move > Decimal::ZERO);
                    assert!(plan.net_profit > Decimal::ZERO);
                    assert!(plan.net_loss > Decimal::ZERO);
                    assert_eq!(plan.rr_ratio, plan.net_profit / plan.net_loss);
                    assert!(close(plan.net_loss, account.risk_amount()));
                }
            }
        }
    }

    #[test]
    fn test_calculation_is_deterministic() {
        let account = AccountConfig::default();
        let levels = PriceLevels::new(dec!(64250.5), dec!(61000), dec!(65500));

        let first = RiskCalculator::calculate(&account, &levels, Direction::Short);
        let second = RiskCalculator::calculate(&account, &levels, Direction::Short);
        assert_eq!(first, second);
    }

    #[test]
    fn test_degenerate_fees_do_not_panic() {
        // Negative fees cancel the stop distance exactly: risk_per_unit == 0
        let account = AccountConfig {
            maker_fee: dec!(-1),
            taker_fee: dec!(-1),
            ..Default::default()
        };
        let levels = PriceLevels::new(dec!(100), dec!(110), dec!(98));

        let plan = RiskCalculator::calculate(&account, &levels, Direction::Long).unwrap();
        assert_eq!(plan.risk_per_unit, Decimal::ZERO);
        assert_eq!(plan.pos_size_1x, Decimal::ZERO);
        assert_eq!(plan.rr_ratio, Decimal::ZERO);

        let no_leverage = AccountConfig {
            leverage: Decimal::ZERO,
            ..Default::default()
        };
        let plan = RiskCalculator::calculate(&no_leverage, &levels, Direction::Long).unwrap();
        assert_eq!(plan.pos_size_lev, Decimal::ZERO);
        assert!(plan.pos_size_1x > Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_levels_are_rejected() {
        let account = AccountConfig::default();

        // (target - entry) / entry is far beyond the Decimal range
        let levels = PriceLevels::new(dec!(0.0000000001), dec!(100000000000000000000), dec!(0.00000000005));
        assert_eq!(
            RiskCalculator::calculate(&account, &levels, Direction::Long),
            Err(ValidationError::OutOfRange)
        );

        // Same for a short whose stop sits absurdly far above a tiny entry
        let levels = PriceLevels::new(dec!(0.0000000001), dec!(0.00000000005), dec!(100000000000000000000));
        assert_eq!(
            RiskCalculator::calculate(&account, &levels, Direction::Short),
            Err(ValidationError::OutOfRange)
        );

        // Entry minus a hugely negative stop
        let levels = PriceLevels::new(Decimal::MAX, Decimal::MAX, Decimal::MIN);
        assert_eq!(
            RiskCalculator::calculate(&account, &levels, Direction::Long),
            Err(ValidationError::OutOfRange)
        );
    }

    #[test]
    fn test_oversized_account_is_rejected() {
        let account = AccountConfig {
            capital: Decimal::MAX,
            risk_percent: dec!(200),
            ..Default::default()
        };
        let levels = PriceLevels::new(dec!(100), dec!(106), dec!(98));

        assert_eq!(
            RiskCalculator::calculate(&account, &levels, Direction::Long),
            Err(ValidationError::OutOfRange)
        );
    }

    #[test]
    fn test_extreme_but_representable_magnitudes() {
        let account = AccountConfig::default();

        let tiny = PriceLevels::new(dec!(0.0000000001), dec!(0.0000000002), dec!(0.00000000005));
        let plan = RiskCalculator::calculate(&account, &tiny, Direction::Long).unwrap();
        assert!(plan.pos_size_1x > Decimal::ZERO);
        assert!(plan.quantity > Decimal::ZERO);

        let huge = PriceLevels::new(
            dec!(100000000000000000000),
            dec!(90000000000000000000),
            dec!(110000000000000000000),
        );
        let plan = RiskCalculator::calculate(&account, &huge, Direction::Short).unwrap();
        assert!(close(plan.net_loss, dec!(1)));
        assert!(plan.rr_ratio > Decimal::ZERO);
    }
}
