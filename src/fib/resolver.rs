//! Pick entry, target and stop out of the recognized Fibonacci prices.
//!
//! The swing is drawn from "0" to "1" with extensions at -0.2 and 1.2. On a
//! normal layout the "0" end is the higher price; when "0" is below "1" the
//! price axis runs against the ratio axis and the roles of the two
//! extensions swap.

use rust_decimal::Decimal;

use crate::models::{Direction, FibPriceMap, FibRatio, PriceLevels};

/// True only when both swing endpoints were recognized and "0" is priced below "1".
pub fn is_inverted(map: &FibPriceMap) -> bool {
    let price0 = map.price_or_zero(FibRatio::Zero);
    let price1 = map.price_or_zero(FibRatio::One);

    !price0.is_zero() && !price1.is_zero() && price0 < price1
}

/// Resolve the trade levels for `direction`. Missing ratios resolve to zero.
pub fn resolve_levels(map: &FibPriceMap, direction: Direction) -> PriceLevels {
    let price0 = map.price_or_zero(FibRatio::Zero);
    let price1 = map.price_or_zero(FibRatio::One);
    let ext_low = map.price_or_zero(FibRatio::OnePoint2);
    let ext_high = map.price_or_zero(FibRatio::NegPoint2);

    let (entry, target, stop): (Decimal, Decimal, Decimal) = match (direction, is_inverted(map)) {
        (Direction::Long, true) => (price0, price1, ext_high),
        (Direction::Long, false) => (price1, price0, ext_low),
        (Direction::Short, true) => (price1, price0, ext_low),
        (Direction::Short, false) => (price0, price1, ext_high),
    };

    PriceLevels::new(entry, target, stop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn map(entries: &[(FibRatio, Decimal)]) -> FibPriceMap {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_inversion_detection() {
        assert!(!is_inverted(&map(&[(FibRatio::Zero, dec!(100)), (FibRatio::One, dec!(50))])));
        assert!(is_inverted(&map(&[(FibRatio::Zero, dec!(50)), (FibRatio::One, dec!(100))])));
        assert!(!is_inverted(&map(&[(FibRatio::Zero, dec!(50))])));
        assert!(!is_inverted(&map(&[(FibRatio::Zero, dec!(0)), (FibRatio::One, dec!(100))])));
        assert!(!is_inverted(&FibPriceMap::new()));
    }

    #[test]
    fn test_normal_layout() {
        // 0 at the top, 1 at the bottom
        let levels = map(&[
            (FibRatio::NegPoint2, dec!(220)),
            (FibRatio::Zero, dec!(200)),
            (FibRatio::One, dec!(100)),
            (FibRatio::OnePoint2, dec!(80)),
        ]);

        assert_eq!(
            resolve_levels(&levels, Direction::Long),
            PriceLevels::new(dec!(100), dec!(200), dec!(80))
        );
        assert_eq!(
            resolve_levels(&levels, Direction::Short),
            PriceLevels::new(dec!(200), dec!(100), dec!(220))
        );
    }

    #[test]
    fn test_inverted_layout() {
        // 0 at the bottom, 1 at the top
        let levels = map(&[
            (FibRatio::NegPoint2, dec!(80)),
            (FibRatio::Zero, dec!(100)),
            (FibRatio::One, dec!(200)),
            (FibRatio::OnePoint2, dec!(220)),
        ]);

        assert_eq!(
            resolve_levels(&levels, Direction::Long),
            PriceLevels::new(dec!(100), dec!(200), dec!(80))
        );
        assert_eq!(
            resolve_levels(&levels, Direction::Short),
            PriceLevels::new(dec!(200), dec!(100), dec!(220))
        );
    }

    #[test]
    fn test_missing_ratios_are_zero() {
        let levels = map(&[(FibRatio::One, dec!(100)), (FibRatio::Half, dec!(150))]);

        let long = resolve_levels(&levels, Direction::Long);
        assert_eq!(long, PriceLevels::new(dec!(100), Decimal::ZERO, Decimal::ZERO));
        assert!(!long.is_complete());

        assert_eq!(resolve_levels(&FibPriceMap::new(), Direction::Short), PriceLevels::default());
    }
}
