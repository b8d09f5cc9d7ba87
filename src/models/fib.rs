//! Canonical Fibonacci ratios and the sparse ratio -> price map read off a chart.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// One of the seven retracement/extension ratios drawn on the chart.
///
/// Variants are declared in ascending ratio order, so the derived `Ord`
/// matches numeric order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FibRatio {
    /// -0.2 extension beyond the "0" end of the swing
    #[serde(rename = "-0.2")]
    NegPoint2,
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "0.25")]
    Quarter,
    #[serde(rename = "0.5")]
    Half,
    #[serde(rename = "0.75")]
    ThreeQuarters,
    #[serde(rename = "1")]
    One,
    /// 1.2 extension beyond the "1" end of the swing
    #[serde(rename = "1.2")]
    OnePoint2,
}

impl FibRatio {
    /// All canonical ratios, ascending.
    pub const ALL: [FibRatio; 7] = [
        FibRatio::NegPoint2,
        FibRatio::Zero,
        FibRatio::Quarter,
        FibRatio::Half,
        FibRatio::ThreeQuarters,
        FibRatio::One,
        FibRatio::OnePoint2,
    ];

    pub fn value(&self) -> Decimal {
        match self {
            FibRatio::NegPoint2 => dec!(-0.2),
            FibRatio::Zero => dec!(0),
            FibRatio::Quarter => dec!(0.25),
            FibRatio::Half => dec!(0.5),
            FibRatio::ThreeQuarters => dec!(0.75),
            FibRatio::One => dec!(1),
            FibRatio::OnePoint2 => dec!(1.2),
        }
    }

    /// Binary floating point value, used where recognized ratios are compared.
    pub fn as_f64(&self) -> f64 {
        match self {
            FibRatio::NegPoint2 => -0.2,
            FibRatio::Zero => 0.0,
            FibRatio::Quarter => 0.25,
            FibRatio::Half => 0.5,
            FibRatio::ThreeQuarters => 0.75,
            FibRatio::One => 1.0,
            FibRatio::OnePoint2 => 1.2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FibRatio::NegPoint2 => "-0.2",
            FibRatio::Zero => "0",
            FibRatio::Quarter => "0.25",
            FibRatio::Half => "0.5",
            FibRatio::ThreeQuarters => "0.75",
            FibRatio::One => "1",
            FibRatio::OnePoint2 => "1.2",
        }
    }
}

impl fmt::Display for FibRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Prices observed for each recognized ratio. Never required to be complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FibPriceMap {
    prices: BTreeMap<FibRatio, Decimal>,
}

impl FibPriceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a price, replacing any earlier one for the same ratio.
    pub fn insert(&mut self, ratio: FibRatio, price: Decimal) -> Option<Decimal> {
        self.prices.insert(ratio, price)
    }

    pub fn get(&self, ratio: FibRatio) -> Option<Decimal> {
        self.prices.get(&ratio).copied()
    }

    /// Price for `ratio`, or zero when it was never recognized.
    pub fn price_or_zero(&self, ratio: FibRatio) -> Decimal {
        self.get(ratio).unwrap_or(Decimal::ZERO)
    }

    /// Number of distinct canonical ratios found.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn clear(&mut self) {
        self.prices.clear();
    }

    /// Entries in ascending ratio order.
    pub fn iter(&self) -> impl Iterator<Item = (FibRatio, Decimal)> + '_ {
        self.prices.iter().map(|(r, p)| (*r, *p))
    }
}

impl FromIterator<(FibRatio, Decimal)> for FibPriceMap {
    fn from_iter<I: IntoIterator<Item = (FibRatio, Decimal)>>(iter: I) -> Self {
        let mut map = FibPriceMap::new();
        for (ratio, price) in iter {
            map.insert(ratio, price);
        }
        map
    }
}
