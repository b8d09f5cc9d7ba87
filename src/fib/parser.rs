//! Scanner for "ratio (price)" labels in recognized chart text.
//!
//! Charting tools print each Fibonacci line as a ratio followed by its
//! price in brackets, e.g. `1.2 (3,151.25)` or `0.5 [3100.50]`. OCR output
//! around those labels is noisy, so anything that does not fit the label
//! shape, or whose ratio is not canonical, is skipped without error.

use std::ops::Range;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::models::{FibPriceMap, FibRatio};

/// Maximum distance between a recognized ratio and its canonical value.
///
/// Ratios are compared as `f64`, so `0.21` lies just inside the tolerance
/// of `0.2` while `0.74` and `1.21` lie just outside theirs.
const RATIO_TOLERANCE: f64 = 0.01;

/// OCR regularly drops the minus sign of the -0.2 extension.
const DROPPED_SIGN_RATIO: f64 = 0.2;

/// Byte ranges of one `ratio (price)` occurrence.
#[derive(Debug, PartialEq, Eq)]
struct LabelMatch {
    ratio: Range<usize>,
    price: Range<usize>,
    end: usize,
}

/// Extract every canonical ratio and its price from `text`.
///
/// Occurrences are scanned left to right without overlap. A later
/// occurrence of the same ratio replaces an earlier one.
pub fn parse_fib_levels(text: &str) -> FibPriceMap {
    let mut prices = FibPriceMap::new();
    let bytes = text.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let Some(label) = match_label_at(bytes, pos) else {
            pos += 1;
            continue;
        };
        pos = label.end;

        let ratio_text = &text[label.ratio.clone()];
        let price_text = &text[label.price.clone()];

        let (Some(ratio), Some(price)) = (parse_ratio(ratio_text), parse_price(price_text)) else {
            debug!(ratio = ratio_text, price = price_text, "Unparseable label skipped");
            continue;
        };

        match canonical_ratio(ratio) {
            Some(fib) => {
                trace!(ratio = %fib, price = %price, "Matched fib label");
                prices.insert(fib, price);
            }
            None => {
                debug!(ratio = %ratio, price = %price, "Non-canonical ratio skipped");
            }
        }
    }

    prices
}

/// Map a recognized ratio onto the first canonical ratio within tolerance.
fn canonical_ratio(recognized: f64) -> Option<FibRatio> {
    let ratio = if (recognized - DROPPED_SIGN_RATIO).abs() < RATIO_TOLERANCE {
        -DROPPED_SIGN_RATIO
    } else {
        recognized
    };

    FibRatio::ALL
        .into_iter()
        .find(|fib| (ratio - fib.as_f64()).abs() < RATIO_TOLERANCE)
}

fn parse_ratio(raw: &str) -> Option<f64> {
    // "1." is a valid ratio token
    raw.trim_end_matches('.').parse().ok()
}

fn parse_price(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.replace(',', "")).ok()
}

/// Try to match a label starting exactly at `start`.
///
/// Shape: `-?D.?D*`, spaces, one of `([{`, spaces, `D[D,]*.?D+`, spaces,
/// one of `)]}`. Opening and closing brackets need not be the same kind.
fn match_label_at(bytes: &[u8], start: usize) -> Option<LabelMatch> {
    let mut i = start;

    // Ratio
    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }
    if !is_digit_at(bytes, i) {
        return None;
    }
    i += 1;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
    }
    i = skip_while(bytes, i, |b| b.is_ascii_digit());
    let ratio = start..i;

    i = skip_while(bytes, i, is_space);
    if !matches!(bytes.get(i), Some(b'(' | b'[' | b'{')) {
        return None;
    }
    i = skip_while(bytes, i + 1, is_space);

    // Price
    let price_start = i;
    if !is_digit_at(bytes, i) {
        return None;
    }
    i = skip_while(bytes, i + 1, |b| b.is_ascii_digit() || b == b',');
    if bytes.get(i) == Some(&b'.') {
        let frac_end = skip_while(bytes, i + 1, |b| b.is_ascii_digit());
        if frac_end == i + 1 {
            return None;
        }
        i = frac_end;
    } else if i - price_start < 2 || bytes[i - 1] == b',' {
        // Integer prices need at least two digits and must end in a digit
        return None;
    }
    let price = price_start..i;

    i = skip_while(bytes, i, is_space);
    if !matches!(bytes.get(i), Some(b')' | b']' | b'}')) {
        return None;
    }

    Some(LabelMatch {
        ratio,
        price,
        end: i + 1,
    })
}

fn is_digit_at(bytes: &[u8], i: usize) -> bool {
    bytes.get(i).is_some_and(|b| b.is_ascii_digit())
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

fn skip_while(bytes: &[u8], mut i: usize, pred: impl Fn(u8) -> bool) -> usize {
    while i < bytes.len() && pred(bytes[i]) {
        i += 1;
    }
    i
}
