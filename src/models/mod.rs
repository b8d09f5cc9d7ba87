//! Data models for trade direction, price levels, Fibonacci labels and sizing results.

mod fib;
mod levels;
mod plan;

pub use fib::{FibPriceMap, FibRatio};
pub use levels::{Direction, PriceLevels};
pub use plan::TradePlan;
