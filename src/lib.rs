//! Fibonacci Risk Sizer
//!
//! Sizes leveraged trades so a stop-out loses a fixed share of capital,
//! with entry/target/stop read from Fibonacci labels on chart screenshots.

pub mod capture;
pub mod fib;
pub mod models;
pub mod trading;
