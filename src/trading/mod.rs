//! Trading logic: account configuration, risk sizing, calculator session.

mod calculator;
mod config;
mod risk_calculator;

pub use calculator::Calculator;
pub use config::{AccountConfig, FeeKind};
pub use risk_calculator::{RiskCalculator, ValidationError};
