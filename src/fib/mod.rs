//! Fibonacci label extraction: OCR text -> ratio/price map -> entry/target/stop.

mod parser;
mod resolver;

pub use parser::parse_fib_levels;
pub use resolver::{is_inverted, resolve_levels};
