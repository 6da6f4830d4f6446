//! Core types and error definitions shared across haulboard crates

mod error;
mod types;

pub use error::*;
pub use types::*;
