//! Persistence implementations
//!
//! `BoardStore` implements every repository trait of the domain crate,
//! either in memory or backed by a JSON file.

mod board_store;

pub use board_store::{BoardState, BoardStore};
