//! Planning use cases

pub mod board;
pub mod planning_service;

pub use board::{BoardRow, LorryBoard, PoolEntry, RunBoard};
pub use planning_service::{PlanningPolicy, PlanningService};
