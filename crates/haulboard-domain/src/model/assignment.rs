use haulboard_types::Run;
use serde::{Deserialize, Serialize};

use super::Consignment;

/// Placement of one consignment on one lorry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub lorry_id: String,
    pub consignment_id: String,
    /// Pallets as resolved when assigned; may legitimately be 0
    pub effective_pallets: u32,
    pub effective_weight: f64,
    /// `false` = Run 1, `true` = Run 2
    pub is_reload: bool,
    /// Position within the lorry; only relative order matters
    pub sort_order: i64,
}

impl Assignment {
    pub fn run(&self) -> Run {
        Run::from_reload_flag(self.is_reload)
    }
}

/// An assignment joined with its consignment, if the consignment is still known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedJob {
    pub assignment: Assignment,
    pub consignment: Option<Consignment>,
}
