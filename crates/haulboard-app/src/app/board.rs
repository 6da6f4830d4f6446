//! Read models for the planning board

use serde::{Deserialize, Serialize};

use haulboard_domain::model::{Assignment, Consignment, Lorry};
use haulboard_domain::service::{CapacityState, LocationGroup, ResolvedPallets, RunSummary};
use haulboard_types::Run;

/// One job line on a lorry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardRow {
    pub assignment: Assignment,
    pub consignment: Option<Consignment>,
    /// Manual reload flag OR an ETA before the plan date
    pub displayed_as_reload: bool,
    /// Zero effective pallets, or the site reported zero and the count is awaited
    pub missing_pallets: bool,
}

/// One run of a lorry, in loading order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunBoard {
    pub summary: RunSummary,
    pub rows: Vec<BoardRow>,
}

/// Everything shown for one lorry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LorryBoard {
    pub lorry: Lorry,
    pub state: CapacityState,
    pub run1: RunBoard,
    pub run2: RunBoard,
    pub locations: Vec<LocationGroup>,
}

impl LorryBoard {
    pub fn run(&self, run: Run) -> &RunBoard {
        match run {
            Run::Primary => &self.run1,
            Run::Reload => &self.run2,
        }
    }

    pub fn has_overflow(&self) -> bool {
        self.run1.summary.over_capacity || self.run2.summary.over_capacity
    }

    pub fn job_count(&self) -> usize {
        self.run1.rows.len() + self.run2.rows.len()
    }
}

/// An active consignment not yet placed on any lorry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub consignment: Consignment,
    pub pallets: ResolvedPallets,
    pub missing_pallets: bool,
    /// ETA precedes the plan date; a hint that it belongs on a reload
    pub eta_before_plan: bool,
}
