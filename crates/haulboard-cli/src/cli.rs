//! CLI definition using clap

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use haulboard_types::{LorryStatus, OutputFormat, Run};

#[derive(Parser)]
#[command(name = "haulboard")]
#[command(version)]
#[command(about = "Daily transport planning board: assign consignments to lorries across two runs")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Store directory override
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Plan date (YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true)]
    pub date: Option<NaiveDate>,
}

/// Which key normalization to apply
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KeyKind {
    Customer,
    Destination,
    Postcode,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show every lorry with both runs
    Board,

    /// Show one lorry
    Lorry {
        /// Lorry id
        id: String,
    },

    /// List active consignments not on any lorry
    Pool,

    /// Put a consignment at the end of a lorry's Run 1
    Assign {
        /// Consignment id
        consignment: String,

        /// Lorry id
        lorry: String,
    },

    /// Return a consignment to the pool
    Unassign {
        /// Consignment id
        consignment: String,
    },

    /// Set the loading order of a lorry (every current job, once)
    Reorder {
        /// Lorry id
        lorry: String,

        /// Consignment ids in the new order
        #[arg(required = true, num_args = 1..)]
        consignments: Vec<String>,
    },

    /// Move an assignment to Run 2, or back to Run 1 with --clear
    Reload {
        /// Assignment id
        assignment: String,

        /// Move back to Run 1
        #[arg(long)]
        clear: bool,
    },

    /// Move every Run 1 job of a lorry to Run 2
    ReloadAll {
        /// Lorry id
        lorry: String,
    },

    /// Project a job onto a lorry's run without changing anything
    Preview {
        /// Lorry id
        lorry: String,

        /// Preview an existing consignment
        #[arg(long, short = 'c', conflicts_with_all = ["pallets", "weight"])]
        consignment: Option<String>,

        /// Candidate pallets
        #[arg(long, allow_negative_numbers = true)]
        pallets: Option<i64>,

        /// Candidate weight (kg)
        #[arg(long, allow_negative_numbers = true)]
        weight: Option<f64>,

        /// Target run
        #[arg(long, short = 'r', value_enum, default_value = "primary")]
        run: Run,
    },

    /// Show the effective pallet count and where it came from
    Resolve {
        /// Consignment id
        consignment: String,
    },

    /// Set or clear a manual pallet count
    Override {
        /// Consignment id
        consignment: String,

        /// Pallet count
        #[arg(allow_negative_numbers = true, required_unless_present = "clear")]
        pallets: Option<i64>,

        /// Remove the override
        #[arg(long, conflicts_with = "pallets")]
        clear: bool,
    },

    /// Print the normalized matching key of a value
    Normalize {
        /// Kind of key
        #[arg(value_enum)]
        kind: KeyKind,

        /// Raw value
        value: String,
    },

    /// Extract a UK postcode from free text
    Postcode {
        /// Free text, e.g. an address line
        text: String,
    },

    /// Import consignments from a CSV sheet
    ImportConsignments {
        /// Path to CSV file
        file: PathBuf,

        /// Parse and report without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Replace the delivery location registry from a TOML file
    ImportLocations {
        /// Path to TOML file
        file: PathBuf,
    },

    /// Add or update a lorry
    AddLorry {
        /// Lorry id
        id: String,

        /// Display name
        name: String,

        /// Pallet spaces
        #[arg(long, short = 'p', value_parser = clap::value_parser!(u32).range(1..))]
        pallets: u32,

        /// Weight capacity (kg); config default if not given
        #[arg(long, short = 'w')]
        weight: Option<f64>,

        /// Operational status
        #[arg(long, value_enum, default_value = "on-road")]
        status: LorryStatus,
    },

    /// Print the daily planning report
    Report {
        /// Write the report to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set the global pallet fallback
        #[arg(long)]
        set_default_pallets: Option<u32>,

        /// Set the pallets counted for a zero-pallet job in previews
        #[arg(long)]
        set_missing_pallets_fallback: Option<u32>,

        /// Set the weight capacity for lorries without one
        #[arg(long)]
        set_weight_capacity: Option<f64>,

        /// Set the warning band threshold (%)
        #[arg(long)]
        set_warning: Option<f64>,

        /// Set the critical band threshold (%)
        #[arg(long)]
        set_critical: Option<f64>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set store directory
        #[arg(long)]
        set_store_dir: Option<PathBuf>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}
