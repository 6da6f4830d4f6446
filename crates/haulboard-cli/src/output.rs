//! Output formatting module

use serde::Serialize;

use haulboard_app::app::{LorryBoard, PoolEntry, RunBoard};
use haulboard_app::report::truncate_str;
use haulboard_domain::service::{Preview, ResolvedPallets};
use haulboard_types::{OutputFormat, Result, Run};

/// Print `value` as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    println!("{}", content);
    Ok(())
}

pub fn output_boards(output_format: OutputFormat, boards: &[LorryBoard]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(boards);
    }

    if boards.is_empty() {
        println!("No lorries. Add one with `haulboard add-lorry`.");
        return Ok(());
    }
    for board in boards {
        print_board(board);
        println!();
    }
    Ok(())
}

pub fn output_board(output_format: OutputFormat, board: &LorryBoard) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(board);
    }
    print_board(board);
    Ok(())
}

fn print_board(board: &LorryBoard) {
    println!(
        "{} ({}) - {} pallets / {:.0} kg [{}]",
        board.lorry.name,
        board.lorry.id,
        board.state.capacity_pallets,
        board.state.capacity_weight,
        board.lorry.status.label()
    );
    println!("{}", "=".repeat(72));
    print_run(Run::Primary, &board.run1);
    print_run(Run::Reload, &board.run2);

    if board.locations.len() > 1 {
        let stops: Vec<String> = board
            .locations
            .iter()
            .map(|g| format!("{} ({})", g.location_name, g.jobs.len()))
            .collect();
        println!("Stops: {}", stops.join(", "));
    }
}

fn print_run(run: Run, board: &RunBoard) {
    let s = &board.summary;
    println!(
        "{}: {:>3} pallets {:>5.1}% | {:>7.0} kg {:>5.1}% | {}",
        run,
        s.load.used_pallets,
        s.pallet_percent,
        s.load.used_weight,
        s.weight_percent,
        s.band.label()
    );
    if s.over_capacity {
        println!(
            "  !! over capacity by {} pallets / {:.0} kg",
            s.overflow_pallets, s.overflow_weight
        );
    }
    if board.rows.is_empty() {
        println!("  (empty)");
    }
    for (index, row) in board.rows.iter().enumerate() {
        let (customer, destination) = row
            .consignment
            .as_ref()
            .map(|c| (c.customer_name.as_str(), c.destination.as_str()))
            .unwrap_or(("(missing)", ""));
        let mut flags = Vec::new();
        if row.displayed_as_reload && run == Run::Primary {
            flags.push("reload?");
        }
        if row.missing_pallets {
            flags.push("pallets?");
        }
        println!(
            "  {:>2}. {:<12} {:<20} {:<24} {:>3} plt {:>7.0} kg {}",
            index + 1,
            truncate_str(&row.assignment.consignment_id, 12),
            truncate_str(customer, 20),
            truncate_str(destination, 24),
            row.assignment.effective_pallets,
            row.assignment.effective_weight,
            flags.join(" ")
        );
    }
}

pub fn output_pool(output_format: OutputFormat, pool: &[PoolEntry]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(pool);
    }

    if pool.is_empty() {
        println!("Pool is empty.");
        return Ok(());
    }
    println!(
        "{:<12} {:<20} {:<24} {:>7} {:<16} {:<17}",
        "Job", "Customer", "Destination", "Pallets", "Source", "ETA"
    );
    println!("{}", "-".repeat(100));
    for entry in pool {
        let eta = entry
            .consignment
            .eta
            .map(|e| e.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let mut flags = Vec::new();
        if entry.missing_pallets {
            flags.push("pallets?");
        }
        if entry.eta_before_plan {
            flags.push("reload?");
        }
        println!(
            "{:<12} {:<20} {:<24} {:>7} {:<16} {:<17} {}",
            truncate_str(&entry.consignment.id, 12),
            truncate_str(&entry.consignment.customer_name, 20),
            truncate_str(&entry.consignment.destination, 24),
            entry.pallets.pallets,
            entry.pallets.source.label(),
            eta,
            flags.join(" ")
        );
    }
    println!("\n{} unassigned", pool.len());
    Ok(())
}

pub fn output_preview(output_format: OutputFormat, lorry_id: &str, preview: &Preview) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(preview);
    }
    println!("Preview for {} {}", lorry_id, preview.run);
    println!("  Pallets: {} ({:.1}%)", preview.preview_pallets, preview.pallet_percent);
    println!("  Weight:  {:.0} kg ({:.1}%)", preview.preview_weight, preview.weight_percent);
    if preview.would_exceed {
        println!("  Would EXCEED capacity");
    } else {
        println!("  Fits");
    }
    Ok(())
}

pub fn output_resolved(output_format: OutputFormat, consignment_id: &str, resolved: &ResolvedPallets) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(resolved);
    }
    println!(
        "{}: {} pallets ({})",
        consignment_id,
        resolved.pallets,
        resolved.source.label()
    );
    Ok(())
}
