//! Plain-text daily board report

use chrono::NaiveDate;

use haulboard_types::Run;

use crate::app::{LorryBoard, PoolEntry, RunBoard};

pub fn generate_board_report(boards: &[LorryBoard], pool: &[PoolEntry], plan_date: NaiveDate) -> String {
    let job_count: usize = boards.iter().map(LorryBoard::job_count).sum();
    let overflowing = boards.iter().filter(|b| b.has_overflow()).count();
    let awaiting = pool.iter().filter(|p| p.missing_pallets).count();

    let mut report = String::new();
    report.push_str("==================================================\n");
    report.push_str("              Daily Planning Board                 \n");
    report.push_str(&format!("              {}                           \n", plan_date));
    report.push_str("==================================================\n\n");
    report.push_str("[Summary]\n");
    report.push_str(&format!("  Lorries:                {}\n", boards.len()));
    report.push_str(&format!("  Planned jobs:           {}\n", job_count));
    report.push_str(&format!("  Lorries over capacity:  {}\n", overflowing));
    report.push_str(&format!("  Unassigned jobs:        {}\n", pool.len()));
    if awaiting > 0 {
        report.push_str(&format!("  Awaiting pallet counts: {}\n", awaiting));
    }
    report.push('\n');

    for board in boards {
        report.push_str(&format!(
            "[{}] {} - {} pallets, {:.0} kg ({})\n",
            board.lorry.id,
            board.lorry.name,
            board.state.capacity_pallets,
            board.state.capacity_weight,
            board.lorry.status.label()
        ));
        push_run(&mut report, Run::Primary, &board.run1);
        push_run(&mut report, Run::Reload, &board.run2);
        report.push('\n');
    }

    if overflowing > 0 {
        report.push_str("[Over capacity]\n");
        for board in boards.iter().filter(|b| b.has_overflow()) {
            for run_board in [&board.run1, &board.run2] {
                let summary = &run_board.summary;
                if summary.over_capacity {
                    report.push_str(&format!(
                        "  {:<12} {}: +{} pallets, +{:.0} kg\n",
                        truncate_str(&board.lorry.id, 11),
                        summary.run,
                        summary.overflow_pallets,
                        summary.overflow_weight
                    ));
                }
            }
        }
        report.push('\n');
    }

    if !pool.is_empty() {
        report.push_str("[Unassigned]\n");
        report.push_str("-".repeat(70).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:<12} {:<22} {:<22} {:>8}\n",
            "Job", "Customer", "Destination", "Pallets"
        ));
        report.push_str("-".repeat(70).as_str());
        report.push('\n');
        for entry in pool {
            report.push_str(&format!(
                "{:<12} {:<22} {:<22} {:>8}{}\n",
                truncate_str(&entry.consignment.id, 11),
                truncate_str(&entry.consignment.customer_name, 21),
                truncate_str(&entry.consignment.destination, 21),
                entry.pallets.pallets,
                if entry.missing_pallets { " ?" } else { "" }
            ));
        }
        report.push('\n');
    }

    report.push_str("==================================================\n");
    report
}

fn push_run(report: &mut String, run: Run, board: &RunBoard) {
    let summary = &board.summary;
    report.push_str(&format!(
        "  {}: {} jobs, {} pallets ({:.0}%), {:.0} kg ({:.0}%) [{}]\n",
        run,
        summary.load.job_count,
        summary.load.used_pallets,
        summary.pallet_percent,
        summary.load.used_weight,
        summary.weight_percent,
        summary.band.label()
    ));
    if summary.over_capacity {
        report.push_str(&format!(
            "    OVER CAPACITY by {} pallets / {:.0} kg\n",
            summary.overflow_pallets, summary.overflow_weight
        ));
    }
    for (index, row) in board.rows.iter().enumerate() {
        let (customer, destination) = row
            .consignment
            .as_ref()
            .map(|c| (c.customer_name.as_str(), c.destination.as_str()))
            .unwrap_or(("(unknown)", ""));
        let mut flags = String::new();
        if row.displayed_as_reload && run == Run::Primary {
            flags.push_str(" R");
        }
        if row.missing_pallets {
            flags.push_str(" ?");
        }
        report.push_str(&format!(
            "    {:>2}. {:<12} {:<22} {:<22} {:>4}{}\n",
            index + 1,
            truncate_str(&row.assignment.consignment_id, 11),
            truncate_str(customer, 21),
            truncate_str(destination, 21),
            row.assignment.effective_pallets,
            flags
        ));
    }
}

/// Cut `s` to `max_len` characters, marking the cut with an ellipsis
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    } else {
        s.to_string()
    }
}
