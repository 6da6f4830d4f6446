//! Command handlers

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use haulboard_app::app::PlanningService;
use haulboard_app::config::Config;
use haulboard_app::report::generate_board_report;
use haulboard_app::repository::open_board_store;
use haulboard_domain::model::Lorry;
use haulboard_domain::service::{
    extract_postcode, normalize_customer, normalize_destination, normalize_postcode,
};
use haulboard_infra::consignment_csv::load_consignments_from_csv;
use haulboard_infra::location_loader::LocationRegistryLoader;
use haulboard_infra::persistence::BoardStore;
use haulboard_types::{Error, LorryStatus, OutputFormat, Result, Run};

use crate::cli::{Cli, Commands, KeyKind};
use crate::output::{
    output_board, output_boards, output_pool, output_preview, output_resolved, print_json,
};

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(ref dir) = cli.store_dir {
        config.store_dir = Some(dir.clone());
    }

    let output_format = cli.format.unwrap_or(config.output_format);
    let plan_date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    debug!(%plan_date, %output_format, "starting");

    // config works without opening the store
    if let Commands::Config {
        show,
        set_default_pallets,
        set_missing_pallets_fallback,
        set_weight_capacity,
        set_warning,
        set_critical,
        set_output,
        set_store_dir,
        reset,
    } = &cli.command
    {
        return cmd_config(ConfigChanges {
            show: *show,
            default_pallets: *set_default_pallets,
            missing_pallets_fallback: *set_missing_pallets_fallback,
            weight_capacity: *set_weight_capacity,
            warning: *set_warning,
            critical: *set_critical,
            output: *set_output,
            store_dir: set_store_dir.clone(),
            reset: *reset,
        });
    }

    match &cli.command {
        Commands::Normalize { kind, value } => return cmd_normalize(output_format, *kind, value),
        Commands::Postcode { text } => return cmd_postcode(output_format, text),
        _ => {}
    }

    let store = open_board_store(&config)?;
    let service = PlanningService::new(&store, config.policy());

    match &cli.command {
        Commands::Board => output_boards(output_format, &service.board(plan_date)?),

        Commands::Lorry { id } => output_board(output_format, &service.lorry_board(id, plan_date)?),

        Commands::Pool => output_pool(output_format, &service.unassigned_pool(plan_date)?),

        Commands::Assign { consignment, lorry } => {
            let assignment = service.assign(consignment, lorry)?;
            if output_format == OutputFormat::Json {
                return print_json(&assignment);
            }
            println!(
                "Assigned {} to {} (Run 1, position {}, {} pallets)",
                consignment, lorry, assignment.sort_order, assignment.effective_pallets
            );
            print_fill(&service, lorry)
        }

        Commands::Unassign { consignment } => {
            let removed = service.unassign(consignment)?;
            if output_format == OutputFormat::Json {
                return print_json(&removed);
            }
            println!("Returned {} to the pool (was on {})", consignment, removed.lorry_id);
            Ok(())
        }

        Commands::Reorder { lorry, consignments } => {
            let list = service.reorder(lorry, consignments)?;
            if output_format == OutputFormat::Json {
                return print_json(&list);
            }
            println!("Reordered {} ({} jobs)", lorry, list.len());
            Ok(())
        }

        Commands::Reload { assignment, clear } => {
            let updated = service.set_reload_flag(assignment, !clear)?;
            if output_format == OutputFormat::Json {
                return print_json(&updated);
            }
            println!(
                "{} is now on {} of {}",
                updated.consignment_id,
                updated.run(),
                updated.lorry_id
            );
            print_fill(&service, &updated.lorry_id)
        }

        Commands::ReloadAll { lorry } => {
            let moved = service.mark_all_as_reload(lorry)?;
            if output_format == OutputFormat::Json {
                return print_json(&serde_json::json!({ "lorry_id": lorry, "moved": moved }));
            }
            println!("Moved {} job(s) on {} to Run 2", moved, lorry);
            print_fill(&service, lorry)
        }

        Commands::Preview {
            lorry,
            consignment,
            pallets,
            weight,
            run,
        } => {
            let preview = match consignment {
                Some(id) => service.preview_consignment(lorry, id, *run)?,
                None => service.preview_candidate(lorry, *pallets, *weight, *run)?,
            };
            output_preview(output_format, lorry, &preview)
        }

        Commands::Resolve { consignment } => {
            let resolved = service.resolve_pallets(consignment)?;
            output_resolved(output_format, consignment, &resolved)
        }

        Commands::Override {
            consignment,
            pallets,
            clear,
        } => {
            let resolved = match (*pallets, *clear) {
                (_, true) => service.clear_pallet_override(consignment)?,
                (Some(p), false) => service.set_pallet_override(consignment, p)?,
                (None, false) => {
                    return Err(Error::InvalidInput(
                        "give a pallet count or --clear".to_string(),
                    ))
                }
            };
            output_resolved(output_format, consignment, &resolved)
        }

        Commands::ImportConsignments { file, dry_run } => {
            cmd_import_consignments(&store, output_format, file, *dry_run)
        }

        Commands::ImportLocations { file } => cmd_import_locations(&store, output_format, file),

        Commands::AddLorry {
            id,
            name,
            pallets,
            weight,
            status,
        } => cmd_add_lorry(&store, output_format, id, name, *pallets, *weight, *status),

        Commands::Report { output } => {
            let boards = service.board(plan_date)?;
            let pool = service.unassigned_pool(plan_date)?;
            let report = generate_board_report(&boards, &pool, plan_date);
            match output {
                Some(path) => {
                    std::fs::write(path, &report)?;
                    println!("Report written to {}", path.display());
                }
                None => print!("{}", report),
            }
            Ok(())
        }

        Commands::Config { .. } | Commands::Normalize { .. } | Commands::Postcode { .. } => Ok(()),
    }
}

/// One-line fill summary after a mutation
fn print_fill(service: &PlanningService<'_, BoardStore>, lorry_id: &str) -> Result<()> {
    let state = service.capacity_state(lorry_id)?;
    let thresholds = service.policy().thresholds;
    for run in [Run::Primary, Run::Reload] {
        let s = state.summarize(run, &thresholds);
        println!(
            "  {}: {}/{} pallets ({:.0}%) {}{}",
            run,
            s.load.used_pallets,
            state.capacity_pallets,
            s.pallet_percent,
            s.band.label(),
            if s.over_capacity { " OVER" } else { "" }
        );
    }
    Ok(())
}

fn cmd_normalize(output_format: OutputFormat, kind: KeyKind, value: &str) -> Result<()> {
    let key = match kind {
        KeyKind::Customer => normalize_customer(value),
        KeyKind::Destination => normalize_destination(value),
        KeyKind::Postcode => normalize_postcode(value),
    };
    if output_format == OutputFormat::Json {
        return print_json(&serde_json::json!({ "input": value, "key": key }));
    }
    println!("{}", key.as_deref().unwrap_or("(empty)"));
    Ok(())
}

fn cmd_postcode(output_format: OutputFormat, text: &str) -> Result<()> {
    let postcode = extract_postcode(text);
    if output_format == OutputFormat::Json {
        return print_json(&serde_json::json!({ "input": text, "postcode": postcode }));
    }
    println!("{}", postcode.as_deref().unwrap_or("(none)"));
    Ok(())
}

fn cmd_import_consignments(
    store: &BoardStore,
    output_format: OutputFormat,
    file: &Path,
    dry_run: bool,
) -> Result<()> {
    let consignments = load_consignments_from_csv(file)?;
    let written = if dry_run {
        0
    } else {
        store.upsert_consignments(consignments.iter().cloned())?
    };

    if output_format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "file": file.display().to_string(),
            "parsed": consignments.len(),
            "written": written,
            "dry_run": dry_run,
        }));
    }

    let awaiting = consignments
        .iter()
        .filter(|c| c.reported_pallets.is_none() || c.awaiting_pallet_count())
        .count();
    println!("Parsed {} consignment(s) from {}", consignments.len(), file.display());
    if awaiting > 0 {
        println!("  {} without a reported pallet count", awaiting);
    }
    if dry_run {
        println!("Dry run: nothing written");
    } else {
        println!("Stored {} consignment(s)", written);
    }
    Ok(())
}

fn cmd_import_locations(store: &BoardStore, output_format: OutputFormat, file: &Path) -> Result<()> {
    let registry = LocationRegistryLoader::load_from_file(file)?;
    let count = registry.count();
    store.replace_locations(registry.into_locations())?;

    if output_format == OutputFormat::Json {
        return print_json(&serde_json::json!({ "locations": count }));
    }
    println!("Loaded {} delivery location(s) from {}", count, file.display());
    Ok(())
}

fn cmd_add_lorry(
    store: &BoardStore,
    output_format: OutputFormat,
    id: &str,
    name: &str,
    pallets: u32,
    weight: Option<f64>,
    status: LorryStatus,
) -> Result<()> {
    let mut lorry = Lorry::new(id, name, pallets);
    if let Some(w) = weight {
        if !(w.is_finite() && w > 0.0) {
            return Err(Error::InvalidInput(format!(
                "weight capacity must be a positive number (got {})",
                w
            )));
        }
        lorry = lorry.with_weight_capacity(w);
    }
    lorry.status = status;
    store.upsert_lorry(lorry.clone())?;

    if output_format == OutputFormat::Json {
        return print_json(&lorry);
    }
    println!(
        "Saved lorry {} ({}): {} pallets, {} [{}]",
        lorry.id,
        lorry.name,
        lorry.capacity_pallets,
        lorry
            .capacity_weight
            .map(|w| format!("{:.0} kg", w))
            .unwrap_or_else(|| "default weight".to_string()),
        lorry.status.label()
    );
    Ok(())
}

struct ConfigChanges {
    show: bool,
    default_pallets: Option<u32>,
    missing_pallets_fallback: Option<u32>,
    weight_capacity: Option<f64>,
    warning: Option<f64>,
    critical: Option<f64>,
    output: Option<OutputFormat>,
    store_dir: Option<PathBuf>,
    reset: bool,
}

fn cmd_config(changes: ConfigChanges) -> Result<()> {
    if changes.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    // Load the file alone so the environment override is not persisted
    let mut config = Config::load_from(&Config::config_path()?)?;
    let mut modified = false;

    if let Some(v) = changes.default_pallets {
        config.default_pallets = v;
        modified = true;
    }
    if let Some(v) = changes.missing_pallets_fallback {
        config.missing_pallets_fallback = v;
        modified = true;
    }
    if let Some(v) = changes.weight_capacity {
        config.default_weight_capacity = v;
        modified = true;
    }
    if let Some(v) = changes.warning {
        config.warning_threshold = v;
        modified = true;
    }
    if let Some(v) = changes.critical {
        config.critical_threshold = v;
        modified = true;
    }
    if let Some(v) = changes.output {
        config.output_format = v;
        modified = true;
    }
    if let Some(v) = changes.store_dir {
        config.store_dir = Some(v);
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration saved");
    }

    if changes.show || !modified {
        println!("{}", config);
    }
    Ok(())
}
