//! Command-line front-end for the EcoTrak tracker
//!
//! Each invocation loads the configured storage, runs one command through the
//! tracker and exits.

use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tokio::signal;

use shared::{
    logging, parse_timestamp, process_debug, process_info, DispatchBatch, DispatchRequest, GroupSelection,
    MaterialGroup, MaterialType, NewRecord, ProcessId, Record, RecordId, RecordQuery, RecordState, SortKey,
    SortOrder, Stats, TypeSummary,
};
use tracker::services::export_report;
use tracker::{BackendArgs, Tracker, TrackerConfig, TrackerError, TrackerHandle};

/// Recyclable material intake and dispatch tracker
#[derive(Parser)]
#[command(name = "ecotrak")]
#[command(about = "Register recyclable material, group it by type and dispatch it in batches")]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub backend: BackendArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register a new intake record
    Register {
        /// Material type (Plastic, Cardboard, Glass, Metal, Other or free text)
        #[arg(long = "type")]
        material_type: String,

        /// Weight in kilograms
        #[arg(long)]
        weight: f64,

        /// Person registering the material
        #[arg(long)]
        by: String,

        /// Registration time, defaults to now
        #[arg(long, value_parser = parse_time_arg)]
        at: Option<NaiveDateTime>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List records
    List {
        #[arg(long = "type")]
        material_type: Option<MaterialType>,

        #[arg(long)]
        state: Option<RecordState>,

        /// First registration date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last registration date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Text matched against type, person, state and id
        #[arg(long)]
        search: Option<String>,

        /// Sort key (id, weight, date, type, person)
        #[arg(long)]
        sort: Option<SortKey>,

        /// Sort order (asc, desc)
        #[arg(long, default_value = "asc")]
        order: SortOrder,
    },

    /// Show active records grouped by material type
    Groups,

    /// Dispatch active records as one batch
    Dispatch {
        /// Material type to dispatch; repeat for several
        #[arg(long = "type")]
        types: Vec<MaterialType>,

        /// Dispatch every active group
        #[arg(long, conflicts_with = "types")]
        all: bool,

        /// Explicit record ids, comma separated
        #[arg(long, value_delimiter = ',')]
        ids: Vec<RecordId>,

        /// Person authorizing the dispatch
        #[arg(long)]
        by: String,

        /// Dispatch time, defaults to now
        #[arg(long, value_parser = parse_time_arg)]
        at: Option<NaiveDateTime>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Show the dispatch history
    History,

    /// Show dashboard statistics
    Stats,

    /// Show the per-type summary
    Report,

    /// Write the per-type summary and the record list as CSV files
    ExportReport {
        /// Directory receiving the report folder
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Copy the workbook sheets into a timestamped backup directory
    Backup,

    /// Verify the storage backend is reachable
    Check,
}

fn parse_time_arg(input: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(input).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    ProcessId::init_cli();
    logging::init_tracing_with_level(Some(&cli.log_level));

    let config = TrackerConfig::from_env(&cli.backend)?;
    process_debug!(
        ProcessId::current(),
        "Backend: {}, weight mode: {:?}",
        config.kind(),
        config.weight_mode
    );

    // Commands that talk to storage directly
    match &cli.command {
        Command::Backup => {
            let workbook = config
                .workbook()
                .context("backup is only available for the workbook backend")?;
            let target = workbook.backup().await?;
            logging::log_success(ProcessId::current(), "Workbook backed up");
            println!("{}", target.display());
            return Ok(());
        }
        Command::Check => {
            let info = config.build_adapter().check_connection().await?;
            if cli.json {
                print_json(&info)?;
            } else {
                match &info.title {
                    Some(title) => println!("✅ {} backend reachable: {} ({})", info.backend, info.target, title),
                    None => println!("✅ {} backend reachable: {}", info.backend, info.target),
                }
            }
            return Ok(());
        }
        _ => {}
    }

    let (tracker, handle) = Tracker::new(config.build_adapter(), config.weight_mode);

    // Set up graceful shutdown
    let shutdown_sender = tracker.get_shutdown_sender();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                logging::log_shutdown(ProcessId::current(), "Received Ctrl+C signal");
                let _ = shutdown_sender.send(()).await;
            }
            Err(err) => {
                logging::log_error(ProcessId::current(), "Signal handling", &err);
            }
        }
    });

    let worker = tracker.start().await?;
    let result = execute(cli.command, &handle, cli.json).await;

    drop(handle);
    worker.await.context("tracker task failed")?;
    result
}

async fn execute(command: Command, handle: &TrackerHandle, json: bool) -> anyhow::Result<()> {
    match command {
        Command::Register {
            material_type,
            weight,
            by,
            at,
            notes,
        } => {
            let record = handle
                .register(NewRecord {
                    material_type,
                    weight_kg: weight,
                    registered_at: at,
                    registered_by: by,
                    notes,
                })
                .await?;
            if json {
                print_json(&record)?;
            } else {
                println!(
                    "✅ Record #{} registered: {} {} kg by {}",
                    record.id, record.material_type, record.weight_kg, record.registered_by
                );
            }
        }
        Command::List {
            material_type,
            state,
            from,
            to,
            search,
            sort,
            order,
        } => {
            let records = handle
                .records(RecordQuery {
                    material_type,
                    state,
                    from,
                    to,
                    search,
                    sort,
                    order,
                })
                .await?;
            if json {
                print_json(&records)?;
            } else {
                print_records(&records);
            }
        }
        Command::Groups => {
            let groups = handle.groups().await?;
            if json {
                print_json(&groups)?;
            } else {
                print_groups(&groups);
            }
        }
        Command::Dispatch {
            types,
            all,
            ids,
            by,
            at,
            notes,
        } => {
            let selection = build_selection(handle, &types, all, &ids).await?;
            let request = DispatchRequest {
                selection,
                authorized_by: by,
                dispatched_at: at.unwrap_or_else(|| Local::now().naive_local()),
                notes,
            };

            let outcome = match handle.dispatch(request).await {
                Err(TrackerError::NothingToDispatch { skipped }) => {
                    for skip in &skipped {
                        println!("⚠️ Record #{} skipped: {}", skip.record_id, skip.reason);
                    }
                    anyhow::bail!("nothing to dispatch");
                }
                other => other?,
            };

            if json {
                print_json(&outcome)?;
            } else {
                print_batch(&outcome.batch);
                for skip in &outcome.skipped {
                    println!("⚠️ Record #{} skipped: {}", skip.record_id, skip.reason);
                }
            }
        }
        Command::History => {
            let batches = handle.history().await?;
            if json {
                print_json(&batches)?;
            } else if batches.is_empty() {
                println!("No dispatches yet");
            } else {
                for batch in &batches {
                    print_batch(batch);
                }
            }
        }
        Command::Stats => {
            let stats = handle.stats().await?;
            if json {
                print_json(&stats)?;
            } else {
                print_stats(&stats);
            }
        }
        Command::Report => {
            let summary = handle.type_summary().await?;
            if json {
                print_json(&summary)?;
            } else {
                print_summary(&summary);
            }
        }
        Command::ExportReport { out } => {
            let summary = handle.type_summary().await?;
            let records = handle.records(RecordQuery::default()).await?;
            logging::log_progress(
                ProcessId::current(),
                "Exporting report",
                &format!("{} types, {} records", summary.rows.len(), records.len()),
            );
            let target = export_report(&out, &summary, &records, Local::now().naive_local()).await?;
            process_info!(ProcessId::current(), "📄 Report written to {}", target.display());
            println!("{}", target.display());
        }
        Command::Backup | Command::Check => {}
    }
    Ok(())
}

/// Turn the dispatch flags into group selections
///
/// Type and `--all` selections take every active record of the chosen groups.
/// Explicit ids are passed through as given so unknown or dispatched ones come
/// back as skipped.
async fn build_selection(
    handle: &TrackerHandle,
    types: &[MaterialType],
    all: bool,
    ids: &[RecordId],
) -> anyhow::Result<Vec<GroupSelection>> {
    let groups = handle.groups().await?;
    let mut selection: Vec<GroupSelection> = groups
        .into_iter()
        .filter(|group| all || types.contains(&group.material_type))
        .map(|group| GroupSelection {
            material_type: group.material_type,
            record_ids: group.record_ids,
        })
        .collect();

    for &id in ids {
        let material_type = match handle.record(id).await {
            Ok(record) => record.material_type,
            Err(e) if e.is_not_found() => MaterialType::Other,
            Err(e) => return Err(e.into()),
        };
        match selection.iter_mut().find(|entry| entry.material_type == material_type) {
            Some(entry) => entry.record_ids.push(id),
            None => selection.push(GroupSelection {
                material_type,
                record_ids: vec![id],
            }),
        }
    }
    Ok(selection)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_records(records: &[Record]) {
    if records.is_empty() {
        println!("No records");
        return;
    }
    println!(
        "{:>5}  {:<12} {:>10}  {:<19}  {:<16} {:<10}",
        "ID", "Type", "Weight kg", "Registered", "By", "State"
    );
    for record in records {
        println!(
            "{:>5}  {:<12} {:>10.2}  {:<19}  {:<16} {:<10}",
            record.id,
            record.material_type,
            record.weight_kg,
            shared::format_timestamp(&record.registered_at),
            record.registered_by,
            record.state
        );
    }
}

fn print_groups(groups: &[MaterialGroup]) {
    if groups.is_empty() {
        println!("No active records");
        return;
    }
    for group in groups {
        let ids: Vec<String> = group.record_ids.iter().map(|id| id.to_string()).collect();
        println!(
            "📦 {}: {} records, {:.2} kg [{}] by {}",
            group.material_type,
            group.count,
            group.total_weight_kg,
            ids.join(", "),
            group.people.join(", ")
        );
    }
}

fn print_batch(batch: &DispatchBatch) {
    println!(
        "🚚 Dispatch #{} at {} by {}: {} records, {:.2} kg ({})",
        batch.dispatch_id,
        shared::format_timestamp(&batch.dispatched_at),
        batch.authorized_by,
        batch.record_count,
        batch.total_weight_kg(),
        batch.material_summary()
    );
    if let Some(notes) = &batch.notes {
        println!("   {notes}");
    }
}

fn print_stats(stats: &Stats) {
    println!("Records:      {}", stats.total_records);
    println!("Active:       {}", stats.active_records);
    println!("Dispatched:   {}", stats.dispatched_records);
    println!("Total weight: {:.2} kg", stats.total_weight_kg);
    println!("Average:      {:.2} kg", stats.average_weight_kg);
    println!("Dispatches:   {}", stats.dispatch_count);
    println!("Rate:         {:.1}%", stats.dispatch_rate_pct);
}

fn print_summary(summary: &TypeSummary) {
    println!(
        "{:<12} {:>8} {:>12} {:>8} {:>11} {:>7}",
        "Type", "Records", "Weight kg", "Active", "Dispatched", "Share"
    );
    for row in &summary.rows {
        println!(
            "{:<12} {:>8} {:>12.1} {:>8} {:>11} {:>6.1}%",
            row.material_type,
            row.total_records,
            row.total_weight_kg,
            row.active_records,
            row.dispatched_records,
            row.weight_share_pct
        );
    }
    let totals = &summary.totals;
    println!(
        "{:<12} {:>8} {:>12.1} {:>8} {:>11} {:>7}",
        "TOTAL", totals.total_records, totals.total_weight_kg, totals.active_records, totals.dispatched_records, "100%"
    );
}
