mod cli;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::Parser;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ConfigCmd, EntryArgs, WindowFlags};
use doughflow::config::{AppConfig, app_paths, load_or_init_config, write_config};
use doughflow::csv_io;
use doughflow::dates::{format_iso_date, start_of_month, today};
use doughflow::domain::ReserveTone;
use doughflow::recurrence::expand;
use doughflow::reserve::{breakdown, build_daily_series};
use doughflow::store::{EntryRepository, SqliteStore};
use doughflow::{
    DailyReservePoint, DateWindow, EntryKind, FinancialEntry, Interval, ReportingBucketPoint,
    project,
};

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DOUGHFLOW_LOG")
        .unwrap_or_else(|_| EnvFilter::new("doughflow=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = app_paths(cli.home.clone())?;
    let (mut cfg, cfg_path) = load_or_init_config(&paths)?;

    match cli.command {
        Command::Config(args) => handle_config(args.cmd, &mut cfg, &cfg_path),
        cmd => {
            let (store, db_path) =
                SqliteStore::open(&paths, cfg.storage_key()).with_context(|| {
                    format!("Failed to open entry store in {}", paths.data_dir.display())
                })?;

            match cmd {
                Command::Bill(args) => add_entry(&store, EntryKind::Expenditure, args),
                Command::Paycheck(args) => add_entry(&store, EntryKind::Acquisition, args),
                Command::List(args) => {
                    print_entries(&store.load()?, args.kind);
                    Ok(())
                }
                Command::Rm(args) => remove_entry(&store, &args.id),
                Command::Forecast(args) => {
                    let interval = args.interval.unwrap_or(cfg.default_interval);
                    print_forecast(&store, &args.window, interval, args.breakdown)
                }
                Command::Day(args) => print_day(&store, args.day, args.from),
                Command::Import(args) => {
                    import_entries(&store, &args.path, args.replace)?;
                    println!("Store: {}", db_path.display());
                    Ok(())
                }
                Command::Export(args) => {
                    let interval = args.interval.unwrap_or(cfg.default_interval);
                    export_buckets(&store, &args.window, interval, args.out.as_deref())
                }
                Command::Config(_) => unreachable!(),
            }
        }
    }
}

fn handle_config(cmd: ConfigCmd, cfg: &mut AppConfig, cfg_path: &Path) -> Result<()> {
    match cmd {
        ConfigCmd::Show => {
            println!("config\t{}", cfg_path.display());
            println!("default_interval\t{}", cfg.default_interval);
            println!("storage_key\t{}", cfg.storage_key());
            println!("created_at\t{}", cfg.created_at.to_rfc3339());
        }
        ConfigCmd::SetInterval { interval } => {
            cfg.default_interval = interval;
            write_config(cfg_path, cfg)?;
            println!("Default interval set to {interval}.");
        }
    }
    Ok(())
}

fn add_entry(store: &impl EntryRepository, kind: EntryKind, args: EntryArgs) -> Result<()> {
    let amount = parse_decimal(args.amount, "amount")?;
    let anchor = args.date.unwrap_or_else(today);
    let entry = FinancialEntry::new(kind, &args.name, amount, anchor, args.frequency)
        .with_context(|| format!("Rejected {kind} '{}'", args.name))?;

    let mut entries = store.load()?;
    entries.push(entry.clone());
    store.save(&entries)?;

    println!(
        "Logged {} '{}' {}{:.2} {} from {} (id {})",
        kind,
        entry.name,
        kind.sign_char(),
        entry.amount,
        entry.recurrence,
        format_iso_date(entry.anchor_date),
        entry.id
    );
    Ok(())
}

fn remove_entry(store: &impl EntryRepository, id: &str) -> Result<()> {
    let mut entries = store.load()?;
    let Some(pos) = entries.iter().position(|e| e.id == id) else {
        return Err(anyhow!("No such entry: '{id}'"));
    };
    let removed = entries.remove(pos);
    store.save(&entries)?;
    println!("Removed {} '{}'.", removed.kind, removed.name);
    Ok(())
}

fn print_entries(entries: &[FinancialEntry], kind: Option<EntryKind>) {
    let shown: Vec<&FinancialEntry> = entries
        .iter()
        .filter(|e| kind.is_none_or(|k| e.kind == k))
        .collect();
    if shown.is_empty() {
        println!("(no entries)");
        return;
    }
    for e in shown {
        println!(
            "{}\t{}\t{}\t{}{:.2}\t{}\t{}",
            e.id,
            e.kind,
            e.name,
            e.kind.sign_char(),
            e.amount,
            format_iso_date(e.anchor_date),
            e.recurrence
        );
    }
}

/// Explicit `--from/--to` wins; otherwise the interval's default window around the reference.
fn resolve_window(flags: &WindowFlags, interval: Interval) -> Result<(DateWindow, NaiveDate)> {
    let reference = flags.date.unwrap_or_else(today);
    let window = match (flags.from, flags.to) {
        (Some(from), Some(to)) => DateWindow::new(from, to),
        (None, None) => interval.default_window(reference),
        _ => return Err(anyhow!("--from and --to must be given together")),
    };
    Ok((window, reference))
}

fn print_forecast(
    store: &impl EntryRepository,
    flags: &WindowFlags,
    interval: Interval,
    with_breakdown: bool,
) -> Result<()> {
    let entries = store.load()?;
    let (window, reference) = resolve_window(flags, interval)?;
    let projection = project(&entries, window, interval, reference);

    println!(
        "Window {} to {} ({interval}, reference {})",
        format_iso_date(window.start),
        format_iso_date(window.end),
        format_iso_date(reference)
    );

    let points = projection.series.chart_points();
    let mut headers = vec!["Date", "Label", "Reserve", "Status"];
    if with_breakdown {
        headers.extend(["In", "Out"]);
    }

    let rows: Vec<Vec<String>> = points
        .iter()
        .map(|p| {
            let mut row = vec![
                format_iso_date(p.date),
                interval.label(p.date),
                format!("{:.2}", p.reserve),
                tone_label(p.tone()).to_string(),
            ];
            if with_breakdown {
                let (inflow, outflow) = flows(&projection.daily, interval, p);
                row.push(format!("{inflow:.2}"));
                row.push(format!("{outflow:.2}"));
            }
            row
        })
        .collect();

    print_table(&headers, &rows);

    let closing = projection
        .daily
        .last()
        .map_or(Decimal::ZERO, |p| p.reserve);
    println!(
        "Occurrences: {}, closing reserve: {:.2}",
        projection.occurrence_count(),
        closing
    );
    Ok(())
}

/// Acquisitions and expenditures behind one chart point: the day itself in day-level
/// views, the whole bucket otherwise.
fn flows(
    daily: &[DailyReservePoint],
    interval: Interval,
    point: &ReportingBucketPoint,
) -> (Decimal, Decimal) {
    let mut inflow = Decimal::ZERO;
    let mut outflow = Decimal::ZERO;
    let covered = daily.iter().filter(|d| {
        if interval.is_day_level() {
            d.date == point.date
        } else {
            interval.bucket_start(d.date) == point.date
        }
    });
    for occurrence in covered.flat_map(|d| d.occurrences.iter()) {
        match occurrence.kind {
            EntryKind::Acquisition => inflow += occurrence.amount,
            EntryKind::Expenditure => outflow += occurrence.amount,
        }
    }
    (inflow, outflow)
}

fn tone_label(tone: ReserveTone) -> &'static str {
    match tone {
        ReserveTone::Surplus => "surplus",
        ReserveTone::Deficit => "deficit",
    }
}

fn print_day(store: &impl EntryRepository, day: NaiveDate, from: Option<NaiveDate>) -> Result<()> {
    let entries = store.load()?;
    let window = DateWindow::new(from.unwrap_or_else(|| start_of_month(day)), day);
    if window.is_empty() {
        return Err(anyhow!("--from must not be after {}", format_iso_date(day)));
    }

    let occurrences = expand(&entries, window.start, window.end);
    let daily = build_daily_series(&occurrences, window.start, window.end);
    let b = breakdown(&daily, day).context("Day is outside the computed window")?;

    println!("{}", format_iso_date(b.date));
    println!("Previous reserve: {:.2}", b.previous_reserve);
    println!("+ Acquisitions:   {:.2}", b.acquisitions);
    println!("- Expenditures:   {:.2}", b.expenditures);
    println!("= Final reserve:  {:.2}", b.reserve);

    for (title, kind) in [
        ("Acquisitions", EntryKind::Acquisition),
        ("Expenditures", EntryKind::Expenditure),
    ] {
        println!("{title}:");
        let mut any = false;
        for o in b.of_kind(kind) {
            any = true;
            println!("  {} {} ({:.2})", kind.sign_char(), o.name, o.amount);
        }
        if !any {
            println!("  (none)");
        }
    }
    Ok(())
}

fn import_entries(store: &impl EntryRepository, path: &Path, replace: bool) -> Result<()> {
    let file =
        fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let imported = csv_io::read_entries(io::BufReader::new(file))
        .with_context(|| format!("Failed to import {}", path.display()))?;

    let mut entries = if replace { Vec::new() } else { store.load()? };
    let mut seen: HashSet<String> = entries.iter().map(|e| e.id.clone()).collect();
    for entry in &imported {
        if !seen.insert(entry.id.clone()) {
            return Err(anyhow!("Entry id '{}' already exists", entry.id));
        }
    }

    let count = imported.len();
    entries.extend(imported);
    store.save(&entries)?;
    println!("Imported {count} entries ({} total).", entries.len());
    Ok(())
}

fn export_buckets(
    store: &impl EntryRepository,
    flags: &WindowFlags,
    interval: Interval,
    out: Option<&Path>,
) -> Result<()> {
    let entries = store.load()?;
    let (window, reference) = resolve_window(flags, interval)?;
    let projection = project(&entries, window, interval, reference);
    let buckets = &projection.series.buckets;

    match out {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            csv_io::write_buckets(file, buckets, interval)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} rows to {}", buckets.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            csv_io::write_buckets(&mut lock, buckets, interval)?;
            lock.flush()?;
        }
    }
    Ok(())
}

fn parse_decimal(raw: String, field: &'static str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal for {field}: {raw}"))
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if headers.is_empty() {
        println!("(no columns)");
        return;
    }

    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();

    for row in rows {
        for (i, cell) in row.iter().take(cols).enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    fn print_row(cells: &[String], widths: &[usize]) {
        print!("|");
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            print!(" {:width$} |", cell, width = *w);
        }
        println!();
    }

    fn print_sep(widths: &[usize]) {
        print!("|");
        for w in widths {
            print!("{}|", "-".repeat(w + 2));
        }
        println!();
    }

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    print_row(&header_cells, &widths);
    print_sep(&widths);
    for row in rows {
        print_row(row, &widths);
    }
}
