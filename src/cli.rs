use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use doughflow::dates::parse_iso_date;
use doughflow::{EntryKind, Interval, Recurrence};

#[derive(Debug, Parser)]
#[command(name = "doughflow")]
#[command(about = "Local-first cash-flow forecaster", long_about = None)]
pub struct Cli {
    /// Override Doughflow home directory (config/data subdirs will be created inside it).
    #[arg(long, env = "DOUGHFLOW_HOME")]
    pub home: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log an expenditure.
    Bill(EntryArgs),
    /// Log an acquisition.
    Paycheck(EntryArgs),
    List(ListArgs),
    Rm(RmArgs),

    Forecast(ForecastArgs),
    Day(DayArgs),

    Import(ImportArgs),
    Export(ExportArgs),

    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct EntryArgs {
    pub name: String,
    pub amount: String,

    /// Anchor date of the schedule (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    #[arg(long, short = 'f', default_value = "monthly")]
    pub frequency: Recurrence,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only show entries of this type (bill or paycheck).
    #[arg(long)]
    pub kind: Option<EntryKind>,
}

#[derive(Debug, Args)]
pub struct RmArgs {
    pub id: String,
}

#[derive(Debug, Args, Clone)]
pub struct WindowFlags {
    /// Reference (selected) date. Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Window start (YYYY-MM-DD); requires --to.
    #[arg(long, value_parser = parse_date, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Window end (YYYY-MM-DD); requires --from.
    #[arg(long, value_parser = parse_date, requires = "from")]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub window: WindowFlags,

    #[arg(long, short = 'i')]
    pub interval: Option<Interval>,

    /// Show per-day acquisitions and expenditures next to the reserve.
    #[arg(long)]
    pub breakdown: bool,
}

#[derive(Debug, Args)]
pub struct DayArgs {
    #[arg(value_parser = parse_date)]
    pub day: NaiveDate,

    /// Window start (YYYY-MM-DD). Defaults to the first of the day's month.
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    pub path: std::path::PathBuf,

    /// Replace the stored entry list instead of appending to it.
    #[arg(long)]
    pub replace: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub window: WindowFlags,

    #[arg(long, short = 'i')]
    pub interval: Option<Interval>,

    /// Output file. Writes to stdout when omitted.
    #[arg(long, short = 'o')]
    pub out: Option<std::path::PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    Show,
    SetInterval { interval: Interval },
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub cmd: ConfigCmd,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_iso_date(raw).map_err(|e| format!("expected YYYY-MM-DD ({e})"))
}
