pub mod categorize;
pub mod day;
pub mod output;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use categorize::{process_categorize_command, CategorizeCommand};
use chrono::Local;
use clap::{Parser, Subcommand};
use day::{parse_day, DateStyle};
use tracing::level_filters::LevelFilter;

use crate::{
    config::{
        TrackerConfig, DEFAULT_PRUNE_INTERVAL, DEFAULT_RETENTION_DAYS, DEFAULT_TOP_DOMAINS,
    },
    domain::CategoryClassifier,
    fs::operations::write_atomically,
    host::{protocol::Framing, start_host},
    ledger::{
        entities::{Ledger, VisitEvent},
        migration::migrate,
        ResetScope, TimeLedger,
    },
    stats::{export::export_document, time_stats},
    storage::ledger_storage::{JsonFileStorage, LedgerStorage},
    utils::{
        clock::{Clock, DefaultClock},
        dir::resolve_application_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "tabtime", version, long_about = None)]
#[command(about = "Time spent per website, split into productive, neutral and distracting")]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long = "retention-days",
        global = true,
        default_value_t = DEFAULT_RETENTION_DAYS,
        help = "Day records older than this are dropped whenever the ledger is written"
    )]
    retention_days: u32,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Show today's split, the top domains and the last 7 days")]
    Stats {
        #[arg(long, default_value_t = DEFAULT_TOP_DOMAINS)]
        top: usize,
    },
    #[command(about = "Show the domains of a single day")]
    Day {
        #[arg(help = "Day to show. Examples are \"yesterday\", \"3 days ago\", \"15/03/2025\", \"2025-03-15\"")]
        date: Option<String>,
        #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
        date_style: DateStyle,
    },
    #[command(about = "Add time spent on a page to today's statistics")]
    Record {
        #[arg(long)]
        domain: String,
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, allow_negative_numbers = true)]
        seconds: i64,
    },
    #[command(about = "Inspect and edit category overrides")]
    Categorize {
        #[command(subcommand)]
        command: CategorizeCommand,
    },
    #[command(about = "Clear recorded time. Category overrides are kept unless asked otherwise")]
    Reset {
        #[arg(long, conflicts_with = "all", help = "Only clear category overrides")]
        categories: bool,
        #[arg(long, help = "Clear recorded time and category overrides")]
        all: bool,
    },
    #[command(about = "Drop day records older than the given number of days")]
    Prune {
        #[arg(long, default_value_t = DEFAULT_RETENTION_DAYS)]
        days: u32,
    },
    #[command(about = "Write the statistics and the raw ledger as JSON")]
    Export {
        #[arg(long, short, help = "Output file. Prints to stdout when missing")]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_TOP_DOMAINS)]
        top: usize,
    },
    #[command(
        about = "Run the message host in the current console. Reads one message per line unless told otherwise"
    )]
    Host {
        #[arg(long = "prune-interval-secs", default_value_t = DEFAULT_PRUNE_INTERVAL.as_secs())]
        prune_interval_secs: u64,
        #[arg(long, default_value_t = DEFAULT_TOP_DOMAINS)]
        top: usize,
        #[arg(long, default_value_t = Framing::Lines)]
        framing: Framing,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();
    let dir = resolve_application_path(args.dir.clone())?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &dir.join("logs"), logging_level, args.log)?;

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    match args.commands {
        Commands::Stats { top } => {
            let ledger = read_ledger(&dir, clock.as_ref()).await?;
            let stats = time_stats(&ledger, clock.today(), top);
            println!("{}", output::render_stats(&stats));
            Ok(())
        }
        Commands::Day { date, date_style } => {
            let date = parse_day(date.as_deref(), date_style, Local::now())?;
            let ledger = read_ledger(&dir, clock.as_ref()).await?;
            println!("{}", output::render_day(&ledger, date));
            Ok(())
        }
        Commands::Record {
            domain,
            url,
            title,
            seconds,
        } => {
            let mut ledger = open_ledger(&dir, clock, args.retention_days).await?;
            ledger
                .record_visit(VisitEvent {
                    url,
                    domain,
                    title,
                    time_spent: seconds,
                    timestamp: None,
                })
                .await?;
            Ok(())
        }
        Commands::Categorize { command } => {
            let ledger = open_ledger(&dir, clock, args.retention_days).await?;
            process_categorize_command(command, ledger).await
        }
        Commands::Reset { categories, all } => {
            let scope = match (categories, all) {
                (_, true) => ResetScope::Everything,
                (true, false) => ResetScope::Categories,
                (false, false) => ResetScope::Activity,
            };
            let mut ledger = open_ledger(&dir, clock, args.retention_days).await?;
            ledger.reset(scope).await?;
            Ok(())
        }
        Commands::Prune { days } => {
            // Opening prunes with the global horizon, which must not beat the requested one.
            let mut ledger = open_ledger(&dir, clock, days.max(args.retention_days)).await?;
            let on_open = ledger.pruned_on_open();
            let report = ledger.prune_retention(days).await?;
            println!(
                "Removed {} day records older than {days} days and {} with unreadable dates",
                on_open.expired + report.expired,
                on_open.unreadable + report.unreadable
            );
            Ok(())
        }
        Commands::Export { output, top } => {
            let ledger = read_ledger(&dir, clock.as_ref()).await?;
            let document = export_document(&ledger, clock.today(), clock.time(), top);
            let contents = serde_json::to_vec_pretty(&document)?;
            match output {
                Some(path) => write_atomically(&path, &contents).await?,
                None => println!("{}", String::from_utf8(contents)?),
            }
            Ok(())
        }
        Commands::Host {
            prune_interval_secs,
            top,
            framing,
        } => {
            let config = TrackerConfig {
                retention_days: args.retention_days,
                prune_interval: std::time::Duration::from_secs(prune_interval_secs.max(1)),
                top_domains: top,
            };
            start_host(dir, config, framing).await
        }
    }
}

/// Loads the ledger for display without writing anything back. Legacy keys are merged in memory
/// only.
async fn read_ledger(dir: &std::path::Path, clock: &dyn Clock) -> Result<Ledger> {
    let mut ledger = JsonFileStorage::new(dir)?.load().await?;
    if migrate(&mut ledger).changed() {
        let overrides = ledger.overrides.clone();
        ledger.reanalyze(overrides, &CategoryClassifier::default(), clock.now_millis());
    }
    Ok(ledger)
}

async fn open_ledger(
    dir: &std::path::Path,
    clock: Arc<dyn Clock>,
    retention_days: u32,
) -> Result<TimeLedger<JsonFileStorage>> {
    Ok(TimeLedger::open(
        JsonFileStorage::new(dir)?,
        CategoryClassifier::default(),
        clock,
        retention_days,
    )
    .await?)
}
