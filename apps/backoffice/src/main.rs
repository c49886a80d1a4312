//! # Salon Backoffice CLI
//!
//! Operator commands against the back office database.
//!
//! ## Usage
//! ```bash
//! salon-backoffice                      # status (default)
//! salon-backoffice audit                # consistency scan, exit 1 on discrepancies
//! salon-backoffice summary --from 2024-03-01 --to 2024-03-31
//! salon-backoffice --config ./backoffice.toml status
//! ```
//!
//! Logging follows `RUST_LOG`, falling back to `log_level` from the config.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::info;
use tracing_subscriber::EnvFilter;

use salon_backoffice::{Backoffice, BackofficeConfig};

enum Command {
    Status,
    Audit,
    Summary {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

struct Args {
    config: Option<PathBuf>,
    command: Command,
}

const USAGE: &str = "\
Salon Back Office

Usage: salon-backoffice [--config <PATH>] [COMMAND]

Commands:
  status                          Database and shift overview (default)
  audit                           Check stored balances against their definitions
  summary [--from DATE] [--to DATE]
                                  Sales summary, dates as YYYY-MM-DD

Options:
  -c, --config <PATH>   Config file (default: ./backoffice.toml)
  -h, --help            Show this help message";

fn parse_date(flag: &str, value: Option<&String>) -> anyhow::Result<NaiveDate> {
    let value = value.with_context(|| format!("{} needs a date", flag))?;
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("{} expects YYYY-MM-DD, got '{}'", flag, value))
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut config = None;
    let mut command = None;
    let mut from = None;
    let mut to = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                let path = args.get(i + 1).context("--config needs a path")?;
                config = Some(PathBuf::from(path));
                i += 1;
            }
            "--from" => {
                from = Some(parse_date("--from", args.get(i + 1))?);
                i += 1;
            }
            "--to" => {
                to = Some(parse_date("--to", args.get(i + 1))?);
                i += 1;
            }
            "--help" | "-h" => return Ok(None),
            "status" => command = Some(Command::Status),
            "audit" => command = Some(Command::Audit),
            "summary" => command = Some(Command::Summary { from: None, to: None }),
            other => bail!("unknown argument '{}'\n\n{}", other, USAGE),
        }
        i += 1;
    }

    let command = match command.unwrap_or(Command::Status) {
        Command::Summary { .. } => Command::Summary { from, to },
        other => other,
    };

    Ok(Some(Args { config, command }))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    // Inclusive bound: the last representable instant of the day.
    match date.succ_opt() {
        Some(next) => start_of_day(next) - chrono::Duration::nanoseconds(1),
        None => start_of_day(date),
    }
}

async fn status(app: &Backoffice) -> anyhow::Result<ExitCode> {
    let migrations = app.database().migration_status().await?;
    let suppliers = app.suppliers().list().await?;
    let customers = app.customers().list().await?;
    let open_shift = app.shifts().current().await?;

    println!(
        "migrations: {}/{} applied",
        migrations.applied, migrations.total
    );
    println!("suppliers:  {}", suppliers.len());
    println!(
        "owed to suppliers: {}",
        suppliers
            .iter()
            .map(|s| s.balance())
            .sum::<salon_core::Money>()
    );
    println!("customers:  {}", customers.len());
    match open_shift {
        Some(shift) => println!(
            "open shift: {} since {} (sales {})",
            shift.cashier,
            shift.start_time,
            shift.ledger().total_sales
        ),
        None => println!("open shift: none"),
    }

    Ok(ExitCode::SUCCESS)
}

async fn audit(app: &Backoffice) -> anyhow::Result<ExitCode> {
    let report = app.audit().run().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

async fn summary(
    app: &Backoffice,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> anyhow::Result<ExitCode> {
    let summary = app
        .sales()
        .summary(from.map(start_of_day), to.map(end_of_day))
        .await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let Some(args) = parse_args()? else {
        println!("{}", USAGE);
        return Ok(ExitCode::SUCCESS);
    };

    let config = match &args.config {
        Some(path) => BackofficeConfig::load_from(path),
        None => BackofficeConfig::load(),
    }
    .context("loading configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", config.log_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        database = %config.database_path.display(),
        max_connections = config.max_connections,
        "Configuration loaded"
    );

    let app = Backoffice::connect(&config)
        .await
        .context("opening the database")?;

    let code = match args.command {
        Command::Status => status(&app).await?,
        Command::Audit => audit(&app).await?,
        Command::Summary { from, to } => summary(&app, from, to).await?,
    };

    app.database().close().await;
    Ok(code)
}
