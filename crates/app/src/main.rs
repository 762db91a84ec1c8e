mod cli;
mod render;
mod seed;

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use services::{AnalyticsSettings, AppServices, Clock};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, OutputFormat, ReportArgs, SeedArgs};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid --db value: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }

    Ok(())
}

async fn run_report(services: &AppServices, args: ReportArgs) -> Result<()> {
    let analytics = services.analytics();
    let professor = args.professor.as_ref();

    let (report, overview) = if args.overview {
        let (report, overview) = analytics.report_with_overview(professor).await;
        (report, Some(overview))
    } else {
        (analytics.classroom_report(professor).await, None)
    };

    match args.format {
        OutputFormat::Json => {
            let value = match &overview {
                Some(overview) => serde_json::json!({ "report": report, "overview": overview }),
                None => serde_json::to_value(&report)?,
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            print!("{}", render::report_text(&report));
            if let Some(overview) = &overview {
                println!();
                print!("{}", render::overview_text(overview));
            }
        }
    }
    Ok(())
}

async fn run_seed(services: &AppServices, args: SeedArgs) -> Result<()> {
    let summary = seed::seed_classroom(services.storage(), &args, chrono::Utc::now()).await?;
    println!(
        "seeded {} groups, {} students, {} lessons, {} submissions ({} already present)",
        summary.groups, summary.students, summary.lessons, summary.submissions, summary.skipped
    );
    Ok(())
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let offset = cli
        .utc_offset()
        .ok_or_else(|| anyhow!("invalid utc offset: {} minutes", cli.utc_offset_minutes))?;
    let settings = AnalyticsSettings::default().with_utc_offset(offset);

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&cli.db)?;
    let services = AppServices::new_sqlite(&cli.db, Clock::default_clock(), settings)
        .await
        .with_context(|| format!("opening {}", cli.db))?;

    match cli.command {
        Command::Report(args) => run_report(&services, args).await,
        Command::Seed(args) => run_seed(&services, args).await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}
