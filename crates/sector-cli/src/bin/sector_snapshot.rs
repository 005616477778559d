//! CLI tool to run one sector occupancy cycle.
//!
//! Loads the traffic snapshot and sector boundaries from files or URLs,
//! classifies and projects every aircraft, and prints the summaries.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use sector_cli::render::report_text;
use sector_core::{BandThresholds, ClassifierRules, CycleContext};
use sector_feed::{load_groups, FeedClient, Source};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Print a one-shot sector occupancy snapshot
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Traffic feed JSON (path or http(s) URL)
    #[arg(long, default_value = "https://data.vatsim.net/v3/vatsim-data.json")]
    traffic: String,

    /// Sector GeoJSON (path or http(s) URL)
    #[arg(long)]
    sectors: String,

    /// Custom group file (JSON object of name -> sector ids)
    #[arg(long)]
    groups: Option<PathBuf>,

    /// Perimeter sector designator
    #[arg(long, default_value = "zhu")]
    perimeter: String,

    /// Enroute controller facility prefix
    #[arg(long, default_value = "HOU")]
    controller_prefix: String,

    /// Fetch timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sector_cli=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let feed = FeedClient::new(
        Source::parse(&args.traffic).context("--traffic")?,
        Source::parse(&args.sectors).context("--sectors")?,
        Duration::from_secs(args.timeout),
    )?;

    let groups = match &args.groups {
        Some(path) => Some(load_groups(path).await?),
        None => None,
    };

    let rules = ClassifierRules::default().with_perimeter(args.perimeter.clone());
    let (sectors, traffic) = tokio::try_join!(
        feed.fetch_sectors(&rules.perimeter_designator),
        feed.fetch_traffic()
    )?;
    tracing::info!(
        "Loaded {} sectors and {} aircraft",
        sectors.len(),
        traffic.pilots.len()
    );

    let thresholds = BandThresholds::default();
    let report = CycleContext::new(&sectors, &rules, &thresholds)
        .with_groups(groups.as_ref())
        .with_controller_prefix(&args.controller_prefix)
        .run(&traffic, Utc::now());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report_text(&report));
    }

    Ok(())
}
