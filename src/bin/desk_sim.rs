// Runs the check-in desk simulation over a flight feed and a passenger feed.
//
// Usage: desk-sim <flights.csv> <passengers.csv> [report.txt]
//
// Set `DESK_SIM_CONFIG` to a JSON file to override the simulation defaults.

use std::{env, sync::Arc};

use anyhow::{bail, Context};
use checkin_desks::{
    feed, CheckInCoordinator, DeskSimulation, FileReportSink, PassengerRegistry, SimulationConfig,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkin_desks=info,desk_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 {
        bail!("usage: desk-sim <flights.csv> <passengers.csv> [report.txt]");
    }
    let report_path = args.get(2).map(String::as_str).unwrap_or("report.txt");

    let config = match env::var("DESK_SIM_CONFIG") {
        Ok(path) => SimulationConfig::from_file(&path)
            .with_context(|| format!("loading simulation config from {path}"))?,
        Err(_) => SimulationConfig::default(),
    };

    let catalog = Arc::new(
        feed::load_flights(&args[0]).with_context(|| format!("loading flights from {}", args[0]))?,
    );
    let registry = Arc::new(PassengerRegistry::new());
    let load = feed::load_passengers(&args[1], &catalog, &registry)
        .with_context(|| format!("loading passengers from {}", args[1]))?;

    if !load.duplicates().is_empty() {
        warn!(duplicates = ?load.duplicates(), "duplicate booking references in passenger feed");
    }

    let coordinator = CheckInCoordinator::new(catalog, registry)
        .with_report_sink(Arc::new(FileReportSink::new(report_path)));
    let simulation = DeskSimulation::new(coordinator, config)?;

    let summary = simulation.run().await;
    info!(
        checked_in = summary.checked_in,
        unqueued = summary.unqueued,
        report = report_path,
        "done"
    );
    println!("{}", summary.report);

    Ok(())
}
