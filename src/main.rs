mod config;
mod geo;
mod rotator;
mod sbs;
mod tracking;
mod tracks;

use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use tokio::sync::{mpsc, oneshot};

use crate::config::Config;
use crate::rotator::{Rotator, SoftwareMotor};
use crate::tracking::{ConsolePresenter, Indicator, LogLed, Tracking, TrackingSettings};
use crate::tracks::TrackStore;

#[derive(Parser)]
#[command(name = "airtrack")]
#[command(about = "Nearest-aircraft tracking rotator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    Validate { config: String },
    /// Track aircraft from the configured SBS feed
    Run { config: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Run { config } => run(&config).await,
    }
}

fn load(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Error reading config: {}", e);
            None
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let Some(config) = load(path) else {
        return ExitCode::FAILURE;
    };

    let reference = match config.station.reference_point() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Config is valid");
    println!(
        "  station: {} at {:.4}, {:.4} ({:.0} m)",
        config.station.name.as_deref().unwrap_or("unnamed"),
        reference.latitude_deg,
        reference.longitude_deg,
        reference.altitude_m
    );
    println!("  feed: {}:{}", config.feed.host, config.feed.port);
    println!(
        "  rotator: {} steps/rev, {} microstepping",
        config.rotator.steps_per_revolution, config.rotator.microstepping
    );
    println!(
        "  tracking: tick {}, acquire {}, update {}",
        humantime::format_duration(config.tracking.tick_interval),
        humantime::format_duration(config.tracking.acquire_duration),
        humantime::format_duration(config.tracking.update_duration)
    );
    ExitCode::SUCCESS
}

async fn run(path: &str) -> ExitCode {
    let Some(config) = load(path) else {
        return ExitCode::FAILURE;
    };
    let reference = match config.station.reference_point() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    log::info!(
        "Tracking from {:.4}, {:.4} ({:.0} m)",
        reference.latitude_deg,
        reference.longitude_deg,
        reference.altitude_m
    );

    let store = TrackStore::new();

    // Feed -> decoder -> track table.
    let (line_tx, line_rx) = mpsc::channel(256);
    let feed_host = config.feed.host.clone();
    let feed_port = config.feed.port;
    tokio::spawn(async move {
        if let Err(e) = sbs::run_feed(&feed_host, feed_port, line_tx).await {
            log::error!("SBS feed failed: {}", e);
        }
    });
    tokio::spawn(tracks::run_ingest(store.clone(), line_rx));

    let (sweep_stop_tx, sweep_stop_rx) = oneshot::channel();
    let sweep = tokio::spawn(tracks::run_sweep(
        store.clone(),
        config.tracks.inactivity_timeout,
        sweep_stop_rx,
    ));

    let mut rotator = Rotator::new(
        config.rotator.steps_per_revolution,
        Arc::new(Mutex::new(SoftwareMotor::new("azimuth"))),
        Arc::new(Mutex::new(SoftwareMotor::new("elevation"))),
    );
    rotator.initialize();
    rotator.set_microstepping(config.rotator.microstepping);

    let indicator = Indicator::spawn(Arc::new(Mutex::new(LogLed)));
    let presenter = ConsolePresenter::new(indicator);

    let settings = TrackingSettings {
        reference,
        tick_interval: config.tracking.tick_interval,
        acquire_duration: config.tracking.acquire_duration,
        update_duration: config.tracking.update_duration,
    };
    let mut tracking = Tracking::start(settings, store, rotator, Box::new(presenter));

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
    log::info!("Shutting down");

    tracking.stop().await;
    let _ = sweep_stop_tx.send(());
    let _ = sweep.await;

    ExitCode::SUCCESS
}
