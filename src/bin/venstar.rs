//! Command-line tool for Venstar thermostats
//!
//! Without `--zone`, lists the zone names found on the network. With
//! `--zone`, applies the given heat and/or cool thresholds to the matching
//! thermostat and prints its temperatures.

use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use venstar::{DeviceDescriptor, Discovery, Thermostat};

#[derive(Parser, Debug)]
#[command(name = "venstar")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Thermostat zone to control (case-insensitive)
    #[arg(short, long)]
    zone: Option<String>,

    /// Threshold temperature for heating
    #[arg(long)]
    heat: Option<f64>,

    /// Threshold temperature for cooling
    #[arg(long)]
    cool: Option<f64>,

    /// Seconds to wait for discovery responses
    #[arg(short, long, default_value = "2")]
    timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {e}");
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> venstar::Result<()> {
    let mut found = Discovery::new()
        .timeout(Duration::from_secs(args.timeout))
        .start()
        .await?;

    let Some(zone) = args.zone else {
        println!("Known thermostat zones:");
        while let Some(device) = found.recv().await {
            println!("   {}", device.name);
        }
        return Ok(());
    };

    let zone = zone.to_lowercase();
    while let Some(device) = found.recv().await {
        if device.name.to_lowercase() != zone {
            continue;
        }
        return control(&device, args.heat, args.cool).await;
    }

    tracing::warn!("No thermostat named {:?} responded", zone);
    Ok(())
}

async fn control(device: &DeviceDescriptor, heat: Option<f64>, cool: Option<f64>) -> venstar::Result<()> {
    let thermostat: Thermostat = device.connect();

    match (heat, cool) {
        (Some(heat), Some(cool)) => thermostat.set_heat_cool_temps(heat, cool).await?,
        (Some(heat), None) => thermostat.set_heat_temp(heat).await?,
        (None, Some(cool)) => thermostat.set_cool_temp(cool).await?,
        (None, None) => {}
    }

    let info = thermostat.info().await?;
    println!("Current Temp: {}", info.space_temp);
    println!("Heat Temp: {}", info.heat_temp);
    println!("Cool Temp: {}", info.cool_temp);
    Ok(())
}
