//! Core application runner for `hygrothermograph-bridge`.
//!
//! This module is decoupled from CLI parsing and process exit codes so it can
//! be tested deterministically with an injected source, clock and output.

use crate::accessory::Hygrothermograph;
use crate::battery::DEFAULT_LOW_BATTERY_THRESHOLD;
use crate::clock::Clock;
use crate::config::{Config, ConfigError, DEFAULT_NAME, DEFAULT_TIMEOUT_MINUTES};
use crate::output::influxdb::InfluxDbFormatter;
use crate::output::{OutputFormatter, Report};
use crate::source::RecordSource;
use crate::state::Capabilities;
use crate::throttle::Throttle;
use clap::Parser;
use log::{debug, info};
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, Interval, interval_at};

/// Configuration for the core run loop.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// JSON accessory config (homebridge format). Replaces the accessory flags below.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Accessory display name
    #[arg(long, default_value = DEFAULT_NAME)]
    pub name: String,

    /// Minutes without updates before readings are reported unavailable; 0 disables
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MINUTES, value_name = "MINUTES")]
    pub timeout: f64,

    /// Added to every temperature reading (Celsius)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub temperature_offset: f64,

    /// Added to every humidity reading (percent)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub humidity_offset: f64,

    /// Battery level at or below which the battery is reported low
    #[arg(long, default_value_t = DEFAULT_LOW_BATTERY_THRESHOLD, value_name = "PERCENT")]
    pub low_battery: f64,

    /// The sensor has no humidity output
    #[arg(long)]
    pub no_humidity: bool,

    /// Do not expose a battery service
    #[arg(long)]
    pub no_battery: bool,

    /// The name of the measurement in InfluxDB line protocol.
    #[arg(long, default_value = "hygrothermograph")]
    pub influxdb_measurement: String,

    /// Write at most one update-driven report per interval.
    /// Accepts duration with suffix: 3s, 1m, 500ms, 2h.
    /// Without suffix, value is interpreted as seconds.
    #[arg(long, value_parser = crate::throttle::parse_duration)]
    pub throttle: Option<Duration>,

    /// Additionally query the accessory and write a report every interval.
    #[arg(long, value_parser = crate::throttle::parse_duration)]
    pub poll: Option<Duration>,

    /// Verbose output, log every record
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            config: None,
            name: DEFAULT_NAME.to_string(),
            timeout: DEFAULT_TIMEOUT_MINUTES,
            temperature_offset: 0.0,
            humidity_offset: 0.0,
            low_battery: DEFAULT_LOW_BATTERY_THRESHOLD,
            no_humidity: false,
            no_battery: false,
            influxdb_measurement: "hygrothermograph".to_string(),
            throttle: None,
            poll: None,
            verbose: false,
        }
    }
}

impl Options {
    /// Accessory configuration from `--config`, or from the individual flags.
    pub fn accessory_config(&self) -> Result<Config, ConfigError> {
        if let Some(path) = &self.config {
            return Config::from_file(path);
        }

        let config = Config {
            name: self.name.clone(),
            timeout_minutes: self.timeout,
            temperature_offset: self.temperature_offset,
            humidity_offset: self.humidity_offset,
            low_battery: self.low_battery,
            capabilities: Capabilities {
                humidity: !self.no_humidity,
                battery: !self.no_battery,
            },
            ..Config::default()
        };
        config.validate()?;
        Ok(config)
    }
}

/// Errors returned by the core run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn write_report<C: Clock>(
    formatter: &dyn OutputFormatter,
    accessory: &Hygrothermograph<C>,
    address: Option<&str>,
    out: &mut dyn Write,
) -> io::Result<()> {
    let report = Report::read(accessory, address);
    if report.is_empty() {
        debug!("{}: nothing to report", report.name);
        return Ok(());
    }
    writeln!(out, "{}", formatter.format(&report))
}

async fn next_tick(poll: &mut Option<Interval>) {
    match poll {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Run the core processing loop, writing reports to `out`.
///
/// - Each record that changes the accessory state produces a report, subject to throttling.
/// - With `options.poll`, a report is also written every interval; stale or missing
///   values are left out, and a report with nothing available is skipped.
/// - Malformed records are logged and skipped. The loop ends when the source closes.
pub async fn run_with_io<C: Clock>(
    options: Options,
    source: &dyn RecordSource,
    clock: C,
    out: &mut dyn Write,
) -> Result<(), RunError> {
    let config = options.accessory_config()?;
    let accessory = Hygrothermograph::new(config, clock)?;
    let formatter = InfluxDbFormatter::new(options.influxdb_measurement);

    let mut throttle = options.throttle.map(Throttle::new);
    let mut poll = options
        .poll
        .filter(|period| !period.is_zero())
        .map(|period| interval_at(Instant::now() + period, period));

    // Address of the latest record, normalized when it parses as a MAC address
    let mut address: Option<String> = None;

    let mut lines = source.open();
    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    break;
                };
                let Ok(ingested) = accessory.ingest_line(&line?) else {
                    continue;
                };
                address = Some(
                    ingested
                        .record
                        .mac()
                        .map_or(ingested.record.address, |mac| mac.to_string()),
                );

                let should_emit = !ingested.notifications.is_empty()
                    && throttle.as_mut().is_none_or(|t: &mut Throttle| t.should_emit());
                if should_emit {
                    write_report(&formatter, &accessory, address.as_deref(), out)?;
                }
            }
            _ = next_tick(&mut poll) => {
                write_report(&formatter, &accessory, address.as_deref(), out)?;
            }
        }
    }

    info!("{}: producer output ended", accessory.config().name);
    Ok(())
}
