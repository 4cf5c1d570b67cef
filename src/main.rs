// src/main.rs
//! GNSS Diagnostics - live NMEA and cellular signal monitor for the terminal

use anyhow::{bail, Context};
use clap::Parser;
use gnss_diag::{
    display::{JsonLinesObserver, SnapshotObserver, TerminalDisplay},
    logging,
    source::{list_serial_ports, ReplaySource, SerialSource},
    DiagConfig, LocationService, Pipeline, SourceKind,
};
use std::{
    path::PathBuf,
    sync::{atomic::AtomicBool, Arc},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Live GNSS/NMEA diagnostics", long_about = None)]
struct Cli {
    /// Serial port of the NMEA receiver (e.g. /dev/ttyUSB0)
    #[arg(long, conflicts_with = "replay")]
    serial: Option<String>,

    /// Serial baud rate
    #[arg(long)]
    baud: Option<u32>,

    /// Replay recorded NMEA from a file, or `-` for stdin
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Delay between replayed sentences in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long)]
    log_level: Option<String>,

    /// Save the event log to this directory on exit
    #[arg(long)]
    save_log_dir: Option<PathBuf>,

    /// Configuration file (default: ~/.config/gnss-diag/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print one JSON snapshot per publish instead of the terminal display
    #[arg(long, default_value_t = false)]
    json: bool,

    /// List available serial ports and exit
    #[arg(long, default_value_t = false)]
    list_ports: bool,
}

impl Cli {
    fn apply_to(&self, config: &mut DiagConfig) {
        if let Some(port) = &self.serial {
            let baud = self.baud.unwrap_or(config.serial_baudrate);
            config.update_serial(port.clone(), baud);
        } else if let Some(baud) = self.baud {
            config.serial_baudrate = baud;
        }

        if let Some(path) = &self.replay {
            let delay = self.delay_ms.unwrap_or(config.replay_delay_ms);
            config.update_replay(path.clone(), delay);
        } else if let Some(delay) = self.delay_ms {
            config.replay_delay_ms = delay;
        }

        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(dir) = &self.save_log_dir {
            config.log_dir = Some(dir.clone());
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list_ports {
        list_serial_ports()?;
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => DiagConfig::load_from(path)?,
        None => DiagConfig::load().unwrap_or_default(),
    };
    cli.apply_to(&mut config);
    config.validate()?;

    logging::init_logging(&config.log_level)?;

    let mut observers: Vec<Arc<dyn SnapshotObserver>> = Vec::new();
    if cli.json {
        observers.push(Arc::new(JsonLinesObserver::stdout()));
    }

    let mut pipeline = Pipeline::start(&config, observers).context("Failed to start pipeline")?;
    let source = build_source(&config, &pipeline)?;
    pipeline
        .log()
        .info(format!("Using {} source", config.source_type));

    pipeline.attach_location(Some(source.as_ref()), true);
    // No telephony backend on this host; the cellular section reports it unavailable
    pipeline.attach_telephony(None, true);

    let handle = pipeline.runtime_handle();
    let result = if cli.json {
        handle
            .block_on(tokio::signal::ctrl_c())
            .context("Failed to listen for Ctrl+C")
    } else {
        let running = Arc::new(AtomicBool::new(true));
        handle
            .block_on(TerminalDisplay::new().run(pipeline.snapshot(), pipeline.log().clone(), running))
            .context("Terminal display failed")
    };

    pipeline.stop();

    if let Some(dir) = &config.log_dir {
        match pipeline.log().save_to_dir(dir) {
            Ok(path) => println!("Log saved to {}", path.display()),
            Err(e) => eprintln!("Failed to save log: {}", e),
        }
    }

    result
}

fn build_source(config: &DiagConfig, pipeline: &Pipeline) -> anyhow::Result<Box<dyn LocationService>> {
    match config.source_type {
        SourceKind::Serial => {
            let Some(port) = &config.serial_port else {
                bail!("No serial port configured; pass --serial <PORT> or run with --list-ports");
            };
            Ok(Box::new(SerialSource::new(
                port.clone(),
                config.serial_baudrate,
                pipeline.runtime_handle(),
            )))
        }
        SourceKind::Replay => {
            let Some(path) = &config.replay_path else {
                bail!("No replay file configured; pass --replay <FILE>");
            };
            Ok(Box::new(ReplaySource::new(path.clone(), config.replay_delay())))
        }
    }
}
