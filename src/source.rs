// src/source.rs
//! Concrete sentence sources: serial receivers and recorded logs

use crate::{
    error::{DiagError, Result},
    pipeline::IngestHandle,
    services::{LocationService, Provider},
};
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
    thread,
    time::Duration,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader as AsyncBufReader},
    runtime::Handle,
};
use tokio_serial::SerialPortBuilderExt;

/// NMEA receiver on a serial port, read on the pipeline runtime
pub struct SerialSource {
    port: String,
    baudrate: u32,
    runtime: Handle,
}

impl SerialSource {
    pub fn new(port: impl Into<String>, baudrate: u32, runtime: Handle) -> Self {
        Self {
            port: port.into(),
            baudrate,
            runtime,
        }
    }
}

impl LocationService for SerialSource {
    fn is_provider_enabled(&self, provider: Provider) -> Result<bool> {
        Ok(provider == Provider::Gps)
    }

    fn register_nmea_listener(&self, ingest: IngestHandle) -> Result<()> {
        tracing::info!("Connecting to GPS on {} at {} baud...", self.port, self.baudrate);

        // The async port registers with the reactor of the runtime it is opened on
        let _guard = self.runtime.enter();
        let serial = tokio_serial::new(&self.port, self.baudrate)
            .timeout(Duration::from_millis(1000))
            .open_native_async()
            .map_err(|e| {
                DiagError::Connection(format!("Failed to open serial port {}: {}", self.port, e))
            })?;

        let port = self.port.clone();
        self.runtime.spawn(async move {
            let mut reader = AsyncBufReader::new(serial);
            let mut buf = Vec::new();

            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => {
                        ingest.report_end(format!("serial port {} closed", port));
                        break;
                    }
                    Ok(_) => {
                        if let Some(sentence) = decode_line(&buf) {
                            if !ingest.offer(sentence) {
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!("Error reading from serial port {}: {}", port, e);
                        ingest.report_failure(format!("serial port {}: {}", port, e));
                        break;
                    }
                }
            }
        });

        Ok(())
    }
}

/// Replays recorded NMEA lines from a file, or stdin for `-`
pub struct ReplaySource {
    path: PathBuf,
    delay: Duration,
}

impl ReplaySource {
    pub fn new(path: impl Into<PathBuf>, delay: Duration) -> Self {
        Self {
            path: path.into(),
            delay,
        }
    }

    fn is_stdin(&self) -> bool {
        self.path.as_os_str() == "-"
    }

    fn open(&self) -> Result<Box<dyn BufRead + Send>> {
        if self.is_stdin() {
            return Ok(Box::new(BufReader::new(io::stdin())));
        }
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => DiagError::PermissionDenied(format!(
                "{}: {}",
                self.path.display(),
                e
            )),
            _ => DiagError::Unavailable(format!("{}: {}", self.path.display(), e)),
        })?;
        Ok(Box::new(BufReader::new(file)))
    }
}

impl LocationService for ReplaySource {
    fn is_provider_enabled(&self, provider: Provider) -> Result<bool> {
        Ok(provider == Provider::Gps && (self.is_stdin() || self.path.is_file()))
    }

    fn register_nmea_listener(&self, ingest: IngestHandle) -> Result<()> {
        let reader = self.open()?;
        let delay = self.delay;
        let name = self.path.display().to_string();

        thread::Builder::new()
            .name("nmea-replay".to_string())
            .spawn(move || replay_lines(reader, &ingest, delay, &name))?;
        Ok(())
    }
}

fn replay_lines(
    mut reader: Box<dyn BufRead + Send>,
    ingest: &IngestHandle,
    delay: Duration,
    name: &str,
) {
    let mut delivered = 0usize;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Error reading {}: {}", name, e);
                ingest.report_failure(format!("{}: {}", name, e));
                return;
            }
        }
        let Some(sentence) = decode_line(&buf) else {
            continue;
        };
        if !ingest.offer(sentence) {
            return;
        }
        delivered += 1;
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    ingest.report_end(format!("{} finished after {} sentences", name, delivered));
}

/// Trim one raw line; invalid UTF-8 is replaced so the parser drops only that line
fn decode_line(raw: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(raw);
    let sentence = line.trim();
    (!sentence.is_empty()).then(|| sentence.to_string())
}

/// List available serial ports
pub fn list_serial_ports() -> Result<()> {
    let ports = tokio_serial::available_ports()
        .map_err(|e| DiagError::Other(format!("Failed to list serial ports: {}", e)))?;

    if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        println!("Available serial ports:");
        for port in ports {
            println!("  {} - {:?}", port.port_name, port.port_type);
        }
    }

    Ok(())
}
