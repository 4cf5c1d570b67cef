// src/display/terminal.rs
//! Terminal-based display implementation

use crate::{
    error::Result,
    eventlog::EventLog,
    gps::SignalQuality,
    services::TelephonyStatus,
    snapshot::{Snapshot, SnapshotHandle},
};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType, DisableLineWrap, EnableLineWrap},
};
use std::{
    io::{self, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::sleep;

const SATELLITE_ROWS: usize = 16;
const LOG_ROWS: usize = 5;

pub struct TerminalDisplay {
    refresh: Duration,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self {
            refresh: Duration::from_secs(1),
        }
    }

    /// Redraw until `running` is cleared or Ctrl+C is pressed
    pub async fn run(
        &self,
        snapshot: SnapshotHandle,
        log: EventLog,
        running: Arc<AtomicBool>,
    ) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Hide, DisableLineWrap)?;

        let running_clone = Arc::clone(&running);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            }
            running_clone.store(false, Ordering::Release);
        });

        while running.load(Ordering::Acquire) {
            execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
            self.render_display(&mut stdout, &snapshot.read(), &log.recent(LOG_ROWS))?;
            stdout.flush()?;
            sleep(self.refresh).await;
        }

        execute!(stdout, Show, EnableLineWrap)?;
        println!("\nShutting down...");
        Ok(())
    }

    /// Render the snapshot to the terminal
    pub fn render_display(
        &self,
        out: &mut impl Write,
        data: &Snapshot,
        log_lines: &[String],
    ) -> Result<()> {
        execute!(
            out,
            SetForegroundColor(Color::Green),
            Print("=".repeat(60)),
            Print("\nGNSS Diagnostics\n"),
            Print("=".repeat(60)),
            Print("\n"),
            ResetColor
        )?;

        let published = match data.published_at {
            Some(ts) => ts.format("%H:%M:%S").to_string(),
            None => "waiting for data".to_string(),
        };
        execute!(
            out,
            Print(format!(
                "Published: {} (#{})   Location: {}\n\n",
                published, data.sequence, data.location_status
            ))
        )?;

        self.render_position_section(out, data)?;
        self.render_satellite_section(out, data)?;
        self.render_signal_section(out, data)?;
        self.render_log_section(out, data, log_lines)?;

        execute!(
            out,
            SetForegroundColor(Color::Green),
            Print("=".repeat(60)),
            Print("\nPress Ctrl+C to exit\n"),
            ResetColor
        )?;
        Ok(())
    }

    fn render_position_section(&self, out: &mut impl Write, data: &Snapshot) -> Result<()> {
        execute!(
            out,
            SetForegroundColor(Color::Yellow),
            Print("POSITION:\n"),
            ResetColor,
            Print(format!("  Latitude:  {}\n", data.latitude)),
            Print(format!("  Longitude: {}\n", data.longitude)),
            Print(format!("  Altitude:  {}\n", data.altitude)),
            Print(format!("  Speed:     {}\n", data.speed)),
            Print(format!("  HDOP:      {}\n\n", data.hdop))
        )?;
        Ok(())
    }

    fn render_satellite_section(&self, out: &mut impl Write, data: &Snapshot) -> Result<()> {
        execute!(
            out,
            SetForegroundColor(Color::Magenta),
            Print("SATELLITES:\n"),
            ResetColor,
            Print(format!(
                "  Visible: {}   With signal: {}   Used: {}\n",
                data.satellite_count,
                data.satellites_with_signal(),
                data.used_satellites
            ))
        )?;

        if data.satellites.is_empty() {
            execute!(out, Print("  No satellite data\n\n"))?;
            return Ok(());
        }

        execute!(
            out,
            Print(format!(
                "  {:<9} {:>5} {:>9} {:>9} {:>8}\n",
                "System", "PRN", "Elev", "Azim", "SNR"
            ))
        )?;
        for sat in data.satellites_by_snr().into_iter().take(SATELLITE_ROWS) {
            let color = match sat.signal_quality() {
                SignalQuality::Strong => Color::Green,
                SignalQuality::Fair => Color::DarkYellow,
                SignalQuality::Weak => Color::Red,
                SignalQuality::Unknown => Color::DarkGrey,
            };
            execute!(
                out,
                Print(format!(
                    "  {:<9} {:>5} {:>9} {:>9} ",
                    sat.constellation, sat.prn, sat.elevation, sat.azimuth
                )),
                SetForegroundColor(color),
                Print(format!("{:>8}\n", format!("{} dB", sat.snr))),
                ResetColor
            )?;
        }
        execute!(out, Print("\n"))?;
        Ok(())
    }

    fn render_signal_section(&self, out: &mut impl Write, data: &Snapshot) -> Result<()> {
        let dbm = match (&data.telephony_status, data.signal.dbm) {
            (TelephonyStatus::NeedsPermission, _) => "needs permission".to_string(),
            (_, Some(dbm)) => format!("{} dBm", dbm),
            (_, None) => "unknown".to_string(),
        };
        let technology = data
            .signal
            .technology
            .map_or_else(|| "unknown".to_string(), |t| t.to_string());
        let cell = match (data.cell.cell_id, data.cell.lac) {
            (Some(cid), Some(lac)) => format!("CID {} / LAC {}", cid, lac),
            _ => "unknown".to_string(),
        };

        execute!(
            out,
            SetForegroundColor(Color::Cyan),
            Print("CELLULAR:\n"),
            ResetColor,
            Print(format!("  Status:    {}\n", data.telephony_status)),
            Print(format!(
                "  Signal:    {} ({} bars)\n",
                dbm,
                data.signal.level()
            )),
            Print(format!(
                "  Network:   {} {}\n",
                technology,
                data.signal.generation.unwrap_or("")
            )),
            Print(format!(
                "  Operator:  {} (MCC {} / MNC {})\n",
                data.identity.operator_name, data.identity.mcc, data.identity.mnc
            )),
            Print(format!("  Cell:      {}\n\n", cell))
        )?;
        Ok(())
    }

    fn render_log_section(
        &self,
        out: &mut impl Write,
        data: &Snapshot,
        log_lines: &[String],
    ) -> Result<()> {
        execute!(
            out,
            SetForegroundColor(Color::Blue),
            Print("RAW / LOG:\n"),
            ResetColor,
            Print(format!(
                "  {}\n",
                data.last_fix_sentence.as_deref().unwrap_or("No fix sentence yet")
            ))
        )?;
        for line in log_lines {
            execute!(out, Print(format!("  {}\n", line)))?;
        }
        execute!(out, Print("\n"))?;
        Ok(())
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}
