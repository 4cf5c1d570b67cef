// src/config.rs
//! Configuration management

use crate::{
    error::{DiagError, Result},
    trim::TrimPolicy,
};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Serial,
    Replay,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Serial => f.write_str("serial"),
            SourceKind::Replay => f.write_str("replay"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagConfig {
    pub source_type: SourceKind,
    pub serial_port: Option<String>,
    pub serial_baudrate: u32,
    /// File to replay; `-` reads stdin
    pub replay_path: Option<PathBuf>,
    pub replay_delay_ms: u64,

    pub publish_interval_ms: u64,
    pub janitor_interval_secs: u64,
    pub worker_idle_wait_ms: u64,
    /// How long a GGA/RMC echo is kept before the next one is logged
    pub sentence_echo_interval_secs: u64,

    pub registry_trim: TrimPolicy,
    pub display_trim: TrimPolicy,
    pub log_trim: TrimPolicy,

    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for DiagConfig {
    fn default() -> Self {
        Self {
            source_type: SourceKind::Serial,
            serial_port: None,
            serial_baudrate: 9600,
            replay_path: None,
            replay_delay_ms: 0,
            publish_interval_ms: 500,
            janitor_interval_secs: 30,
            worker_idle_wait_ms: 10,
            sentence_echo_interval_secs: 5,
            registry_trim: TrimPolicy::new(100, 80),
            display_trim: TrimPolicy::new(50, 40),
            log_trim: TrimPolicy::new(200, 150),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl DiagConfig {
    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        let path = Self::get_config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DiagError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| DiagError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DiagError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|e| DiagError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| DiagError::Config("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home).join(".config").join("gnss-diag").join("config.json"))
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.publish_interval_ms == 0 || self.janitor_interval_secs == 0 {
            return Err(DiagError::Config("Task intervals must be non-zero".to_string()));
        }
        if self.worker_idle_wait_ms == 0 {
            return Err(DiagError::Config("Worker idle wait must be non-zero".to_string()));
        }
        for (name, policy) in [
            ("registry_trim", &self.registry_trim),
            ("display_trim", &self.display_trim),
            ("log_trim", &self.log_trim),
        ] {
            if !policy.is_valid() {
                return Err(DiagError::Config(format!(
                    "{}: target {} must be below cap {}",
                    name, policy.target, policy.cap
                )));
            }
        }
        Ok(())
    }

    pub fn publish_interval(&self) -> Duration {
        Duration::from_millis(self.publish_interval_ms)
    }

    pub fn janitor_interval(&self) -> Duration {
        Duration::from_secs(self.janitor_interval_secs)
    }

    pub fn worker_idle_wait(&self) -> Duration {
        Duration::from_millis(self.worker_idle_wait_ms)
    }

    pub fn sentence_echo_interval(&self) -> Duration {
        Duration::from_secs(self.sentence_echo_interval_secs)
    }

    pub fn replay_delay(&self) -> Duration {
        Duration::from_millis(self.replay_delay_ms)
    }

    /// Update serial port settings
    pub fn update_serial(&mut self, port: String, baudrate: u32) {
        self.source_type = SourceKind::Serial;
        self.serial_port = Some(port);
        self.serial_baudrate = baudrate;
    }

    /// Update replay settings
    pub fn update_replay(&mut self, path: PathBuf, delay_ms: u64) {
        self.source_type = SourceKind::Replay;
        self.replay_path = Some(path);
        self.replay_delay_ms = delay_ms;
    }
}
