// src/config.rs
//! Configuration management

use crate::error::{NmeaError, Result};
use crate::reader::NmeaSource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub source_type: String, // "stdin", "file", "serial"
    pub file: Option<PathBuf>,
    pub serial_port: Option<String>,
    pub serial_baudrate: Option<u32>,
    pub require_checksum: bool,
    pub pretty: bool,
    pub log_filter: Option<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            source_type: "stdin".to_string(),
            file: None,
            serial_port: None,
            serial_baudrate: Some(9600),
            require_checksum: false,
            pretty: false,
            log_filter: None,
        }
    }
}

impl ReaderConfig {
    /// Load from the user config file, or defaults if there is none
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| NmeaError::Config(format!("Failed to read config file {}: {}", path.display(), e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| NmeaError::Config(format!("Failed to parse config file {}: {}", path.display(), e)))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::get_config_path()?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| NmeaError::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        std::fs::write(path, contents)
            .map_err(|e| NmeaError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// `$HOME/.config/nmea-reader/config.json`
    pub fn get_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| NmeaError::Config("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home).join(".config").join("nmea-reader").join("config.json"))
    }

    /// Update file source settings
    pub fn update_file(&mut self, path: PathBuf) {
        self.source_type = "file".to_string();
        self.file = Some(path);
    }

    /// Update serial port settings
    pub fn update_serial(&mut self, port: String, baudrate: u32) {
        self.source_type = "serial".to_string();
        self.serial_port = Some(port);
        self.serial_baudrate = Some(baudrate);
    }

    pub fn update_stdin(&mut self) {
        self.source_type = "stdin".to_string();
        self.file = None;
    }

    /// Resolve the configured line source
    pub fn source(&self) -> Result<NmeaSource> {
        match self.source_type.as_str() {
            "stdin" => Ok(NmeaSource::Stdin),
            "file" => self
                .file
                .clone()
                .map(NmeaSource::File)
                .ok_or_else(|| NmeaError::Config("file source selected but no file given".to_string())),
            "serial" => {
                let port = self.serial_port.clone().ok_or_else(|| {
                    NmeaError::Config("serial source selected but no port given".to_string())
                })?;
                Ok(NmeaSource::Serial {
                    port,
                    baudrate: self.serial_baudrate.unwrap_or(9600),
                })
            }
            other => Err(NmeaError::Config(format!("unknown source type: {:?}", other))),
        }
    }
}
