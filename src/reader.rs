// src/reader.rs
//! Line sources feeding the decoder

use crate::{
    error::{DecodeError, NmeaError, Result},
    nmea::{DecodedFix, Decoder},
};
use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use log::{debug, info, warn};
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::io::{AsyncBufReadExt, BufReader as AsyncBufReader};
use tokio_serial::SerialPortBuilderExt;
use xz2::read::XzDecoder;

/// Where NMEA lines come from
#[derive(Debug, Clone, PartialEq)]
pub enum NmeaSource {
    Stdin,
    File(PathBuf),
    Serial { port: String, baudrate: u32 },
}

/// Per-outcome counters for a decoding run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub decoded: usize,
    pub unknown: usize,
    pub framing_errors: usize,
    pub checksum_errors: usize,
    pub field_errors: usize,
}

impl DecodeStats {
    pub fn record(&mut self, result: &std::result::Result<DecodedFix, DecodeError>) {
        match result {
            Ok(_) => self.decoded += 1,
            Err(DecodeError::UnknownSentence(_)) => self.unknown += 1,
            Err(DecodeError::Framing(_)) => self.framing_errors += 1,
            Err(DecodeError::Checksum { .. }) => self.checksum_errors += 1,
            Err(DecodeError::FieldParse { .. }) => self.field_errors += 1,
        }
    }

    /// Non-blank lines seen
    pub fn lines(&self) -> usize {
        self.decoded + self.unknown + self.framing_errors + self.checksum_errors + self.field_errors
    }

    pub fn errors(&self) -> usize {
        self.framing_errors + self.checksum_errors + self.field_errors
    }
}

/// Drives a decoder over a line source until it ends or is stopped
pub struct NmeaReader {
    decoder: Decoder,
    running: Arc<AtomicBool>,
}

impl NmeaReader {
    pub fn new(decoder: Decoder) -> Self {
        Self {
            decoder,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Create a reader sharing an externally owned running flag
    pub fn new_with_shared(decoder: Decoder, running: Arc<AtomicBool>) -> Self {
        Self { decoder, running }
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Read every line from a source, handing each result to `sink`
    pub async fn run<F>(&self, source: NmeaSource, sink: F) -> Result<DecodeStats>
    where
        F: FnMut(std::result::Result<DecodedFix, DecodeError>),
    {
        match source {
            NmeaSource::Stdin => {
                debug!("Reading lines from stdin");
                let stdin = io::stdin();
                self.run_blocking(read_lines(stdin.lock()), sink)
            }
            NmeaSource::File(path) => {
                debug!("Reading lines from: {}", path.display());
                let reader = open_log(&path)?;
                self.run_blocking(read_lines(reader), sink)
            }
            NmeaSource::Serial { port, baudrate } => self.run_serial(&port, baudrate, sink).await,
        }
    }

    /// Decode an in-memory or blocking line iterator
    pub fn run_blocking<I, F>(&self, lines: I, mut sink: F) -> Result<DecodeStats>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        F: FnMut(std::result::Result<DecodedFix, DecodeError>),
    {
        let mut lines = lines.into_iter();
        // The flag is checked before each pull so a stopped reader never
        // blocks on the source again
        let lines = std::iter::from_fn(move || {
            if self.is_running() {
                lines.next()
            } else {
                None
            }
        });

        let mut stats = DecodeStats::default();
        for result in self.decoder.decode_stream(lines) {
            log_result(&result);
            stats.record(&result);
            sink(result);
        }
        Ok(stats)
    }

    /// Read from a GPS receiver on a serial port until EOF or Ctrl+C
    pub async fn run_serial<F>(&self, port: &str, baudrate: u32, mut sink: F) -> Result<DecodeStats>
    where
        F: FnMut(std::result::Result<DecodedFix, DecodeError>),
    {
        info!("Connecting to GPS on {} at {} baud...", port, baudrate);

        let serial = tokio_serial::new(port, baudrate)
            .timeout(Duration::from_millis(1000))
            .open_native_async()
            .map_err(|e| NmeaError::Connection(format!("Failed to open serial port {}: {}", port, e)))?;

        info!("Connected successfully!");

        let mut lines = AsyncBufReader::new(serial).lines();
        let mut stats = DecodeStats::default();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        while self.is_running() {
            let line = tokio::select! {
                line = lines.next_line() => line,
                _ = &mut ctrl_c => {
                    debug!("Interrupted, stopping serial reader");
                    self.stop();
                    break;
                }
            };

            match line {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let result = self.decoder.decode_line(&line);
                    log_result(&result);
                    stats.record(&result);
                    sink(result);
                }
                Ok(None) => break, // EOF
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    // Line noise that is not valid UTF-8
                    stats.framing_errors += 1;
                    warn!("Skipping undecodable line from serial port: {}", e);
                }
                Err(e) => {
                    warn!("Error reading from serial port {}: {}", port, e);
                    return Err(e.into());
                }
            }
        }

        Ok(stats)
    }

    /// Stop reading after the current line
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

impl Default for NmeaReader {
    fn default() -> Self {
        Self::new(Decoder::new())
    }
}

/// Open a log file, decompressing `.gz`, `.bz2` and `.xz` files by extension
fn open_log(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .map_err(|e| io::Error::new(e.kind(), format!("Failed to open {}: {}", path.display(), e)))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    Ok(match extension.as_deref() {
        Some("gz") => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        Some("bz2") => Box::new(BufReader::new(MultiBzDecoder::new(file))),
        Some("xz") => Box::new(BufReader::new(XzDecoder::new_multi_decoder(file))),
        _ => Box::new(BufReader::new(file)),
    })
}

/// Lines of a blocking reader; stops at the first read error.
fn read_lines<R: BufRead>(reader: R) -> impl Iterator<Item = String> {
    let mut count = 0usize;
    reader.lines().map_while(move |line| match line {
        Ok(line) => {
            count += 1;
            Some(line)
        }
        Err(e) => {
            warn!("Stopped reading after {} lines: {}", count, e);
            None
        }
    })
}

fn log_result(result: &std::result::Result<DecodedFix, DecodeError>) {
    match result {
        Ok(fix) => debug!("Decoded {}{}", fix.talker_id, fix.sentence_id()),
        Err(e @ DecodeError::UnknownSentence(_)) => debug!("{}", e),
        Err(e) => warn!("{}", e),
    }
}

/// List available serial ports
pub fn list_serial_ports() -> Result<()> {
    let ports = tokio_serial::available_ports()?;

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
