// src/main.rs
//! NMEA Reader - decode NMEA-0183 logs and GPS serial output to JSON

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, info, warn};
use nmea_reader::{config::ReaderConfig, reader, DecodedFix, Decoder, NmeaReader};
use std::{
    io::{self, Write},
    path::PathBuf,
    time::Instant,
};

const DEFAULT_LOG_FILTER: &str = "warn,nmea_reader=info";

#[derive(Debug, Parser)]
#[command(name = "nmea-reader", version, about = "Decode NMEA-0183 sentences to JSON")]
struct Args {
    /// NMEA log file, "-" for stdin (the default)
    file: Option<PathBuf>,

    /// Serial device of a GPS receiver, e.g. /dev/ttyUSB0
    #[arg(short, long, conflicts_with = "file")]
    device: Option<String>,

    /// Baud rate for --device
    #[arg(short, long)]
    baud: Option<u32>,

    /// Reject sentences without a checksum
    #[arg(long)]
    require_checksum: bool,

    /// Pretty-print each decoded sentence
    #[arg(long)]
    pretty: bool,

    /// Config file (default: ~/.config/nmea-reader/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Store the resulting settings in the config file before reading
    #[arg(long)]
    save_config: bool,

    /// More logging; repeat for trace output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn apply(&self, config: &mut ReaderConfig) {
        if let Some(device) = &self.device {
            let baudrate = self.baud.or(config.serial_baudrate).unwrap_or(9600);
            config.update_serial(device.clone(), baudrate);
        } else if let Some(file) = &self.file {
            if file.as_os_str() == "-" {
                config.update_stdin();
            } else {
                config.update_file(file.clone());
            }
        }
        config.require_checksum |= self.require_checksum;
        config.pretty |= self.pretty;
    }
}

fn write_fix(out: &mut impl Write, fix: &DecodedFix, pretty: bool) -> anyhow::Result<()> {
    let json = fix.to_json(pretty)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => ReaderConfig::load_from_path(path),
        None => ReaderConfig::load(),
    };

    let filter = match args.verbose {
        0 => loaded
            .as_ref()
            .ok()
            .and_then(|config| config.log_filter.clone())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        1 => "warn,nmea_reader=debug".to_string(),
        _ => "trace".to_string(),
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(filter)).init();

    if args.list_ports {
        return reader::list_serial_ports().context("listing serial ports");
    }

    let mut config = match loaded {
        Ok(config) => config,
        Err(e) if args.config.is_some() => return Err(e).context("loading config"),
        Err(e) => {
            warn!("{}; using defaults", e);
            ReaderConfig::default()
        }
    };
    args.apply(&mut config);
    debug!("Using config: {:?}", config);

    if args.save_config {
        let saved = match &args.config {
            Some(path) => config.save_to_path(path),
            None => config.save(),
        };
        saved.context("saving config")?;
        info!("Config saved");
    }

    let source = config.source().context("resolving line source")?;
    let decoder = Decoder::new().require_checksum(config.require_checksum);
    let reader = NmeaReader::new(decoder);

    let start = Instant::now();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut write_error = None;

    let stats = reader
        .run(source, |result| {
            if let Ok(fix) = result {
                if let Err(e) = write_fix(&mut out, &fix, config.pretty) {
                    // Typically a closed pipe; nothing more can be written
                    write_error.get_or_insert(e);
                    reader.stop();
                }
            }
        })
        .await
        .context("reading NMEA sentences")?;

    if let Some(e) = write_error {
        return Err(e.context("writing output"));
    }
    out.flush()?;

    let elapsed = start.elapsed().as_secs_f64() * 1000.0;
    info!("Parsed {} sentences in {:.1}ms", stats.decoded, elapsed);
    debug!("{:?}", stats);
    if stats.errors() > 0 {
        info!("{} of {} lines failed to decode", stats.errors(), stats.lines());
    }

    Ok(())
}
