// src/lib.rs
//! NMEA Reader Library
//!
//! A streaming NMEA-0183 decoder: frames each line, checks its checksum and
//! decodes GGA, RMC, GSA, GSV and TXT sentences into typed records.

pub mod config;
pub mod error;
pub mod nmea;
pub mod reader;

// Re-export main types for convenience
pub use error::{DecodeError, NmeaError, Result};
pub use nmea::{decode_line, decode_stream, DecodedFix, Decoder, RawSentence, Sentence};
pub use reader::{DecodeStats, NmeaReader, NmeaSource};
