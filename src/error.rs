// src/error.rs
//! Error types for the NMEA reader

use crate::nmea::sentence::RawSentence;
use std::fmt;

pub type Result<T> = std::result::Result<T, NmeaError>;

/// Why a single line failed to decode.
///
/// All variants are local to one line; a stream of lines keeps going after
/// any of them.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Missing `$`/`!` marker, repeated `*` or a malformed address field
    Framing(String),
    /// Checksum absent when required, or not matching the computed XOR
    Checksum {
        expected: Option<String>,
        calculated: u8,
    },
    /// No decoder registered for the sentence id; the raw sentence is kept
    UnknownSentence(RawSentence),
    /// A required field is missing or has the wrong type
    FieldParse { index: usize, message: String },
}

impl DecodeError {
    pub fn field(index: usize, message: impl Into<String>) -> Self {
        DecodeError::FieldParse {
            index,
            message: message.into(),
        }
    }

    /// The raw sentence of an unrecognized line, if that is what failed
    pub fn raw_sentence(&self) -> Option<&RawSentence> {
        match self {
            DecodeError::UnknownSentence(raw) => Some(raw),
            _ => None,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Framing(msg) => write!(f, "Framing error: {}", msg),
            DecodeError::Checksum {
                expected: Some(expected),
                calculated,
            } => write!(
                f,
                "Checksum error: sentence has 0x{} but calculated 0x{:02X}",
                expected, calculated
            ),
            DecodeError::Checksum {
                expected: None,
                calculated,
            } => write!(
                f,
                "Checksum error: sentence has no checksum (calculated 0x{:02X})",
                calculated
            ),
            DecodeError::UnknownSentence(raw) => {
                write!(f, "Unknown NMEA sentence: {}{}", raw.talker_id, raw.sentence_id)
            }
            DecodeError::FieldParse { index, message } => {
                write!(f, "Field {} parse error: {}", index, message)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

#[derive(Debug)]
pub enum NmeaError {
    Io(std::io::Error),
    Serial(tokio_serial::Error),
    Json(serde_json::Error),
    Connection(String),
    Config(String),
}

impl fmt::Display for NmeaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NmeaError::Io(e) => write!(f, "IO error: {}", e),
            NmeaError::Serial(e) => write!(f, "Serial error: {}", e),
            NmeaError::Json(e) => write!(f, "JSON error: {}", e),
            NmeaError::Connection(msg) => write!(f, "Connection error: {}", msg),
            NmeaError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for NmeaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NmeaError::Io(e) => Some(e),
            NmeaError::Serial(e) => Some(e),
            NmeaError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for NmeaError {
    fn from(error: std::io::Error) -> Self {
        NmeaError::Io(error)
    }
}

impl From<tokio_serial::Error> for NmeaError {
    fn from(error: tokio_serial::Error) -> Self {
        NmeaError::Serial(error)
    }
}

impl From<serde_json::Error> for NmeaError {
    fn from(error: serde_json::Error) -> Self {
        NmeaError::Json(error)
    }
}
