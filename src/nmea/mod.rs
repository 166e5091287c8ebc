// src/nmea/mod.rs
//! NMEA-0183 sentence decoding

pub mod checksum;
pub mod data;
pub mod decoder;
pub mod fields;
pub mod sentence;

pub use data::{DecodedFix, Sentence};
pub use decoder::{decode_line, decode_stream, DecodeFn, Decoder};
pub use sentence::RawSentence;
