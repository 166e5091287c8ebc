// src/nmea/checksum.rs
//! NMEA checksum handling
//!
//! The checksum is the XOR of every byte between the start marker (`$` or
//! `!`) and the `*`, written as two hex digits after the `*`.

use crate::error::DecodeError;

/// XOR all bytes of a sentence body.
///
/// Accepts a full sentence: a leading marker is skipped and anything from the
/// first `*` on is ignored.
pub fn calculate(sentence: &str) -> u8 {
    let body = sentence.split('*').next().unwrap_or_default();
    let body = body
        .strip_prefix('$')
        .or_else(|| body.strip_prefix('!'))
        .unwrap_or(body);
    body.bytes().fold(0, |acc, b| acc ^ b)
}

/// Compare a checksum text found after the `*` with a calculated value.
///
/// Anything other than exactly two hex digits never matches.
pub fn matches(text: &str, calculated: u8) -> bool {
    text.len() == 2
        && text.bytes().all(|b| b.is_ascii_hexdigit())
        && u8::from_str_radix(text, 16).map_or(false, |value| value == calculated)
}

/// Verify a full sentence, which must carry a checksum.
pub fn verify(sentence: &str) -> Result<(), DecodeError> {
    let sentence = sentence.trim();
    let calculated = calculate(sentence);
    match sentence.split_once('*') {
        Some((_, text)) if matches(text, calculated) => Ok(()),
        Some((_, text)) => Err(DecodeError::Checksum {
            expected: Some(text.to_uppercase()),
            calculated,
        }),
        None => Err(DecodeError::Checksum {
            expected: None,
            calculated,
        }),
    }
}

/// Append `*HH` to a sentence that has no checksum yet.
pub fn append(sentence: &str) -> Result<String, DecodeError> {
    if sentence.contains('*') {
        return Err(DecodeError::Framing(format!(
            "sentence already has a checksum: {:?}",
            sentence
        )));
    }
    Ok(format!("{}*{:02X}", sentence, calculate(sentence)))
}
