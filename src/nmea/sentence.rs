// src/nmea/sentence.rs
//! Sentence framing: marker, address, fields and checksum

use super::checksum;
use crate::error::DecodeError;
use serde::Serialize;
use std::fmt;

/// Talker id given to proprietary (`$P...`) sentences
pub const PROPRIETARY_TALKER: &str = "P";

/// One framed NMEA sentence, split but not yet interpreted.
///
/// `fields` excludes the address (`GPGGA`), so `fields[0]` is the first data
/// field. `checksum` keeps whatever text followed the `*`. Proprietary
/// addresses such as `PUBX` or `PMTK001` have talker `P` and the rest of the
/// address as sentence id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawSentence {
    pub marker: char,
    pub talker_id: String,
    pub sentence_id: String,
    pub fields: Vec<String>,
    pub checksum: Option<String>,
}

impl RawSentence {
    /// Frame a single line. Trailing whitespace and CR/LF are ignored.
    pub fn parse(line: &str) -> Result<Self, DecodeError> {
        let line = line.trim_end();

        let marker = match line.chars().next() {
            Some(c @ ('$' | '!')) => c,
            Some(c) => {
                return Err(DecodeError::Framing(format!(
                    "expected '$' or '!' at start of sentence, found {:?}",
                    c
                )))
            }
            None => return Err(DecodeError::Framing("empty line".to_string())),
        };

        if !line.is_ascii() {
            return Err(DecodeError::Framing(
                "sentence contains non-ASCII characters".to_string(),
            ));
        }

        let body = &line[1..];
        let (payload, checksum) = match body.split_once('*') {
            Some((_, rest)) if rest.contains('*') => {
                return Err(DecodeError::Framing(
                    "more than one '*' in sentence".to_string(),
                ))
            }
            Some((payload, rest)) => (payload, Some(rest.to_string())),
            None => (body, None),
        };

        let mut parts = payload.split(',');
        let address = parts.next().unwrap_or_default();
        let alphanumeric = address.bytes().all(|b| b.is_ascii_alphanumeric());
        let split = match address.strip_prefix(PROPRIETARY_TALKER) {
            Some(rest) if alphanumeric && !rest.is_empty() => PROPRIETARY_TALKER.len(),
            _ if alphanumeric && address.len() == 5 => 2,
            _ => {
                return Err(DecodeError::Framing(format!(
                    "malformed address field: {:?}",
                    address
                )))
            }
        };

        Ok(Self {
            marker,
            talker_id: address[..split].to_string(),
            sentence_id: address[split..].to_string(),
            fields: parts.map(str::to_string).collect(),
            checksum,
        })
    }

    pub fn is_proprietary(&self) -> bool {
        self.talker_id == PROPRIETARY_TALKER
    }

    /// Talker and sentence id, e.g. `GPGGA` or `PUBX`
    pub fn address(&self) -> String {
        format!("{}{}", self.talker_id, self.sentence_id)
    }

    /// Address and fields as they appeared between the marker and `*`
    pub fn payload(&self) -> String {
        let mut payload = self.address();
        for field in &self.fields {
            payload.push(',');
            payload.push_str(field);
        }
        payload
    }

    pub fn calculated_checksum(&self) -> u8 {
        checksum::calculate(&self.payload())
    }

    /// Check the transmitted checksum against the payload.
    ///
    /// A sentence without a checksum passes unless `required` is set.
    pub fn verify_checksum(&self, required: bool) -> Result<(), DecodeError> {
        let calculated = self.calculated_checksum();
        match &self.checksum {
            Some(text) if checksum::matches(text, calculated) => Ok(()),
            Some(text) => Err(DecodeError::Checksum {
                expected: Some(text.to_uppercase()),
                calculated,
            }),
            None if required => Err(DecodeError::Checksum {
                expected: None,
                calculated,
            }),
            None => Ok(()),
        }
    }

    /// A field that must be present (it may still be empty)
    pub fn field(&self, index: usize) -> Result<&str, DecodeError> {
        self.fields
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| DecodeError::field(index, "missing field"))
    }

    /// A trailing field that older talkers may leave out entirely
    pub fn optional_field(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", String::as_str)
    }

    /// Parse a required field, tagging any failure with its index.
    pub fn parse_field<T, F>(&self, index: usize, parse: F) -> Result<T, DecodeError>
    where
        F: FnOnce(&str) -> std::result::Result<T, String>,
    {
        parse(self.field(index)?).map_err(|msg| DecodeError::field(index, msg))
    }

    /// Parse a field that may be absent; absent fields parse as empty.
    pub fn parse_optional<T, F>(&self, index: usize, parse: F) -> Result<T, DecodeError>
    where
        F: FnOnce(&str) -> std::result::Result<T, String>,
    {
        parse(self.optional_field(index)).map_err(|msg| DecodeError::field(index, msg))
    }

    /// Parse a value field together with the unit/hemisphere field after it.
    pub fn parse_pair<T, F>(&self, index: usize, parse: F) -> Result<T, DecodeError>
    where
        F: FnOnce(&str, &str) -> std::result::Result<T, String>,
    {
        let value = self.field(index)?;
        let qualifier = self.field(index + 1)?;
        parse(value, qualifier).map_err(|msg| DecodeError::field(index, msg))
    }

    /// Like `parse_pair`, for trailing pairs that may be absent.
    pub fn parse_optional_pair<T, F>(&self, index: usize, parse: F) -> Result<T, DecodeError>
    where
        F: FnOnce(&str, &str) -> std::result::Result<T, String>,
    {
        parse(self.optional_field(index), self.optional_field(index + 1))
            .map_err(|msg| DecodeError::field(index, msg))
    }
}

impl fmt::Display for RawSentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.marker, self.payload())?;
        if let Some(checksum) = &self.checksum {
            write!(f, "*{}", checksum)?;
        }
        Ok(())
    }
}
