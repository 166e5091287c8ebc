// src/nmea/data.rs
//! Decoded sentence records

use super::fields::{knots_to_mps, KNOTS_TO_MPS};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

/// GGA: global positioning system fix data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gga {
    pub time: Option<NaiveTime>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub fix_quality: u8,
    pub satellites_used: u8,
    pub hdop: Option<f64>,
    pub altitude_msl: Option<f64>,     // metres above mean sea level
    pub geoid_separation: Option<f64>, // metres, ellipsoid above geoid
    pub differential_age: Option<f64>, // seconds since last DGPS update
    pub differential_station: Option<String>,
}

impl Gga {
    /// Whether the receiver reports a usable position
    pub fn has_fix(&self) -> bool {
        self.fix_quality != 0 && self.latitude.is_some() && self.longitude.is_some()
    }

    pub fn fix_description(&self) -> String {
        match self.fix_quality {
            0 => "No fix".to_string(),
            1 => "GPS".to_string(),
            2 => "DGPS".to_string(),
            3 => "PPS".to_string(),
            4 => "RTK".to_string(),
            5 => "Float RTK".to_string(),
            6 => "Estimated".to_string(),
            7 => "Manual".to_string(),
            8 => "Simulation".to_string(),
            quality => format!("Unknown ({})", quality),
        }
    }
}

/// RMC: recommended minimum navigation data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rmc {
    pub time: Option<NaiveTime>,
    pub status: Option<char>, // 'A' active, 'V' void
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub speed_knots: Option<f64>,
    pub course: Option<f64>, // degrees true
    pub date: Option<NaiveDate>,
    pub declination: Option<f64>, // magnetic, degrees east
    pub mode: Option<char>,       // FAA mode indicator, NMEA 2.3+
}

impl Rmc {
    pub fn is_active(&self) -> bool {
        self.status == Some('A')
    }

    pub fn speed_mps(&self) -> Option<f64> {
        self.speed_knots.map(knots_to_mps)
    }

    pub fn speed_kph(&self) -> Option<f64> {
        self.speed_knots.map(|knots| knots * KNOTS_TO_MPS * 3.6)
    }

    /// Full UTC timestamp, if both date and time were sent
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        let (date, time) = (self.date?, self.time?);
        Some(Utc.from_utc_datetime(&date.and_time(time)))
    }
}

/// GSA: dilution of precision and active satellites
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gsa {
    pub mode: Option<char>, // 'M' manual, 'A' automatic
    pub fix_type: u8,
    pub satellite_ids: Vec<u16>,
    pub pdop: Option<f64>,
    pub hdop: Option<f64>,
    pub vdop: Option<f64>,
    pub system_id: Option<u8>, // NMEA 4.1+
}

impl Gsa {
    pub fn fix_description(&self) -> String {
        match self.fix_type {
            1 => "No fix".to_string(),
            2 => "2D fix".to_string(),
            3 => "3D fix".to_string(),
            mode => format!("Mode {}", mode),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Satellite {
    pub prn: u16,
    pub elevation: Option<f32>, // degrees
    pub azimuth: Option<f32>,   // degrees true
    pub snr: Option<f32>,       // dB-Hz, empty when not tracking
}

impl Satellite {
    /// Constellation implied by the PRN numbering
    pub fn constellation(&self) -> &'static str {
        match self.prn {
            1..=32 => "GPS",
            33..=64 => "SBAS",
            65..=96 => "GLONASS",
            120..=158 => "SBAS",
            159..=163 => "BEIDOU",
            193..=197 => "QZSS",
            201..=235 => "BEIDOU",
            301..=336 => "GALILEO",
            _ => "UNKNOWN",
        }
    }

    pub fn signal_strength_description(&self) -> &'static str {
        match self.snr {
            Some(snr) if snr >= 40.0 => "Excellent",
            Some(snr) if snr >= 35.0 => "Good",
            Some(snr) if snr >= 25.0 => "Fair",
            Some(snr) if snr >= 15.0 => "Poor",
            Some(_) => "Very Poor",
            None => "Unknown",
        }
    }
}

/// GSV: satellites in view, one part of a multi-sentence group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gsv {
    pub messages_total: u8,
    pub message_number: u8,
    pub satellites_in_view: u8,
    pub satellites: Vec<Satellite>,
    pub signal_id: Option<String>, // NMEA 4.1+
}

impl Gsv {
    pub fn is_last(&self) -> bool {
        self.message_number >= self.messages_total
    }
}

/// TXT: text transmission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Txt {
    pub sentences_total: u8,
    pub sentence_number: u8,
    pub text_id: u8,
    pub message: String,
}

/// Every sentence kind the decoder understands
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "_type")]
pub enum Sentence {
    #[serde(rename = "GGA")]
    Gga(Gga),
    #[serde(rename = "RMC")]
    Rmc(Rmc),
    #[serde(rename = "GSA")]
    Gsa(Gsa),
    #[serde(rename = "GSV")]
    Gsv(Gsv),
    #[serde(rename = "TXT")]
    Txt(Txt),
}

impl Sentence {
    pub fn sentence_id(&self) -> &'static str {
        match self {
            Sentence::Gga(_) => "GGA",
            Sentence::Rmc(_) => "RMC",
            Sentence::Gsa(_) => "GSA",
            Sentence::Gsv(_) => "GSV",
            Sentence::Txt(_) => "TXT",
        }
    }
}

/// A successfully decoded line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedFix {
    pub talker_id: String,
    #[serde(flatten)]
    pub sentence: Sentence,
}

impl DecodedFix {
    pub fn sentence_id(&self) -> &'static str {
        self.sentence.sentence_id()
    }

    /// Constellation named by the talker id
    pub fn constellation(&self) -> &'static str {
        talker_constellation(&self.talker_id)
    }

    /// Position, for the sentence kinds that carry one
    pub fn position(&self) -> Option<(f64, f64)> {
        match &self.sentence {
            Sentence::Gga(gga) => gga.latitude.zip(gga.longitude),
            Sentence::Rmc(rmc) => rmc.latitude.zip(rmc.longitude),
            _ => None,
        }
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

pub fn talker_constellation(talker_id: &str) -> &'static str {
    match talker_id {
        "GP" => "GPS",
        "GL" => "GLONASS",
        "GA" => "GALILEO",
        "GB" | "BD" => "BEIDOU",
        "GQ" | "QZ" => "QZSS",
        "GI" => "NAVIC",
        "GN" => "GNSS",
        _ => "UNKNOWN",
    }
}
