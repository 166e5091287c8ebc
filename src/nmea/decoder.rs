// src/nmea/decoder.rs
//! Sentence decoding and dispatch

use super::data::{DecodedFix, Gga, Gsa, Gsv, Rmc, Satellite, Sentence, Txt};
use super::fields;
use super::sentence::RawSentence;
use crate::error::DecodeError;
use std::fmt;
use std::sync::OnceLock;

/// Per-type decoder: positional fields in, one `Sentence` variant out
pub type DecodeFn = fn(&RawSentence) -> Result<Sentence, DecodeError>;

/// Built-in decoders, keyed by sentence id and shared by every talker.
/// Proprietary sentences are keyed by their whole address (`PUBX`).
const BUILTIN_DECODERS: &[(&str, DecodeFn)] = &[
    ("GGA", decode_gga),
    ("GSA", decode_gsa),
    ("GSV", decode_gsv),
    ("RMC", decode_rmc),
    ("TXT", decode_txt),
];

/// Dispatch table plus checksum policy.
///
/// Stateless apart from its configuration: decoding the same line twice
/// always gives the same result.
#[derive(Clone)]
pub struct Decoder {
    decoders: Vec<(&'static str, DecodeFn)>,
    require_checksum: bool,
}

impl Decoder {
    /// Decoder with the built-in table; a missing checksum is accepted.
    pub fn new() -> Self {
        Self {
            decoders: BUILTIN_DECODERS.to_vec(),
            require_checksum: false,
        }
    }

    /// Reject sentences that carry no checksum
    pub fn require_checksum(mut self, required: bool) -> Self {
        self.require_checksum = required;
        self
    }

    /// Register a decoder for a sentence id (or a proprietary address such as
    /// `PUBX`), replacing any existing one
    pub fn with_decoder(mut self, sentence_id: &'static str, decode: DecodeFn) -> Self {
        match self.decoders.iter_mut().find(|(id, _)| *id == sentence_id) {
            Some(entry) => entry.1 = decode,
            None => self.decoders.push((sentence_id, decode)),
        }
        self
    }

    pub fn sentence_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decoders.iter().map(|(id, _)| *id)
    }

    fn lookup(&self, sentence_id: &str) -> Option<DecodeFn> {
        self.decoders
            .iter()
            .find(|(id, _)| *id == sentence_id)
            .map(|(_, decode)| *decode)
    }

    /// Decode one line of input.
    ///
    /// Unknown sentence ids are reported before the checksum is looked at, so
    /// the caller always gets the raw fields back for them.
    pub fn decode_line(&self, line: &str) -> Result<DecodedFix, DecodeError> {
        let raw = RawSentence::parse(line)?;

        let decoder = if raw.is_proprietary() {
            self.lookup(&raw.address())
        } else {
            self.lookup(&raw.sentence_id)
        };
        let decode = match decoder {
            Some(decode) => decode,
            None => return Err(DecodeError::UnknownSentence(raw)),
        };

        raw.verify_checksum(self.require_checksum)?;
        let sentence = decode(&raw)?;

        Ok(DecodedFix {
            talker_id: raw.talker_id,
            sentence,
        })
    }

    /// Decode lazily, one result per non-blank line.
    pub fn decode_stream<'a, I>(
        &'a self,
        lines: I,
    ) -> impl Iterator<Item = Result<DecodedFix, DecodeError>> + 'a
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: 'a,
    {
        lines
            .into_iter()
            .filter(|line| !line.as_ref().trim().is_empty())
            .map(move |line| self.decode_line(line.as_ref()))
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("sentence_ids", &self.sentence_ids().collect::<Vec<_>>())
            .field("require_checksum", &self.require_checksum)
            .finish()
    }
}

fn default_decoder() -> &'static Decoder {
    static DECODER: OnceLock<Decoder> = OnceLock::new();
    DECODER.get_or_init(Decoder::new)
}

/// Decode one line with the built-in table
pub fn decode_line(line: &str) -> Result<DecodedFix, DecodeError> {
    default_decoder().decode_line(line)
}

/// Decode a sequence of lines with the built-in table
pub fn decode_stream<I>(lines: I) -> impl Iterator<Item = Result<DecodedFix, DecodeError>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    I::IntoIter: 'static,
{
    default_decoder().decode_stream(lines)
}

const GSA_FIELDS: usize = 17;

/// Parse GGA (Global Positioning System Fix Data)
fn decode_gga(raw: &RawSentence) -> Result<Sentence, DecodeError> {
    Ok(Sentence::Gga(Gga {
        time: raw.parse_field(0, fields::parse_time)?,
        latitude: raw.parse_pair(1, fields::parse_latitude)?,
        longitude: raw.parse_pair(3, fields::parse_longitude)?,
        fix_quality: raw.parse_field(5, fields::parse_int)?,
        satellites_used: raw.parse_field(6, fields::parse_int)?,
        hdop: raw.parse_field(7, fields::parse_float)?,
        altitude_msl: raw.parse_pair(8, fields::parse_altitude)?,
        geoid_separation: raw.parse_optional_pair(10, fields::parse_altitude)?,
        differential_age: raw.parse_optional(12, fields::parse_float)?,
        differential_station: raw.parse_optional(13, fields::parse_text)?,
    }))
}

/// Parse RMC (Recommended Minimum Course). Speed stays in knots.
fn decode_rmc(raw: &RawSentence) -> Result<Sentence, DecodeError> {
    Ok(Sentence::Rmc(Rmc {
        time: raw.parse_field(0, fields::parse_time)?,
        status: raw.parse_field(1, fields::parse_flag)?,
        latitude: raw.parse_pair(2, fields::parse_latitude)?,
        longitude: raw.parse_pair(4, fields::parse_longitude)?,
        speed_knots: raw.parse_field(6, fields::parse_float)?,
        course: raw.parse_field(7, fields::parse_float)?,
        date: raw.parse_field(8, fields::parse_date)?,
        declination: raw.parse_optional_pair(9, fields::parse_declination)?,
        mode: raw.parse_optional(11, fields::parse_flag)?,
    }))
}

/// Parse GSA (DOP and active satellites)
fn decode_gsa(raw: &RawSentence) -> Result<Sentence, DecodeError> {
    // Mode, fix type, 12 satellite slots and three DOPs; NMEA 4.1 appends a
    // system id
    let count = raw.fields.len();
    if count < GSA_FIELDS {
        return Err(DecodeError::field(
            count,
            format!("expected at least {} fields, found {}", GSA_FIELDS, count),
        ));
    }
    let dop_start = GSA_FIELDS - 3;
    let system_id = raw.parse_optional(GSA_FIELDS, fields::parse_optional_int)?;

    let mut satellite_ids = Vec::new();
    for index in 2..dop_start {
        if let Some(id) = raw.parse_field(index, fields::parse_optional_int)? {
            satellite_ids.push(id);
        }
    }

    Ok(Sentence::Gsa(Gsa {
        mode: raw.parse_field(0, fields::parse_flag)?,
        fix_type: raw.parse_field(1, fields::parse_int)?,
        satellite_ids,
        pdop: raw.parse_field(dop_start, fields::parse_float)?,
        hdop: raw.parse_field(dop_start + 1, fields::parse_float)?,
        vdop: raw.parse_field(dop_start + 2, fields::parse_float)?,
        system_id,
    }))
}

const SATELLITE_FIELDS: usize = 4;

/// Parse GSV (Satellites in View)
fn decode_gsv(raw: &RawSentence) -> Result<Sentence, DecodeError> {
    let messages_total = raw.parse_field(0, fields::parse_int)?;
    let message_number = raw.parse_field(1, fields::parse_int)?;
    let satellites_in_view = raw.parse_field(2, fields::parse_int)?;

    let blocks = raw.fields.get(3..).unwrap_or_default();
    let mut satellites = Vec::new();
    let mut signal_id = None;

    for (block, chunk) in blocks.chunks(SATELLITE_FIELDS).enumerate() {
        let index = 3 + block * SATELLITE_FIELDS;
        match chunk.len() {
            SATELLITE_FIELDS => {}
            // NMEA 4.1 signal id trails the last satellite
            1 => {
                signal_id = raw.parse_field(index, fields::parse_text)?;
                continue;
            }
            found => {
                return Err(DecodeError::field(
                    index,
                    format!(
                        "expected {} satellite fields, found {}",
                        SATELLITE_FIELDS, found
                    ),
                ))
            }
        }

        // Padding for unused slots
        if chunk.iter().all(|field| field.is_empty()) {
            continue;
        }

        satellites.push(Satellite {
            prn: raw.parse_field(index, fields::parse_int)?,
            elevation: raw.parse_field(index + 1, fields::parse_float)?.map(|v| v as f32),
            azimuth: raw.parse_field(index + 2, fields::parse_float)?.map(|v| v as f32),
            snr: raw.parse_field(index + 3, fields::parse_float)?.map(|v| v as f32),
        });
    }

    Ok(Sentence::Gsv(Gsv {
        messages_total,
        message_number,
        satellites_in_view,
        satellites,
        signal_id,
    }))
}

/// Parse TXT (Text Transmission)
fn decode_txt(raw: &RawSentence) -> Result<Sentence, DecodeError> {
    Ok(Sentence::Txt(Txt {
        sentences_total: raw.parse_field(0, fields::parse_int)?,
        sentence_number: raw.parse_field(1, fields::parse_int)?,
        text_id: raw.parse_field(2, fields::parse_int)?,
        message: raw.fields.get(3..).unwrap_or_default().join(","),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

    fn gga(line: &str) -> Gga {
        match decode_line(line).unwrap().sentence {
            Sentence::Gga(gga) => gga,
            other => panic!("expected GGA, got {:?}", other),
        }
    }

    #[test]
    fn test_gpgga_decoding() {
        let fix = decode_line(GGA).unwrap();
        assert_eq!(fix.talker_id, "GP");
        assert_eq!(fix.sentence_id(), "GGA");

        let gga = gga(GGA);
        assert_eq!(gga.time, NaiveTime::from_hms_opt(12, 35, 19));
        assert_eq!(gga.latitude, Some(48.1173));
        assert_eq!(gga.longitude, Some(11.516667));
        assert_eq!(gga.fix_quality, 1);
        assert_eq!(gga.satellites_used, 8);
        assert_eq!(gga.hdop, Some(0.9));
        assert_eq!(gga.altitude_msl, Some(545.4));
        assert_eq!(gga.geoid_separation, Some(46.9));
        assert_eq!(gga.differential_age, None);
        assert_eq!(gga.differential_station, None);
        assert!(gga.has_fix());
    }

    #[test]
    fn test_gngga_southern_hemisphere() {
        let gga = gga("$GNGGA,031921.542,3653.0286,S,17441.8568,E,0,00,,-26.2,M,26.2,M,,0000*6D");
        assert_eq!(gga.time, NaiveTime::from_hms_milli_opt(3, 19, 21, 542));
        assert_eq!(gga.latitude, Some(-36.88381));
        assert_eq!(gga.longitude, Some(174.697613));
        assert_eq!(gga.fix_quality, 0);
        assert_eq!(gga.satellites_used, 0);
        assert_eq!(gga.hdop, None);
        assert_eq!(gga.altitude_msl, Some(-26.2));
        assert_eq!(gga.differential_station.as_deref(), Some("0000"));
        assert!(!gga.has_fix());
    }

    #[test]
    fn test_gprmc_decoding() {
        let line = "$GPRMC,010432.00,A,3653.0835,S,17441.9076,E,26.99784,240.241,240521,19.9,E*4C";
        let rmc = match decode_line(line).unwrap().sentence {
            Sentence::Rmc(rmc) => rmc,
            other => panic!("expected RMC, got {:?}", other),
        };

        assert_eq!(rmc.time, NaiveTime::from_hms_opt(1, 4, 32));
        assert!(rmc.is_active());
        assert_eq!(rmc.latitude, Some(-36.884725));
        assert_eq!(rmc.longitude, Some(174.69846));
        assert_eq!(rmc.speed_knots, Some(26.99784));
        assert_eq!(rmc.course, Some(240.241));
        assert_eq!(rmc.date, NaiveDate::from_ymd_opt(2021, 5, 24));
        assert_eq!(rmc.declination, Some(19.9));
        assert_eq!(rmc.mode, None);
        assert_eq!(rmc.datetime().unwrap().to_rfc3339(), "2021-05-24T01:04:32+00:00");
    }

    #[test]
    fn test_gprmc_with_mode_and_west_declination() {
        let line = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W,A*07";
        let rmc = match decode_line(line).unwrap().sentence {
            Sentence::Rmc(rmc) => rmc,
            other => panic!("expected RMC, got {:?}", other),
        };
        assert_eq!(rmc.declination, Some(-3.1));
        assert_eq!(rmc.mode, Some('A'));
        assert_eq!(rmc.date, NaiveDate::from_ymd_opt(1994, 3, 23));
        assert!((rmc.speed_kph().unwrap() - 41.4848).abs() < 1e-3);
    }

    #[test]
    fn test_rmc_void_with_empty_fields() {
        let line = crate::nmea::checksum::append("$GPRMC,123519,V,,,,,,,,,").unwrap();
        let rmc = match decode_line(&line).unwrap().sentence {
            Sentence::Rmc(rmc) => rmc,
            other => panic!("expected RMC, got {:?}", other),
        };
        assert!(!rmc.is_active());
        assert_eq!(rmc.latitude, None);
        assert_eq!(rmc.speed_knots, None);
        assert_eq!(rmc.date, None);
        assert_eq!(rmc.datetime(), None);
    }

    #[test]
    fn test_gsa_decoding() {
        let first = decode_line("$GNGSA,A,3,19,14,02,20,06,03,24,12,17,,,,1.48,0.81,1.24*14").unwrap();
        let second = decode_line("$GNGSA,A,3,82,80,73,,,,,,,,,,1.48,0.81,1.24*19").unwrap();

        for (fix, ids) in [
            (first, vec![19, 14, 2, 20, 6, 3, 24, 12, 17]),
            (second, vec![82, 80, 73]),
        ] {
            let gsa = match fix.sentence {
                Sentence::Gsa(gsa) => gsa,
                other => panic!("expected GSA, got {:?}", other),
            };
            assert_eq!(gsa.mode, Some('A'));
            assert_eq!(gsa.fix_type, 3);
            assert_eq!(gsa.satellite_ids, ids);
            assert_eq!(gsa.pdop, Some(1.48));
            assert_eq!(gsa.hdop, Some(0.81));
            assert_eq!(gsa.vdop, Some(1.24));
            assert_eq!(gsa.system_id, None);
        }
    }

    #[test]
    fn test_gsa_with_system_id() {
        let line = crate::nmea::checksum::append("$GNGSA,A,3,65,66,,,,,,,,,,,1.9,1.0,1.6,2").unwrap();
        let gsa = match decode_line(&line).unwrap().sentence {
            Sentence::Gsa(gsa) => gsa,
            other => panic!("expected GSA, got {:?}", other),
        };
        assert_eq!(gsa.satellite_ids, vec![65, 66]);
        assert_eq!(gsa.pdop, Some(1.9));
        assert_eq!(gsa.vdop, Some(1.6));
        assert_eq!(gsa.system_id, Some(2));
    }

    #[test]
    fn test_truncated_gsa() {
        let line = crate::nmea::checksum::append("$GPGSA,A,3,1,2,3").unwrap();
        assert_eq!(line, "$GPGSA,A,3,1,2,3*2C");
        assert_eq!(
            decode_line(&line).unwrap_err(),
            DecodeError::FieldParse {
                index: 5,
                message: "expected at least 17 fields, found 5".to_string()
            }
        );
    }

    #[test]
    fn test_gsv_decoding() {
        let line = "$GPGSV,3,1,12,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*7F";
        let gsv = match decode_line(line).unwrap().sentence {
            Sentence::Gsv(gsv) => gsv,
            other => panic!("expected GSV, got {:?}", other),
        };

        assert_eq!(gsv.messages_total, 3);
        assert_eq!(gsv.message_number, 1);
        assert_eq!(gsv.satellites_in_view, 12);
        assert_eq!(gsv.satellites.len(), 4);
        assert_eq!(gsv.satellites[0].prn, 1);
        assert_eq!(gsv.satellites[0].constellation(), "GPS");
        assert_eq!(gsv.satellites[0].elevation, Some(40.0));
        assert_eq!(gsv.satellites[0].azimuth, Some(83.0));
        assert_eq!(gsv.satellites[0].snr, Some(46.0));
        assert!(!gsv.is_last());
    }

    #[test]
    fn test_gsv_without_snr() {
        let line = "$GPGSV,3,3,10,01,05,306,,29,05,123,*77";
        let gsv = match decode_line(line).unwrap().sentence {
            Sentence::Gsv(gsv) => gsv,
            other => panic!("expected GSV, got {:?}", other),
        };
        assert_eq!(
            gsv.satellites,
            vec![
                Satellite { prn: 1, elevation: Some(5.0), azimuth: Some(306.0), snr: None },
                Satellite { prn: 29, elevation: Some(5.0), azimuth: Some(123.0), snr: None },
            ]
        );
        assert!(gsv.is_last());
    }

    #[test]
    fn test_gsv_signal_id() {
        let gsv = match decode_line("$GPGSV,1,1,01,05,,,30,1*63").unwrap().sentence {
            Sentence::Gsv(gsv) => gsv,
            other => panic!("expected GSV, got {:?}", other),
        };
        assert_eq!(gsv.satellites.len(), 1);
        assert_eq!(gsv.satellites[0].elevation, None);
        assert_eq!(gsv.signal_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_gsv_incomplete_satellite() {
        let err = decode_line("$GPGSV,3,3,10,01,05,306,,29,05*47").unwrap_err();
        assert_eq!(
            err,
            DecodeError::FieldParse {
                index: 7,
                message: "expected 4 satellite fields, found 2".to_string(),
            }
        );
    }

    #[test]
    fn test_txt_decoding() {
        let fix = decode_line("$GNTXT,01,01,02,ROM CORE 3.01 (107888)*2B").unwrap();
        assert_eq!(fix.talker_id, "GN");
        match fix.sentence {
            Sentence::Txt(txt) => {
                assert_eq!(txt.sentences_total, 1);
                assert_eq!(txt.sentence_number, 1);
                assert_eq!(txt.text_id, 2);
                assert_eq!(txt.message, "ROM CORE 3.01 (107888)");
            }
            other => panic!("expected TXT, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_checksum() {
        let line = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*00";
        assert_eq!(
            decode_line(line).unwrap_err(),
            DecodeError::Checksum {
                expected: Some("00".to_string()),
                calculated: 0x47,
            }
        );
    }

    #[test]
    fn test_every_mutated_checksum_fails() {
        for value in (0..=255u8).filter(|v| *v != 0x47) {
            let line = format!("{}*{:02X}", &GGA[..GGA.len() - 3], value);
            assert!(
                matches!(decode_line(&line), Err(DecodeError::Checksum { .. })),
                "{}",
                line
            );
        }
    }

    #[test]
    fn test_mutated_payload_fails_checksum() {
        let line = GGA.replace("545.4", "545.5");
        assert!(matches!(decode_line(&line), Err(DecodeError::Checksum { .. })));
    }

    #[test]
    fn test_missing_marker() {
        for line in ["GPGGA,123519*47", " $GPGGA,123519*47", "#GPGGA"] {
            assert!(matches!(decode_line(line), Err(DecodeError::Framing(_))), "{}", line);
        }
    }

    #[test]
    fn test_unknown_sentence_keeps_raw() {
        let err = decode_line("$GPZZZ,1,2,3*XX").unwrap_err();
        let raw = err.raw_sentence().expect("raw sentence");
        assert_eq!(raw.talker_id, "GP");
        assert_eq!(raw.sentence_id, "ZZZ");
        assert_eq!(raw.fields, vec!["1", "2", "3"]);
        assert_eq!(raw.checksum.as_deref(), Some("XX"));
    }

    #[test]
    fn test_unknown_bang_sentence() {
        let err = decode_line("!AIVDM,1,1,,A,13u?etPv2;0n:dDPwUM1U1Cb069D,0*24").unwrap_err();
        assert!(matches!(err, DecodeError::UnknownSentence(_)));
        assert!(err.raw_sentence().unwrap().verify_checksum(true).is_ok());
    }

    #[test]
    fn test_proprietary_sentences_are_unknown() {
        for line in ["$PUBX,00,081350.00,4717.113210,N*5B", "$PMTK001,314,3*36"] {
            let err = decode_line(line).unwrap_err();
            let raw = err.raw_sentence().expect("raw sentence");
            assert!(raw.is_proprietary(), "{}", line);
        }

        // A proprietary address never reaches the standard GGA decoder
        let err = decode_line("$PGGA,1,2*12").unwrap_err();
        assert_eq!(err.raw_sentence().unwrap().sentence_id, "GGA");
    }

    #[test]
    fn test_proprietary_decoder() {
        fn as_txt(raw: &RawSentence) -> Result<Sentence, DecodeError> {
            Ok(Sentence::Txt(Txt {
                sentences_total: 1,
                sentence_number: 1,
                text_id: raw.parse_field(1, fields::parse_int)?,
                message: raw.field(0)?.to_string(),
            }))
        }

        let decoder = Decoder::new().with_decoder("PMTK001", as_txt);
        let fix = decoder.decode_line("$PMTK001,314,3*36").unwrap();
        assert_eq!(fix.talker_id, "P");
        match fix.sentence {
            Sentence::Txt(txt) => {
                assert_eq!(txt.text_id, 3);
                assert_eq!(txt.message, "314");
            }
            other => panic!("expected TXT, got {:?}", other),
        }
    }

    #[test]
    fn test_field_parse_error_index() {
        let err = decode_line("$GPGGA,123519,48O7.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*38").unwrap_err();
        assert!(matches!(err, DecodeError::FieldParse { index: 1, .. }));

        let err = decode_line("$GPGGA,123519,4807.038,X,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*51").unwrap_err();
        assert!(matches!(err, DecodeError::FieldParse { index: 1, .. }));

        let err = decode_line("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,F,46.9,M,,*4C").unwrap_err();
        assert!(matches!(err, DecodeError::FieldParse { index: 8, .. }));
    }

    #[test]
    fn test_truncated_sentence() {
        let err = decode_line("$GPGGA,123519,4807.038,N*27").unwrap_err();
        assert_eq!(
            err,
            DecodeError::FieldParse { index: 3, message: "missing field".to_string() }
        );
    }

    #[test]
    fn test_invalid_date() {
        let err = decode_line("$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,999999,003.1,W*65").unwrap_err();
        assert!(matches!(err, DecodeError::FieldParse { index: 8, .. }));
    }

    #[test]
    fn test_missing_checksum() {
        let line = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,";
        assert!(decode_line(line).is_ok());

        let strict = Decoder::new().require_checksum(true);
        assert!(matches!(
            strict.decode_line(line),
            Err(DecodeError::Checksum { expected: None, calculated: 0x47 })
        ));
        assert!(strict.decode_line(GGA).is_ok());
    }

    #[test]
    fn test_crlf_is_stripped() {
        let line = format!("{}\r\n", GGA);
        assert_eq!(decode_line(&line), decode_line(GGA));
    }

    #[test]
    fn test_decoding_is_idempotent() {
        for line in [GGA, "$GPZZZ,1,2,3*XX", "nonsense", "$GPGGA,1*00"] {
            assert_eq!(decode_line(line), decode_line(line));
        }
    }

    #[test]
    fn test_custom_decoder() {
        fn as_txt(raw: &RawSentence) -> Result<Sentence, DecodeError> {
            Ok(Sentence::Txt(Txt {
                sentences_total: 1,
                sentence_number: 1,
                text_id: 0,
                message: raw.fields.join(","),
            }))
        }

        let decoder = Decoder::new().with_decoder("ZZZ", as_txt);
        let fix = decoder.decode_line("$GPZZZ,1,2,3*51").unwrap();
        assert_eq!(fix.sentence_id(), "TXT");
        assert_eq!(fix.talker_id, "GP");
        assert!(decoder.sentence_ids().any(|id| id == "ZZZ"));

        // The built-in table is untouched
        assert!(matches!(
            decode_line("$GPZZZ,1,2,3*51"),
            Err(DecodeError::UnknownSentence(_))
        ));
    }

    #[test]
    fn test_decode_stream() {
        let lines = vec![
            GGA.to_string(),
            String::new(),
            "  \r\n".to_string(),
            "garbage".to_string(),
            "$GPZZZ,1,2,3*51".to_string(),
            "$GNTXT,01,01,02,ROM CORE 3.01 (107888)*2B".to_string(),
        ];
        let results: Vec<_> = decode_stream(lines).collect();

        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(DecodeError::Framing(_))));
        assert!(matches!(results[2], Err(DecodeError::UnknownSentence(_))));
        assert_eq!(results[3].as_ref().unwrap().sentence_id(), "TXT");
    }

    #[test]
    fn test_decode_stream_is_lazy() {
        let mut results = decode_stream(std::iter::repeat(GGA));
        for _ in 0..3 {
            assert!(results.next().unwrap().is_ok());
        }
    }
}
