use chrono::{DateTime, NaiveDateTime, Utc};

use super::SbsMessage;

/// Minimum comma-separated fields a BaseStation record must carry. Anything
/// shorter is structurally unusable and dropped without a report.
const MIN_FIELDS: usize = 22;

const DATE_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// Parse one newline-stripped SBS-1 record.
///
/// Returns `None` for records with fewer than 22 fields. Individual fields
/// that fail to parse degrade to `None` on the message rather than rejecting
/// the whole record.
pub fn parse(line: &str) -> Option<SbsMessage> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < MIN_FIELDS {
        return None;
    }

    Some(SbsMessage {
        message_type: parts[0].to_string(),
        transmission_type: parts[1].to_string(),
        icao: non_blank(parts[4]),
        callsign: non_blank(parts[10]),
        altitude_ft: parts[11].parse().ok(),
        ground_speed_kt: parts[12].parse().ok(),
        track_deg: parts[13].parse().ok(),
        latitude_deg: parts[14].parse().ok(),
        longitude_deg: parts[15].parse().ok(),
        vertical_rate_fpm: parts[16].parse().ok(),
        on_ground: parse_bool(parts[21]),
        timestamp: parse_timestamp(parts[6], parts[7]),
    })
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

/// Fields 6 and 7 carry the generation date and time as
/// `yyyy/MM/dd` + `HH:mm:ss.fff`, UTC.
fn parse_timestamp(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let combined = format!("{} {}", date.trim(), time.trim());
    NaiveDateTime::parse_from_str(&combined, DATE_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const SAMPLE: &str = "MSG,3,111,11111,4CA1D2,111111,2024/05/17,10:15:30.500,2024/05/17,10:15:30.520,SAS123,37000,450.2,81.5,55.7080,13.0508,64,,,,,0";

    #[test]
    fn parses_full_record() {
        let msg = parse(SAMPLE).expect("record should decode");
        assert_eq!(msg.icao.as_deref(), Some("4CA1D2"));
        assert_eq!(msg.callsign.as_deref(), Some("SAS123"));
        assert_eq!(msg.altitude_ft, Some(37_000));
        assert_eq!(msg.latitude_deg, Some(55.7080));
        assert_eq!(msg.longitude_deg, Some(13.0508));
        assert_eq!(msg.vertical_rate_fpm, Some(64));
        assert_eq!(msg.on_ground, Some(false));
        assert!(msg.has_position());

        let ts = msg.timestamp.expect("timestamp should decode");
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.minute(), 15);
        assert_eq!(ts.second(), 30);
    }

    #[test]
    fn short_record_is_dropped() {
        assert!(parse("MSG,3,111,11111,4CA1D2").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn unparseable_latitude_becomes_absent() {
        let line = SAMPLE.replace("55.7080", "not-a-number");
        let msg = parse(&line).expect("record still decodes");
        assert_eq!(msg.latitude_deg, None);
        assert!(!msg.has_position());
        // The rest of the record is untouched.
        assert_eq!(msg.icao.as_deref(), Some("4CA1D2"));
        assert_eq!(msg.longitude_deg, Some(13.0508));
    }

    #[test]
    fn blank_callsign_and_flags_become_absent() {
        let line = SAMPLE.replace("SAS123", "  ").replace(",0", ",x");
        let msg = parse(&line).expect("record still decodes");
        assert_eq!(msg.callsign, None);
        assert_eq!(msg.on_ground, None);
    }

    #[test]
    fn bad_timestamp_becomes_absent() {
        let line = SAMPLE.replace("10:15:30.500", "25:99:99");
        let msg = parse(&line).expect("record still decodes");
        assert_eq!(msg.timestamp, None);
        assert!(msg.has_position());
    }
}
