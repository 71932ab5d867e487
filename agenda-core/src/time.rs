//! Deadline input parsing and display formatting.
//!
//! Input is a fixed `DD/MM/YYYY` + `HH:MM` wall-clock pair interpreted in a
//! configured IANA timezone, converted to UTC. Parsing is lenient: anything
//! that does not resolve to a single instant becomes the "no deadline"
//! sentinel instead of an error. Callers wanting strict validation must
//! validate before handing the strings over.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::task::Deadline;

pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Parse a `date` + `time` pair in `tz` into a UTC instant.
///
/// Returns `None` for malformed input and for local times that do not map to
/// exactly one instant (DST gaps and folds).
pub fn parse_deadline(date: &str, time: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let ndt = NaiveDateTime::parse_from_str(&format!("{date} {time}"), DATE_TIME_FORMAT).ok()?;
    tz.from_local_datetime(&ndt)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Render a deadline in `tz` using the input format, or `no deadline`.
pub fn format_deadline(deadline: Deadline, tz: Tz) -> String {
    match deadline.0 {
        Some(instant) => instant.with_timezone(&tz).format(DATE_TIME_FORMAT).to_string(),
        None => "no deadline".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    #[test]
    fn parses_fixed_format_in_timezone() {
        let tz: Tz = "America/Chicago".parse().unwrap();
        // Feb is CST (UTC-6)
        let utc = parse_deadline("20/02/2030", "23:59", tz).unwrap();
        assert_eq!(utc.to_rfc3339(), "2030-02-21T05:59:00+00:00");
    }

    #[test]
    fn garbage_input_is_no_deadline() {
        assert!(parse_deadline("not-a-date", "xx:yy", chrono_tz::UTC).is_none());
        assert!(parse_deadline("", "", chrono_tz::UTC).is_none());
        assert!(parse_deadline("31/02/2030", "10:00", chrono_tz::UTC).is_none());
        // US format rejected: month 13 does not exist
        assert!(parse_deadline("12/31/2030", "10:00", chrono_tz::UTC).is_none());
    }

    #[test]
    fn dst_gap_is_no_deadline() {
        let tz: Tz = "America/Chicago".parse().unwrap();
        // 2:30am on the spring-forward night never happens
        assert!(parse_deadline("09/03/2025", "02:30", tz).is_none());
    }

    #[test]
    fn formats_round_trip_and_sentinel() {
        let utc = parse_deadline("31/12/2030", "23:59", chrono_tz::UTC).unwrap();
        assert_eq!(
            format_deadline(Deadline::at(utc), chrono_tz::UTC),
            "31/12/2030 23:59"
        );
        assert_eq!(format_deadline(Deadline::NONE, chrono_tz::UTC), "no deadline");
    }
}
