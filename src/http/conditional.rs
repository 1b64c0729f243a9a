//! `Last-Modified` / `If-Modified-Since` handling
//!
//! Dates are RFC 7231 IMF-fixdate in GMT with whole-second precision.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::SystemTime;

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

// Obsolete forms recipients must still accept (RFC 7231 7.1.1.1)
const RFC850_DATE: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME_DATE: &str = "%a %b %e %H:%M:%S %Y";

/// Truncate a filesystem timestamp to whole seconds in UTC
pub fn to_http_time(time: SystemTime) -> DateTime<Utc> {
    let dt = DateTime::<Utc>::from(time);
    DateTime::from_timestamp(dt.timestamp(), 0).unwrap_or(dt)
}

/// Format a timestamp as an HTTP date, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    to_http_time(time).format(IMF_FIXDATE).to_string()
}

/// Parse an HTTP date in IMF-fixdate, RFC 850 or asctime form; anything
/// unparseable yields `None`
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    [RFC850_DATE, ASCTIME_DATE]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Decide whether a conditional GET can be answered with 304.
///
/// `If-None-Match` takes precedence over `If-Modified-Since`; since no
/// entity tags are produced, its presence disables the date check.
pub fn is_not_modified(
    if_modified_since: Option<&str>,
    if_none_match: Option<&str>,
    modified: SystemTime,
) -> bool {
    if if_none_match.is_some() {
        return false;
    }
    if_modified_since
        .and_then(parse_http_date)
        .is_some_and(|since| to_http_time(modified) <= since)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // 1994-11-06T08:49:37Z
    fn sample_time() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777)
    }

    #[test]
    fn test_format_http_date() {
        assert_eq!(format_http_date(sample_time()), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_format_truncates_subseconds() {
        let t = sample_time() + Duration::from_millis(900);
        assert_eq!(format_http_date(t), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_parse_round_trip_and_garbage() {
        let parsed = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
        assert_eq!(parsed, to_http_time(sample_time()));
        assert!(parse_http_date("yesterday").is_none());
    }

    #[test]
    fn test_parse_obsolete_date_forms() {
        let expected = to_http_time(sample_time());
        assert_eq!(parse_http_date("Sun Nov  6 08:49:37 1994"), Some(expected));
        assert_eq!(parse_http_date("Sunday, 06-Nov-94 08:49:37 GMT"), Some(expected));
        assert!(is_not_modified(Some("Sun Nov  6 08:49:37 1994"), None, sample_time()));
        assert!(!is_not_modified(
            Some("Sun Nov  6 08:49:36 1994"),
            None,
            sample_time()
        ));
    }

    #[test]
    fn test_is_not_modified() {
        let modified = sample_time() + Duration::from_millis(500);
        let same = "Sun, 06 Nov 1994 08:49:37 GMT";
        let earlier = "Sun, 06 Nov 1994 08:49:36 GMT";

        assert!(is_not_modified(Some(same), None, modified));
        assert!(!is_not_modified(Some(earlier), None, modified));
        assert!(!is_not_modified(Some(same), Some("\"tag\""), modified));
        assert!(!is_not_modified(Some("not a date"), None, modified));
        assert!(!is_not_modified(None, None, modified));
    }
}
