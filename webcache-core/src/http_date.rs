//! HTTP-date rendering for `Last-Modified` headers.

use chrono::{DateTime, Utc};

/// IMF-fixdate layout from RFC 7231, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Formats `dt` as an HTTP-date.
pub fn fmt_http_date(dt: DateTime<Utc>) -> String {
    dt.format(IMF_FIXDATE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch() {
        assert_eq!(
            fmt_http_date(DateTime::<Utc>::UNIX_EPOCH),
            "Thu, 01 Jan 1970 00:00:00 GMT"
        );
    }

    #[test]
    fn test_rfc_example() {
        let dt = DateTime::parse_from_rfc3339("1994-11-06T08:49:37Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(fmt_http_date(dt), "Sun, 06 Nov 1994 08:49:37 GMT");
    }
}
