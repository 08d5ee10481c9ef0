use {
    anyhow::Context,
    jiff::{
        Timestamp,
        fmt::{StdFmtWrite, temporal},
        tz::Offset,
    },
};

use crate::args::Usage;

/// The time zone whose offset history a generated sequence is reconciled
/// against.
///
/// This is a thin wrapper over the platform's time zone database. Its one
/// job beyond resolution is answering "what UTC offset was in effect at
/// this instant", which is where daylight saving time state comes from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimeZone {
    tz: jiff::tz::TimeZone,
}

impl TimeZone {
    pub const ARG: Usage = Usage::arg(
        "<time-zone>",
        "A time zone string, e.g., `Europe/Athens` or `+02:00`.",
        r#"
A time zone string.

This is usually an IANA time zone identifier such as `Europe/Athens` or
`America/New_York`, resolved against the system's time zone database (or the
bundled copy when the system has none). Specific offsets such as `+02:00`
and POSIX time zone strings are also accepted, though fixed offsets never
have daylight saving transitions to reconcile.

The special string `system` refers to the time zone detected from your
system's configuration, which can be overridden via the `TZ` environment
variable.
"#,
    );

    pub fn system() -> TimeZone {
        TimeZone { tz: crate::TZ.clone() }
    }

    pub fn get(&self) -> &jiff::tz::TimeZone {
        &self.tz
    }

    /// Returns the UTC offset in effect in this time zone at the given
    /// instant.
    pub fn offset_at(&self, ts: Timestamp) -> Offset {
        self.tz.to_offset(ts)
    }
}

impl std::fmt::Display for TimeZone {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        static PRINTER: temporal::DateTimePrinter =
            temporal::DateTimePrinter::new();

        PRINTER
            .print_time_zone(&self.tz, StdFmtWrite(f))
            .map_err(|_| std::fmt::Error)
    }
}

impl std::str::FromStr for TimeZone {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<TimeZone> {
        static PARSER: temporal::DateTimeParser =
            temporal::DateTimeParser::new();

        if s == "system" {
            return Ok(TimeZone::system());
        }
        let tz = PARSER.parse_time_zone(s).with_context(|| {
            format!("`{s}` is not a recognized time zone")
        })?;
        Ok(TimeZone { tz })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_iana_identifiers() {
        let tz: TimeZone = "Europe/Athens".parse().unwrap();
        let winter: Timestamp = "2021-01-15T12:00:00Z".parse().unwrap();
        let summer: Timestamp = "2021-07-15T12:00:00Z".parse().unwrap();
        assert_eq!(tz.offset_at(winter).seconds(), 2 * 60 * 60);
        assert_eq!(tz.offset_at(summer).seconds(), 3 * 60 * 60);
    }

    #[test]
    fn fixed_offsets_never_drift() {
        let tz: TimeZone = "+02:00".parse().unwrap();
        let winter: Timestamp = "2021-01-15T12:00:00Z".parse().unwrap();
        let summer: Timestamp = "2021-07-15T12:00:00Z".parse().unwrap();
        assert_eq!(tz.offset_at(winter), tz.offset_at(summer));
    }

    #[test]
    fn rejects_unknown_identifiers() {
        let err = "Narnia/Lantern".parse::<TimeZone>().unwrap_err();
        let msg = format!("{err:#}");
        assert!(
            msg.contains("Narnia/Lantern"),
            "error should name the offending identifier: {msg}",
        );
    }
}
