use {
    anyhow::Context,
    jiff::{
        Timestamp,
        fmt::{StdFmtWrite, strtime, temporal},
        tz::TimeZone,
    },
};

use crate::args::Usage;

/// The strtime layout every timestamp is rendered in.
///
/// This is the compact UTC layout recurring-task tooling exchanges, e.g.
/// `20210729T000000Z`. Rendering always happens in UTC, regardless of which
/// time zone drove the offset arithmetic that produced the instant.
pub const LAYOUT: &str = "%Y%m%dT%H%M%SZ";

/// An instant in time parsed from user input.
///
/// The representation is an absolute point on the UTC timeline. Arithmetic
/// on it never consults a time zone; time zones only come into play when a
/// UTC offset is looked up or when the instant is rendered.
///
/// This type exists primarily as a target for trait impls tailoring parsing
/// and rendering to the supported layout.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Stamp {
    ts: Timestamp,
}

impl Stamp {
    pub const ARG_START: Usage = Usage::arg(
        "<start>",
        "The window's inclusive lower bound, e.g. `20210729T000000Z`.",
        r#"
The window's inclusive lower bound.

The supported layout is `YYYYMMDDTHHMMSSZ`, e.g. `20210729T000000Z`, read as
UTC. The first generated timestamp is anchored at or near this bound
according to the requested period's anchor rule.
"#,
    );

    pub const ARG_END: Usage = Usage::arg(
        "<end>",
        "The window's exclusive upper bound, e.g. `20210729T040000Z`.",
        r#"
The window's exclusive upper bound.

The supported layout is `YYYYMMDDTHHMMSSZ`, e.g. `20210729T040000Z`, read as
UTC. No generated timestamp is ever at or past this bound; a window that
contains no firing point at all yields empty output, not an error.
"#,
    );

    /// Returns the underlying instant.
    pub fn get(&self) -> Timestamp {
        self.ts
    }
}

impl From<Timestamp> for Stamp {
    fn from(ts: Timestamp) -> Stamp {
        Stamp { ts }
    }
}

impl std::fmt::Display for Stamp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let dt = TimeZone::UTC.to_datetime(self.ts);
        let tm = strtime::BrokenDownTime::from(dt);
        tm.format(LAYOUT, &mut StdFmtWrite(f)).map_err(|_| std::fmt::Error)
    }
}

impl std::str::FromStr for Stamp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Stamp> {
        static PARSER: temporal::DateTimeParser =
            temporal::DateTimeParser::new();

        let ts = PARSER.parse_timestamp(s).with_context(|| {
            format!(
                "`{s}` is not a supported timestamp \
                 (the supported layout is `YYYYMMDDTHHMMSSZ`, \
                 e.g. `20210729T000000Z`)",
            )
        })?;
        Ok(Stamp { ts })
    }
}

impl serde::Serialize for Stamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
