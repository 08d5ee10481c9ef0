use jiff::{RoundMode, Timestamp, TimestampRound, ToSpan, Unit, civil, tz::TimeZone};

use crate::args::Usage;

/// The closed set of recurrence periods that a task can fire at.
///
/// Each period knows how to anchor the first firing point at or near the
/// start of a window, and how to advance from one firing point to the next.
/// Calendar periods (month, year) step by re-resolving the last day of the
/// next month or year rather than by a fixed duration, since months and
/// years have irregular lengths.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Period {
    Hour,
    Day,
    Month,
    Year,
}

impl Period {
    /// All supported periods, in increasing order of length.
    pub const ALL: &'static [Period] =
        &[Period::Hour, Period::Day, Period::Month, Period::Year];

    pub const ARG: Usage = Usage::arg(
        "<period>",
        "A recurrence period code: `1h`, `1d`, `1mo` or `1y`.",
        r#"
A recurrence period code.

The supported codes are `1h` (every hour on the hour), `1d` (every day at the
anchored hour), `1mo` (the last day of every month at the anchored hour) and
`1y` (the last day of December every year at the anchored hour).

The set of codes is closed. Anything else is rejected, and `ptlist periods`
prints the full table.
"#,
    );

    /// Returns the code this period is requested by.
    pub fn code(&self) -> &'static str {
        match *self {
            Period::Hour => "1h",
            Period::Day => "1d",
            Period::Month => "1mo",
            Period::Year => "1y",
        }
    }

    /// A one-line description of when this period fires.
    pub fn description(&self) -> &'static str {
        match *self {
            Period::Hour => "every hour, on the hour",
            Period::Day => "every day, at the anchored hour",
            Period::Month => "the last day of every month, at the anchored hour",
            Period::Year => "the last day of December every year, at the anchored hour",
        }
    }

    /// Returns the first candidate firing point for a window starting at
    /// `t1`.
    ///
    /// For the hour and day periods this is `t1` rounded to its nearest hour
    /// boundary. For the month and year periods it is the last calendar day
    /// of `t1`'s month (or of December in `t1`'s year) at `t1`'s
    /// time-of-day, rounded to the nearest hour. Rounding can roll the
    /// candidate past midnight into a new month; the candidate is then
    /// re-resolved onto that month's last day so the sequence stays on
    /// month ends.
    pub fn anchor(&self, t1: Timestamp) -> anyhow::Result<Timestamp> {
        let candidate = match *self {
            Period::Hour | Period::Day => t1,
            Period::Month => {
                let dt = TimeZone::UTC.to_datetime(t1);
                let last = dt.date().last_of_month();
                to_utc(last.at(dt.hour(), dt.minute(), dt.second(), 0))?
            }
            Period::Year => {
                let dt = TimeZone::UTC.to_datetime(t1);
                let last = civil::date(dt.year(), 12, 31);
                to_utc(last.at(dt.hour(), dt.minute(), dt.second(), 0))?
            }
        };
        let rounded = round_to_hour(candidate)?;
        match *self {
            Period::Hour | Period::Day => Ok(rounded),
            Period::Month | Period::Year => last_of_current_month(rounded),
        }
    }

    /// Advances one firing point to the next, in the absolute frame.
    ///
    /// The result is deliberately uncorrected: reconciling a stepped instant
    /// against the anchor's UTC offset is the sequence generator's job, and
    /// the generator always steps from the uncorrected instant so that a
    /// single offset change is never applied twice.
    pub fn step(&self, current: Timestamp) -> anyhow::Result<Timestamp> {
        match *self {
            Period::Hour => Ok(current.saturating_add(1.hour())?),
            Period::Day => Ok(current.saturating_add(24.hours())?),
            Period::Month => {
                let dt = TimeZone::UTC.to_datetime(current);
                let next = dt
                    .date()
                    .first_of_month()
                    .saturating_add(1.month())
                    .last_of_month();
                to_utc(next.at(
                    dt.hour(),
                    dt.minute(),
                    dt.second(),
                    dt.subsec_nanosecond(),
                ))
            }
            Period::Year => {
                let dt = TimeZone::UTC.to_datetime(current);
                let next = dt.date().saturating_add(1.year()).last_of_month();
                to_utc(next.at(
                    dt.hour(),
                    dt.minute(),
                    dt.second(),
                    dt.subsec_nanosecond(),
                ))
            }
        }
    }

    /// Whether sequences at this period keep the anchor's local wall-clock
    /// hour across UTC offset changes.
    ///
    /// The hour period does not: its step equals the usual offset change
    /// quantum, so shifting candidates by the anchor-relative offset
    /// differential would fold consecutive firing points onto one another at
    /// a spring-forward transition. Hourly sequences step purely in the
    /// absolute frame instead.
    pub(crate) fn pins_wall_clock(&self) -> bool {
        !matches!(*self, Period::Hour)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Period {
    type Err = UnsupportedPeriodError;

    fn from_str(s: &str) -> Result<Period, UnsupportedPeriodError> {
        Period::ALL
            .iter()
            .copied()
            .find(|p| p.code() == s)
            .ok_or_else(|| UnsupportedPeriodError { code: s.to_string() })
    }
}

/// The error returned when a period code is outside the supported set.
///
/// It retains the offending code so that callers can report precisely what
/// was rejected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnsupportedPeriodError {
    code: String,
}

impl UnsupportedPeriodError {
    /// Returns the code that failed to resolve.
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl std::fmt::Display for UnsupportedPeriodError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "unsupported period `{}` (supported periods are \
             `1h`, `1d`, `1mo` and `1y`)",
            self.code,
        )
    }
}

impl std::error::Error for UnsupportedPeriodError {}

/// Rounds to the nearest hour boundary, with the half-hour rounding up.
fn round_to_hour(ts: Timestamp) -> anyhow::Result<Timestamp> {
    let options =
        TimestampRound::new().smallest(Unit::Hour).mode(RoundMode::HalfCeil);
    Ok(ts.round(options)?)
}

/// Re-resolves an instant onto the last day of whatever month it fell into,
/// keeping its time-of-day.
fn last_of_current_month(ts: Timestamp) -> anyhow::Result<Timestamp> {
    let dt = TimeZone::UTC.to_datetime(ts);
    let last = dt.date().last_of_month();
    to_utc(last.at(dt.hour(), dt.minute(), dt.second(), dt.subsec_nanosecond()))
}

fn to_utc(dt: civil::DateTime) -> anyhow::Result<Timestamp> {
    Ok(TimeZone::UTC.to_timestamp(dt)?)
}
