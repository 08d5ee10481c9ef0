use std::io::Write;

use anyhow::Context;

use crate::{
    args::{self, Usage},
    period::Period,
    sequence,
    timestamp::Stamp,
    timezone::TimeZone,
};

const USAGE: &'static str = r#"
Generate the periodic timestamps of a recurring task inside a time window.

Given a recurrence period, a half-open window `[<start>, <end>)` and a time
zone, this prints every instant at which the task fires inside the window, in
chronological order, one per line. The window's end is exclusive, and a
window containing no firing point produces no output at all (this is not an
error).

The first timestamp is anchored at or near `<start>` according to the
period's rule: hourly and daily tasks fire at `<start>` rounded to its
nearest hour, monthly tasks fire on the last day of each month, and yearly
tasks on the last day of December. Daily, monthly and yearly sequences keep
their local wall-clock hour in `<time-zone>` stable across daylight saving
time transitions, which is visible in the output as a UTC offset jump.

USAGE:
    ptlist gen <period> <start> <end> <time-zone>

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    Five hourly firing points:

        $ ptlist gen 1h 20210729T000000Z 20210729T050000Z Europe/Athens
        20210729T000000Z
        20210729T010000Z
        20210729T020000Z
        20210729T030000Z
        20210729T040000Z

    %snip-start%

    A daily task anchored at 21:00 UTC, crossing the end of summer time on
    2021-10-31 (the UTC hour shifts so that the Athens wall clock stays
    put):

        $ ptlist gen 1d 20211029T204603Z 20211103T123456Z Europe/Athens
        20211029T210000Z
        20211030T210000Z
        20211031T220000Z
        20211101T220000Z
        20211102T220000Z

    Month ends as a JSON array:

        $ ptlist gen --json 1mo 20210214T214603Z 20210515T123456Z Europe/Athens
        ["20210228T220000Z","20210331T210000Z","20210430T210000Z"]

    %snip-end%
REQUIRED ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut config = Config::default();
    args::configure(p, USAGE, &mut [&mut config])?;

    let period = config.period()?;
    let (t1, t2) = config.window()?;
    let tz = config.time_zone()?;

    let start = std::time::Instant::now();
    let timestamps = sequence::matching_timestamps(period, t1, t2, &tz)?;
    log::debug!(
        "generated {len} timestamps for period `{period}` \
         in [{t1}, {t2}) against {tz} ({elapsed:?})",
        len = timestamps.len(),
        elapsed = start.elapsed(),
    );

    let mut wtr = std::io::stdout().lock();
    if config.json {
        serde_json::to_writer(&mut wtr, &timestamps)?;
        writeln!(wtr)?;
    } else {
        for timestamp in timestamps.iter() {
            writeln!(wtr, "{timestamp}")?;
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Config {
    period: Option<Period>,
    start: Option<Stamp>,
    end: Option<Stamp>,
    tz: Option<TimeZone>,
    json: bool,
}

impl Config {
    fn period(&self) -> anyhow::Result<Period> {
        self.period.context("missing required <period>")
    }

    fn window(&self) -> anyhow::Result<(Stamp, Stamp)> {
        let t1 = self.start.context("missing required <start>")?;
        let t2 = self.end.context("missing required <end>")?;
        anyhow::ensure!(
            t1 <= t2,
            "start point `{t1}` is after end point `{t2}`",
        );
        Ok((t1, t2))
    }

    fn time_zone(&self) -> anyhow::Result<TimeZone> {
        self.tz.clone().context("missing required <time-zone>")
    }
}

impl args::Configurable for Config {
    fn configure(
        &mut self,
        _: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        use lexopt::Arg::*;

        match *arg {
            Value(ref v) => {
                let v = v
                    .to_str()
                    .with_context(|| format!("{v:?} is not valid UTF-8"))?;
                if self.period.is_none() {
                    self.period = Some(v.parse()?);
                } else if self.start.is_none() {
                    self.start = Some(v.parse().context("<start>")?);
                } else if self.end.is_none() {
                    self.end = Some(v.parse().context("<end>")?);
                } else if self.tz.is_none() {
                    self.tz = Some(v.parse().context("<time-zone>")?);
                } else {
                    return Ok(false);
                }
            }
            Long("json") => self.json = true,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const JSON: Usage = Usage::flag(
            "--json",
            "Print the timestamps as a single JSON array.",
            r#"
Print the timestamps as a single JSON array instead of line delimited text.

An empty window renders as `[]`.
"#,
        );

        &[Period::ARG, Stamp::ARG_START, Stamp::ARG_END, TimeZone::ARG, JSON]
    }
}
