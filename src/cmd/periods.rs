use std::io::Write;

use crate::{
    args::{self, Usage},
    period::Period,
};

const USAGE: &'static str = r#"
List the supported recurrence periods.

The set of period codes is closed: these are the only codes `ptlist gen`
accepts, and anything else is rejected as unsupported.

USAGE:
    ptlist periods

TIP:
    use -h for short docs and --help for long docs

REQUIRED ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut config = Config::default();
    args::configure(p, USAGE, &mut [&mut config])?;

    let mut wtr = std::io::stdout().lock();
    for period in Period::ALL.iter() {
        writeln!(wtr, "{:<4}{}", period.code(), period.description())?;
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Config {}

impl args::Configurable for Config {
    fn configure(
        &mut self,
        _: &mut lexopt::Parser,
        _: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        Ok(false)
    }

    fn usage(&self) -> &[Usage] {
        &[]
    }
}
