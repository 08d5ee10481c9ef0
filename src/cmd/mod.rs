mod r#gen;
mod periods;

const USAGE: &'static str = "\
A utility for listing the periodic timestamps of recurring tasks.

USAGE:
    ptlist <command> ...

COMMANDS:
    gen      Generate the periodic timestamps inside a time window
    periods  List the supported recurrence periods
";

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let cmd = crate::args::next_as_command(USAGE, p)?;
    match &*cmd {
        "gen" => r#gen::run(p),
        "periods" => periods::run(p),
        unk => anyhow::bail!("unrecognized command '{}'", unk),
    }
}
