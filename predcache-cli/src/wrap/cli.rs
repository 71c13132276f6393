use clap::{Arg, Command};

pub const WRAP_CMD: &str = "wrap";

fn optional(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

pub fn create_wrap_cli() -> Command {
    Command::new(WRAP_CMD)
        .about("Turn parsed tool output into checksum-keyed result records.")
        .arg(
            Arg::new("analysis")
                .required(true)
                .help("The analysis that produced the records, e.g. 'phobius'"),
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .help("One JSON object per line, as written by the tool parser"),
        )
        .arg(
            Arg::new("infasta")
                .required(true)
                .help("The sequences the tool was run on"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .help("Where to write the records. Defaults to stdout"),
        )
        .arg(optional("software", "Name of the tool"))
        .arg(optional("database", "Name of the database searched"))
        .arg(optional("software-version", "Version of the tool"))
        .arg(optional("database-version", "Version of the database"))
        .arg(optional("pipeline-version", "Version of the pipeline"))
}
