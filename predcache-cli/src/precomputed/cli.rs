use clap::{Arg, Command};

pub const PRECOMPUTED_CMD: &str = "precomputed";

pub fn create_precomputed_cli() -> Command {
    Command::new(PRECOMPUTED_CMD)
        .about("Reuse stored results and write the sequences each analysis still needs.")
        .arg(
            Arg::new("analyses")
                .required(true)
                .help("Tab separated targets: analysis, software version, database version"),
        )
        .arg(
            Arg::new("inldjson")
                .required(true)
                .help("The result store to reuse results from"),
        )
        .arg(
            Arg::new("infasta")
                .required(true)
                .help("The encoded sequences of this run"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .help("Where to write the reused results. Defaults to stdout"),
        )
        .arg(
            Arg::new("template")
                .long("template")
                .short('t')
                .help("Path template of the FASTA to compute per analysis, e.g. '{analysis}.fasta'"),
        )
}
