use clap::{Arg, ArgAction, Command, value_parser};

pub const ENCODE_CMD: &str = "encode";

pub fn create_encode_cli() -> Command {
    Command::new(ENCODE_CMD)
        .about("Give every distinct sequence a short id and record where each original came from.")
        .arg(
            Arg::new("outfasta")
                .required(true)
                .help("Where to write the deduplicated, renamed sequences"),
        )
        .arg(
            Arg::new("outmap")
                .required(true)
                .help("Where to write the identifier mapping table"),
        )
        .arg(
            Arg::new("infiles")
                .required(true)
                .num_args(1..)
                .action(ArgAction::Append)
                .help("FASTA files to encode, optionally gzipped"),
        )
        .arg(
            Arg::new("length")
                .long("length")
                .short('l')
                .value_parser(value_parser!(usize))
                .help("Number of base-36 digits after the prefix"),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .short('p')
                .help("Prefix of every short id"),
        )
}
