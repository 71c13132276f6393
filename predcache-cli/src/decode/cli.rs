use clap::{Arg, ArgAction, Command};

pub const DECODE_CMD: &str = "decode";

pub fn create_decode_cli() -> Command {
    Command::new(DECODE_CMD)
        .about("Fan stored results back out to every original sequence name.")
        .arg(
            Arg::new("map")
                .required(true)
                .help("The identifier mapping table written by encode"),
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .help("The result store to decode"),
        )
        .arg(
            Arg::new("template")
                .long("template")
                .short('t')
                .help("Output path template, e.g. '{filename_noext}.ldjson'"),
        )
        .arg(
            Arg::new("stream")
                .long("stream")
                .action(ArgAction::SetTrue)
                .help("Decode every line in store order instead of only the current records"),
        )
}
