use clap::{Arg, Command};

pub const TABLES_CMD: &str = "tables";

pub fn create_tables_cli() -> Command {
    Command::new(TABLES_CMD)
        .about("Write one tab separated table per analysis in a result store.")
        .arg(
            Arg::new("infile")
                .required(true)
                .help("The result store"),
        )
        .arg(
            Arg::new("template")
                .long("template")
                .short('t')
                .help("Output path template, e.g. '{analysis}.tsv'"),
        )
}
