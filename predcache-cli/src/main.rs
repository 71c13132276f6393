mod decode;
mod encode;
mod precomputed;
mod progress;
mod tables;
mod wrap;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};

use predcache_core::config::CacheConfig;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "predcache";
    pub const BIN_NAME: &str = "predcache";

    pub const CONFIG_ARG: &str = "config";
    pub const VERBOSE_ARG: &str = "verbose";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Content-addressed result cache for protein prediction pipelines.")
        .subcommand_required(true)
        .arg(
            Arg::new(consts::CONFIG_ARG)
                .long("config")
                .global(true)
                .help("TOML configuration file. Defaults to $PREDCACHE_CONFIG if set"),
        )
        .arg(
            Arg::new(consts::VERBOSE_ARG)
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug messages"),
        )
        .subcommand(encode::cli::create_encode_cli())
        .subcommand(precomputed::cli::create_precomputed_cli())
        .subcommand(decode::cli::create_decode_cli())
        .subcommand(tables::cli::create_tables_cli())
        .subcommand(wrap::cli::create_wrap_cli())
}

/// `RUST_LOG` wins over the default level when set.
fn init_logging(matches: &ArgMatches) {
    let level = if matches.get_flag(consts::VERBOSE_ARG) {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(matches: &ArgMatches) -> Result<CacheConfig> {
    let explicit = matches.get_one::<String>(consts::CONFIG_ARG).map(Path::new);
    CacheConfig::resolve(explicit).with_context(|| "Failed to load the configuration")
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    init_logging(&matches);
    let config = load_config(&matches)?;
    log::debug!("{} {} using {:?}", consts::PKG_NAME, consts::VERSION, config);

    match matches.subcommand() {
        //
        // ENCODE
        //
        Some((encode::cli::ENCODE_CMD, matches)) => {
            encode::handlers::run_encode(matches, &config)?;
        }

        //
        // PRECOMPUTED
        //
        Some((precomputed::cli::PRECOMPUTED_CMD, matches)) => {
            precomputed::handlers::run_precomputed(matches, &config)?;
        }

        //
        // DECODE
        //
        Some((decode::cli::DECODE_CMD, matches)) => {
            decode::handlers::run_decode(matches, &config)?;
        }

        //
        // TABLES
        //
        Some((tables::cli::TABLES_CMD, matches)) => {
            tables::handlers::run_tables(matches, &config)?;
        }

        //
        // WRAP
        //
        Some((wrap::cli::WRAP_CMD, matches)) => {
            wrap::handlers::run_wrap(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
