use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use predcache_core::models::Analysis;
use predcache_core::utils::{create_parent_dirs, get_dynamic_reader};
use predcache_encode::{WrapOptions, identities_from_fasta, wrap_records};

pub fn run_wrap(matches: &ArgMatches) -> Result<()> {
    let analysis: Analysis = matches
        .get_one::<String>("analysis")
        .expect("An analysis is required.")
        .parse()?;
    let infile = matches
        .get_one::<String>("infile")
        .expect("An input file is required.");
    let infasta = matches
        .get_one::<String>("infasta")
        .expect("An input FASTA is required.");

    let opts = WrapOptions {
        software: matches.get_one::<String>("software").cloned(),
        database: matches.get_one::<String>("database").cloned(),
        pipeline_version: matches.get_one::<String>("pipeline-version").cloned(),
        software_version: matches.get_one::<String>("software-version").cloned(),
        database_version: matches.get_one::<String>("database-version").cloned(),
    };
    if opts.software_version.is_none() {
        log::warn!("No --software-version given, these records will never be reused");
    }

    let identities = identities_from_fasta(Path::new(infasta))
        .with_context(|| format!("Failed to read sequences from {}", infasta))?;
    let input = get_dynamic_reader(Path::new(infile))?;

    let mut out: Box<dyn Write> = match matches.get_one::<String>("outfile") {
        Some(outfile) => {
            let path = Path::new(outfile);
            create_parent_dirs(path)?;
            Box::new(BufWriter::new(File::create(path).with_context(|| {
                format!("Failed to create {}", path.display())
            })?))
        }
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    wrap_records(analysis, input, &identities, &opts, &mut out)
        .with_context(|| format!("Failed to wrap {}", infile))?;
    Ok(())
}
