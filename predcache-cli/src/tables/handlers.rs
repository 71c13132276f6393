use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use predcache_core::config::CacheConfig;
use predcache_index::{CacheIndex, write_analysis_tables};

pub fn run_tables(matches: &ArgMatches, config: &CacheConfig) -> Result<()> {
    let infile = matches
        .get_one::<String>("infile")
        .expect("A result store is required.");
    let template = matches
        .get_one::<String>("template")
        .unwrap_or(&config.tables.template);

    let store = Path::new(infile);
    let index = CacheIndex::from_path(store)
        .with_context(|| format!("Failed to index {}", store.display()))?;
    let mut source = File::open(store)?;

    let written = write_analysis_tables(&index, &mut source, template)
        .with_context(|| "Failed to write analysis tables")?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
