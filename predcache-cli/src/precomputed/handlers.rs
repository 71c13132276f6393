use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use predcache_core::config::CacheConfig;
use predcache_core::models::read_targets;
use predcache_core::utils::create_parent_dirs;
use predcache_index::CacheIndex;
use predcache_precomputed::{SplitOptions, read_encoded_sequences, split, write_remaining_fasta};

use crate::progress::spinner;

pub fn run_precomputed(matches: &ArgMatches, config: &CacheConfig) -> Result<()> {
    let analyses = matches
        .get_one::<String>("analyses")
        .expect("A targets file is required.");
    let inldjson = matches
        .get_one::<String>("inldjson")
        .expect("A result store is required.");
    let infasta = matches
        .get_one::<String>("infasta")
        .expect("An input FASTA is required.");

    let opts = SplitOptions {
        template: matches
            .get_one::<String>("template")
            .cloned()
            .unwrap_or_else(|| config.precomputed.template.clone()),
        chunk_size: config.precomputed.chunk_size,
        line_width: config.precomputed.line_width,
    };

    let targets = read_targets(Path::new(analyses))
        .with_context(|| format!("Failed to read targets from {}", analyses))?;
    let sequences = read_encoded_sequences(Path::new(infasta))
        .with_context(|| format!("Failed to read sequences from {}", infasta))?;

    let store = Path::new(inldjson);
    let pb = spinner(format!("Indexing {}", store.display()));
    let index = CacheIndex::from_path(store)
        .with_context(|| format!("Failed to index {}", store.display()))?;
    pb.finish_with_message(format!("Indexed {} records", index.len()));

    let mut source = File::open(store)?;
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

    let outcome = split(&targets, &sequences, &index, &mut source, &mut out, &opts)
        .with_context(|| "Failed to split the work")?;
    let written = write_remaining_fasta(&outcome, &sequences, &opts)
        .with_context(|| "Failed to write the remaining sequences")?;

    log::info!(
        "Reused {} results, wrote {} FASTA files",
        outcome.n_cached(),
        written.len()
    );
    Ok(())
}
