use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use predcache_core::config::CacheConfig;
use predcache_core::utils::get_dynamic_reader;
use predcache_decode::{DecodeOptions, Decoder};
use predcache_encode::read_mapping_table;
use predcache_index::CacheIndex;

use crate::progress::spinner;

pub fn run_decode(matches: &ArgMatches, config: &CacheConfig) -> Result<()> {
    let map = matches
        .get_one::<String>("map")
        .expect("A mapping table is required.");
    let infile = matches
        .get_one::<String>("infile")
        .expect("A result store is required.");
    let stream = matches.get_flag("stream");

    let opts = DecodeOptions {
        template: matches
            .get_one::<String>("template")
            .cloned()
            .unwrap_or_else(|| config.decode.template.clone()),
        chunk_size: config.decode.chunk_size,
    };

    let mapping = read_mapping_table(Path::new(map))
        .with_context(|| format!("Failed to read mapping table {}", map))?;
    let mut decoder = Decoder::new(mapping, &opts)?;

    let store = Path::new(infile);
    let pb = spinner(format!("Decoding {}", store.display()));
    if stream {
        decoder
            .decode_stream(get_dynamic_reader(store)?)
            .with_context(|| format!("Failed to decode {}", store.display()))?;
    } else {
        let index = CacheIndex::from_path(store)
            .with_context(|| format!("Failed to index {}", store.display()))?;
        let mut source = File::open(store)?;
        decoder
            .decode_indexed(&index, &mut source)
            .with_context(|| format!("Failed to decode {}", store.display()))?;
    }

    let summary = decoder.finish()?;
    pb.finish_with_message(format!(
        "Wrote {} lines to {} files",
        summary.n_lines,
        summary.files.len()
    ));
    Ok(())
}
