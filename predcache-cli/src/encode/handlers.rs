use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;

use predcache_core::config::CacheConfig;
use predcache_core::utils::create_parent_dirs;
use predcache_encode::{EncodeOptions, Encoder, IdConverter, encode_fasta_files};

use crate::progress::spinner;

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    create_parent_dirs(path)?;
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

pub fn run_encode(matches: &ArgMatches, config: &CacheConfig) -> Result<()> {
    let outfasta = matches
        .get_one::<String>("outfasta")
        .expect("An output FASTA path is required.");
    let outmap = matches
        .get_one::<String>("outmap")
        .expect("An output mapping table path is required.");
    let infiles: Vec<PathBuf> = matches
        .get_many::<String>("infiles")
        .expect("At least one input FASTA is required.")
        .map(PathBuf::from)
        .collect();

    let prefix = matches
        .get_one::<String>("prefix")
        .unwrap_or(&config.encode.prefix);
    let length = matches
        .get_one::<usize>("length")
        .copied()
        .unwrap_or(config.encode.length);
    if length == 0 {
        anyhow::bail!("--length must be at least 1");
    }

    let mut fasta_out = create_output(Path::new(outfasta))?;
    let mut map_out = create_output(Path::new(outmap))?;
    let mut encoder = Encoder::new(IdConverter::new(prefix, length));
    let opts = EncodeOptions {
        chunk_size: config.encode.chunk_size,
        line_width: config.encode.line_width,
    };

    let pb = spinner(format!("Encoding {} FASTA files", infiles.len()));
    let summary = encode_fasta_files(&infiles, &mut encoder, &mut fasta_out, &mut map_out, opts)
        .with_context(|| "Failed to encode sequences")?;
    pb.finish_with_message(format!(
        "Encoded {} sequences into {} ids",
        summary.n_records, summary.n_distinct
    ));

    Ok(())
}
