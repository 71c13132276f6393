use std::fs::OpenOptions;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::PathBuf;

use fxhash::FxHashSet as HashSet;
use serde_json::Value;

use predcache_core::consts::{
    DEFAULT_FASTA_LINE_WIDTH, DEFAULT_PRECOMPUTED_CHUNK_SIZE, DEFAULT_PRECOMPUTED_TEMPLATE,
};
use predcache_core::errors::Result;
use predcache_core::fasta::write_fasta_record;
use predcache_core::models::{CacheKey, set_record_name};
use predcache_core::utils::create_parent_dirs;
use predcache_index::{CacheIndex, ChecksumSelector, KeySelector};

use crate::sequences::EncodedSequence;

#[derive(Clone, Debug)]
pub struct SplitOptions {
    /// Path template of the per-target FASTA of sequences still to compute.
    pub template: String,
    /// Cached lines buffered before they are written out.
    pub chunk_size: usize,
    pub line_width: usize,
}

impl Default for SplitOptions {
    fn default() -> Self {
        SplitOptions {
            template: DEFAULT_PRECOMPUTED_TEMPLATE.to_string(),
            chunk_size: DEFAULT_PRECOMPUTED_CHUNK_SIZE,
            line_width: DEFAULT_FASTA_LINE_WIDTH,
        }
    }
}

/// Progress of one target through [`split`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyState {
    NotStarted,
    Querying,
    EmittingCached,
    ComputingRemaining,
    Done,
}

/// The split of the input sequences for one target key.
#[derive(Clone, Debug)]
pub struct TargetSplit {
    pub key: CacheKey,
    pub state: KeyState,
    /// Checksums whose result was reused.
    pub done: HashSet<String>,
    /// Encoded ids still to compute, in input order.
    pub remaining: Vec<String>,
    /// Number of cached lines emitted for this key.
    pub n_cached: usize,
}

impl TargetSplit {
    fn new(key: CacheKey) -> Self {
        TargetSplit {
            key,
            state: KeyState::NotStarted,
            done: HashSet::default(),
            remaining: Vec::new(),
            n_cached: 0,
        }
    }

    fn advance(&mut self, state: KeyState) {
        log::debug!("{}: {:?} -> {:?}", self.key, self.state, state);
        self.state = state;
    }

    pub fn remaining_set(&self) -> HashSet<&str> {
        self.remaining.iter().map(String::as_str).collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SplitOutcome {
    pub targets: Vec<TargetSplit>,
}

impl SplitOutcome {
    pub fn get(&self, key: &CacheKey) -> Option<&TargetSplit> {
        self.targets.iter().find(|t| &t.key == key)
    }

    pub fn n_cached(&self) -> usize {
        self.targets.iter().map(|t| t.n_cached).sum()
    }
}

fn rewrite_line(line: &str, encoded_id: &str) -> Result<String> {
    let mut record: Value = serde_json::from_str(line)?;
    set_record_name(&mut record, encoded_id)?;
    Ok(serde_json::to_string(&record)?)
}

///
/// Split the input sequences into cache hits and sequences still to compute.
///
/// For each target, every sequence whose checksum has a record under exactly
/// that key is a hit: its stored line is written to `cached_out`, renamed to
/// the sequence's current encoded id. Everything else is left in
/// [`TargetSplit::remaining`]. A target without a software version is never
/// looked up, so all of its sequences remain.
///
/// Repeated targets are processed once.
///
/// # Arguments
///
/// - targets: the requested cache keys
/// - sequences: the sequences of the current run
/// - index: the index of `source`
/// - source: the result store, opened for reading
/// - cached_out: where to write reused result lines
/// - opts: output chunking
///
pub fn split<R, W>(
    targets: &[CacheKey],
    sequences: &[EncodedSequence],
    index: &CacheIndex,
    source: &mut R,
    cached_out: &mut W,
    opts: &SplitOptions,
) -> Result<SplitOutcome>
where
    R: Read + Seek,
    W: Write,
{
    let chunk_size = opts.chunk_size.max(1);
    let mut chunk: Vec<u8> = Vec::new();
    let mut in_chunk = 0;

    let mut outcome = SplitOutcome::default();
    let mut processed: HashSet<&CacheKey> = HashSet::default();

    for key in targets {
        if !processed.insert(key) {
            log::warn!("Ignoring repeated target {}", key);
            continue;
        }
        let mut target = TargetSplit::new(key.clone());

        if key.is_cacheable() {
            target.advance(KeyState::Querying);
            for seq in sequences {
                if !index.contains(key, &seq.checksum) {
                    continue;
                }
                if target.state != KeyState::EmittingCached {
                    target.advance(KeyState::EmittingCached);
                }

                let fetched = index.fetch(
                    source,
                    KeySelector::One(key),
                    ChecksumSelector::One(&seq.checksum),
                );
                for item in fetched {
                    let (_, line) = item?;
                    writeln!(chunk, "{}", rewrite_line(&line, &seq.encoded_id)?)?;
                    target.n_cached += 1;

                    in_chunk += 1;
                    if in_chunk == chunk_size {
                        cached_out.write_all(&chunk)?;
                        chunk.clear();
                        in_chunk = 0;
                    }
                }
                target.done.insert(seq.checksum.clone());
            }
        } else {
            log::info!("{} has no software version, so nothing is reused", key);
        }

        target.advance(KeyState::ComputingRemaining);
        target.remaining = sequences
            .iter()
            .filter(|s| !target.done.contains(&s.checksum))
            .map(|s| s.encoded_id.clone())
            .collect();

        log::info!(
            "{}: {} cached, {} to compute",
            key,
            target.n_cached,
            target.remaining.len()
        );
        target.advance(KeyState::Done);
        outcome.targets.push(target);
    }

    cached_out.write_all(&chunk)?;
    cached_out.flush()?;
    Ok(outcome)
}

///
/// Write one FASTA per target holding the sequences it still needs.
///
/// A file is written for every target, empty when everything was cached, so
/// that downstream steps always find their input. Returns the paths written.
///
pub fn write_remaining_fasta(
    outcome: &SplitOutcome,
    sequences: &[EncodedSequence],
    opts: &SplitOptions,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(outcome.targets.len());

    for target in &outcome.targets {
        let path = PathBuf::from(target.key.render(&opts.template)?);
        let first_write = !written.contains(&path);
        if !first_write {
            log::warn!(
                "Template '{}' maps several targets to {}, later ones are appended",
                opts.template,
                path.display()
            );
        }
        create_parent_dirs(&path)?;

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(!first_write)
            .truncate(first_write)
            .open(&path)?;
        let mut writer = BufWriter::new(file);

        let remaining = target.remaining_set();
        let mut seen: HashSet<&str> = HashSet::default();
        for seq in sequences {
            let id = seq.encoded_id.as_str();
            if remaining.contains(id) && seen.insert(id) {
                write_fasta_record(&mut writer, id, &seq.sequence, opts.line_width)?;
            }
        }
        writer.flush()?;
        log::debug!("Wrote {} sequences to {}", seen.len(), path.display());

        if first_write {
            written.push(path);
        }
    }

    Ok(written)
}
