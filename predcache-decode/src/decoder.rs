use std::io::{BufRead, Read, Seek};
use std::path::PathBuf;

use fxhash::FxHashMap as HashMap;
use serde_json::Value;

use predcache_core::consts::{DEFAULT_DECODE_CHUNK_SIZE, DEFAULT_DECODE_TEMPLATE};
use predcache_core::errors::{CacheError, Result};
use predcache_core::models::set_record_name;
use predcache_core::utils::{file_name_without_extension, render_template};
use predcache_encode::IdentifierMapping;
use predcache_index::{CacheIndex, ChecksumSelector, KeySelector};

use crate::writer::FanOutWriter;

#[derive(Clone, Debug)]
pub struct DecodeOptions {
    /// Output path template. `{source_file}` and
    /// `{source_file_without_extension}` are available, with `{filename}` and
    /// `{filename_noext}` as aliases.
    pub template: String,
    /// Lines buffered across all outputs before flushing.
    pub chunk_size: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            template: DEFAULT_DECODE_TEMPLATE.to_string(),
            chunk_size: DEFAULT_DECODE_CHUNK_SIZE,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    pub n_records: usize,
    pub n_lines: usize,
    pub files: Vec<PathBuf>,
}

/// Output path for every mapping row, resolved once per source file.
fn render_output_path(template: &str, source_file: &str) -> Result<PathBuf> {
    let without_extension = file_name_without_extension(source_file);
    let rendered = render_template(
        template,
        &[
            ("source_file", source_file),
            ("source_file_without_extension", &without_extension),
            ("filename", source_file),
            ("filename_noext", &without_extension),
        ],
    )?;
    Ok(PathBuf::from(rendered))
}

///
/// Fan-out of checksum-keyed records to the original sequence names.
///
/// Built from the identifier mapping table. Each decoded record is written
/// once per mapping row sharing its checksum, with the record's name field
/// set to that row's `original_id`.
///
pub struct Decoder {
    by_checksum: HashMap<String, Vec<FanOutTarget>>,
    outputs: Vec<PathBuf>,
    writer: FanOutWriter,
    n_records: usize,
    n_lines: usize,
}

/// One original occurrence of a checksum and the output it goes to.
#[derive(Debug)]
struct FanOutTarget {
    original_id: String,
    output: usize,
}

impl Decoder {
    ///
    /// # Errors
    ///
    /// `InvalidTemplate` if the template cannot be rendered for one of the
    /// source files in `mapping`.
    ///
    pub fn new(mapping: Vec<IdentifierMapping>, opts: &DecodeOptions) -> Result<Self> {
        let mut by_checksum: HashMap<String, Vec<FanOutTarget>> = HashMap::default();
        let mut outputs: Vec<PathBuf> = Vec::new();
        let mut by_source: HashMap<String, usize> = HashMap::default();

        for row in mapping {
            let output = match by_source.get(&row.source_file) {
                Some(&output) => output,
                None => {
                    outputs.push(render_output_path(&opts.template, &row.source_file)?);
                    by_source.insert(row.source_file, outputs.len() - 1);
                    outputs.len() - 1
                }
            };
            by_checksum
                .entry(row.checksum)
                .or_default()
                .push(FanOutTarget {
                    original_id: row.original_id,
                    output,
                });
        }

        log::debug!(
            "Decoder covers {} checksums from {} source files",
            by_checksum.len(),
            outputs.len()
        );
        Ok(Decoder {
            by_checksum,
            outputs,
            writer: FanOutWriter::new(opts.chunk_size),
            n_records: 0,
            n_lines: 0,
        })
    }

    /// Every checksum in the mapping table, sorted.
    pub fn checksums(&self) -> Vec<String> {
        let mut checksums: Vec<String> = self.by_checksum.keys().cloned().collect();
        checksums.sort();
        checksums
    }

    ///
    /// Fan out one stored record line. Blank lines are ignored.
    ///
    /// # Errors
    ///
    /// `UnknownChecksum` if no mapping row has the record's checksum.
    ///
    pub fn decode_line(&mut self, line: &str) -> Result<usize> {
        if line.trim().is_empty() {
            return Ok(0);
        }

        let record: Value = serde_json::from_str(line)?;
        let checksum = record
            .get("checksum")
            .and_then(Value::as_str)
            .ok_or_else(|| CacheError::InvalidRecord("record has no 'checksum' field".to_string()))?;

        let targets = self
            .by_checksum
            .get(checksum)
            .ok_or_else(|| CacheError::UnknownChecksum(checksum.to_string()))?;

        for target in targets {
            let mut copy = record.clone();
            set_record_name(&mut copy, &target.original_id)?;
            self.writer
                .push(&self.outputs[target.output], &serde_json::to_string(&copy)?)?;
        }

        self.n_records += 1;
        self.n_lines += targets.len();
        Ok(targets.len())
    }

    /// Decode a store line by line, in store order.
    pub fn decode_stream<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut n = 0;
        for line in reader.lines() {
            n += self.decode_line(&line?)?;
        }
        Ok(n)
    }

    ///
    /// Decode only the current records for the checksums of the mapping
    /// table, using an index of the store. Records superseded by a later line
    /// and records of unrelated sequences are skipped.
    ///
    pub fn decode_indexed<R: Read + Seek>(
        &mut self,
        index: &CacheIndex,
        source: &mut R,
    ) -> Result<usize> {
        let checksums = self.checksums();
        let mut n = 0;
        for item in index.fetch(source, KeySelector::All, ChecksumSelector::Many(&checksums)) {
            let (_, line) = item?;
            n += self.decode_line(&line)?;
        }
        Ok(n)
    }

    pub fn finish(self) -> Result<DecodeSummary> {
        let files = self.writer.finish()?;
        log::info!(
            "Decoded {} records into {} lines across {} files",
            self.n_records,
            self.n_lines,
            files.len()
        );
        Ok(DecodeSummary {
            n_records: self.n_records,
            n_lines: self.n_lines,
            files,
        })
    }
}
