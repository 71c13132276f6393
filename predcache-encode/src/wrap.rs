use std::io::{BufRead, Write};
use std::path::Path;

use fxhash::FxHashMap as HashMap;
use serde_json::{Map, Value};

use predcache_core::errors::{CacheError, Result};
use predcache_core::fasta::FastaReader;
use predcache_core::models::{Analysis, ResultRecord};

use crate::identity::{SequenceIdentity, identify};

/// Envelope values stamped onto every wrapped record.
#[derive(Clone, Debug, Default)]
pub struct WrapOptions {
    pub software: Option<String>,
    pub database: Option<String>,
    pub pipeline_version: Option<String>,
    pub software_version: Option<String>,
    pub database_version: Option<String>,
}

/// Compute the identity of every sequence in a FASTA file, keyed by id.
pub fn identities_from_fasta(path: &Path) -> Result<HashMap<String, SequenceIdentity>> {
    let mut identities = HashMap::default();
    for record in FastaReader::from_path(path)? {
        let record = record?;
        let identity = identify(&record.id, &record.sequence)?;
        identities.insert(record.id, identity);
    }
    Ok(identities)
}

fn wrap_one(
    analysis: Analysis,
    data: Map<String, Value>,
    identities: &HashMap<String, SequenceIdentity>,
    opts: &WrapOptions,
) -> Result<ResultRecord> {
    let name = analysis.get_name(&data).ok_or_else(|| {
        CacheError::InvalidRecord(format!(
            "{} record has no string '{}' field",
            analysis,
            analysis.name_field()
        ))
    })?;

    let identity = identities
        .get(name)
        .ok_or_else(|| CacheError::UnknownSequence(name.to_string()))?;

    Ok(ResultRecord::new(analysis, &identity.checksum, data.clone())
        .with_md5sum(Some(&identity.digest))
        .with_software(opts.software.as_deref())
        .with_database(opts.database.as_deref())
        .with_pipeline_version(opts.pipeline_version.as_deref())
        .with_software_version(opts.software_version.as_deref())
        .with_database_version(opts.database_version.as_deref()))
}

///
/// Wrap bare per-tool records into checksum-keyed result records.
///
/// `input` holds one JSON object per line, as emitted by a tool parser. Each
/// object's name field is looked up in `identities` to find the checksum of
/// the sequence it describes. Returns the number of records written.
///
pub fn wrap_records<R: BufRead, W: Write>(
    analysis: Analysis,
    input: R,
    identities: &HashMap<String, SequenceIdentity>,
    opts: &WrapOptions,
    out: &mut W,
) -> Result<usize> {
    let mut n = 0;
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let data: Map<String, Value> = serde_json::from_str(&line).map_err(|e| {
            CacheError::InvalidRecord(format!("line {}: {}", index + 1, e))
        })?;
        let record = wrap_one(analysis, data, identities, opts)?;
        writeln!(out, "{}", record.to_line()?)?;
        n += 1;
    }
    out.flush()?;

    log::info!("Wrapped {} {} records", n, analysis);
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Cursor;

    fn identities() -> HashMap<String, SequenceIdentity> {
        let mut map = HashMap::default();
        map.insert("SR001".to_string(), identify("SR001", "MKVLA").unwrap());
        map
    }

    #[rstest]
    fn test_wrap_adds_envelope() {
        let input = Cursor::new("{\"name\":\"SR001\",\"tm\":1,\"sp\":false,\"topology\":\"o\"}\n\n");
        let opts = WrapOptions {
            software: Some("Phobius".to_string()),
            software_version: Some("1.01".to_string()),
            ..Default::default()
        };

        let mut out = Vec::new();
        let n = wrap_records(Analysis::Phobius, input, &identities(), &opts, &mut out).unwrap();
        assert_eq!(n, 1);

        let record: ResultRecord = serde_json::from_slice(&out).unwrap();
        assert_eq!(record.checksum, identify("x", "MKVLA").unwrap().checksum);
        assert_eq!(record.software_version.as_deref(), Some("1.01"));
        assert_eq!(record.database_version, None);
        assert_eq!(record.name(), Some("SR001"));
    }

    #[rstest]
    fn test_wrap_unknown_sequence() {
        let input = Cursor::new("{\"name\":\"SR999\"}\n");
        let mut out = Vec::new();
        let result = wrap_records(
            Analysis::Phobius,
            input,
            &identities(),
            &WrapOptions::default(),
            &mut out,
        );
        assert!(matches!(result, Err(CacheError::UnknownSequence(id)) if id == "SR999"));
    }

    #[rstest]
    fn test_wrap_uses_query_column() {
        let input = Cursor::new("{\"query\":\"SR001\",\"hmm\":\"PF00001\"}\n");
        let mut out = Vec::new();
        let n = wrap_records(
            Analysis::PfamScan,
            input,
            &identities(),
            &WrapOptions::default(),
            &mut out,
        )
        .unwrap();
        assert_eq!(n, 1);
    }
}
