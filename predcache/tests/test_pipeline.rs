//! End-to-end run of two pipeline invocations sharing one result store: the
//! second run reuses what the first one computed and only computes the rest.

use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;

use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::Value;

use predcache::core::models::{Analysis, CacheKey, ResultRecord, ResultStore};
use predcache::decode::{DecodeOptions, Decoder};
use predcache::encode::{
    EncodeOptions, Encoder, IdConverter, WrapOptions, encode_fasta_files, identities_from_fasta,
    read_mapping_table, wrap_records,
};
use predcache::index::CacheIndex;
use predcache::precomputed::{SplitOptions, read_encoded_sequences, split, write_remaining_fasta};

fn encode(dir: &Path, name: &str, fasta: &str) -> (std::path::PathBuf, std::path::PathBuf) {
    let input = dir.join(format!("{}.fasta", name));
    std::fs::write(&input, fasta).unwrap();

    let encoded = dir.join(format!("{}.encoded.fasta", name));
    let mapping = dir.join(format!("{}.tsv", name));
    let mut fasta_out = BufWriter::new(File::create(&encoded).unwrap());
    let mut map_out = BufWriter::new(File::create(&mapping).unwrap());
    let mut encoder = Encoder::new(IdConverter::new("SR", 3));
    encode_fasta_files(
        &[input.as_path()],
        &mut encoder,
        &mut fasta_out,
        &mut map_out,
        EncodeOptions::default(),
    )
    .unwrap();
    (encoded, mapping)
}

/// Stand-in for running a tool and its parser on an encoded FASTA.
fn fake_phobius(fasta: &Path) -> String {
    read_encoded_sequences(fasta)
        .unwrap()
        .iter()
        .map(|s| format!("{{\"name\":\"{}\",\"tm\":{}}}\n", s.encoded_id, s.sequence.len()))
        .collect()
}

#[rstest]
fn test_second_run_reuses_first_run_results() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("results.ldjson");
    let store = ResultStore::new(&store_path);
    let phobius = CacheKey::new(Analysis::Phobius, Some("1.01"), None);

    // first run computes everything
    let (first_fasta, _) = encode(dir.path(), "first", ">P1\nMKVLAAGIV\n>P2\nMSTNPKPQR\n");
    let opts = WrapOptions {
        software: Some("Phobius".to_string()),
        software_version: Some("1.01".to_string()),
        ..Default::default()
    };
    let identities = identities_from_fasta(&first_fasta).unwrap();
    let mut wrapped = Vec::new();
    let n = wrap_records(
        Analysis::Phobius,
        Cursor::new(fake_phobius(&first_fasta)),
        &identities,
        &opts,
        &mut wrapped,
    )
    .unwrap();
    assert_eq!(n, 2);
    let records = String::from_utf8(wrapped)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect::<Vec<ResultRecord>>();
    store.append(&records).unwrap();

    // second run shares P2 under a new name and adds one new sequence
    let (second_fasta, second_map) =
        encode(dir.path(), "second", ">Q1\nMQQQWWW\n>Q2\nmstnpkpqr\n>Q3\nMSTNPKPQR*\n");
    let sequences = read_encoded_sequences(&second_fasta).unwrap();
    assert_eq!(sequences.len(), 2);

    let index = CacheIndex::from_path(&store_path).unwrap();
    let split_opts = SplitOptions {
        template: format!("{}/todo/{{analysis}}.fasta", dir.path().display()),
        ..Default::default()
    };
    let mut cached = Vec::new();
    let outcome = split(
        std::slice::from_ref(&phobius),
        &sequences,
        &index,
        &mut File::open(&store_path).unwrap(),
        &mut cached,
        &split_opts,
    )
    .unwrap();

    let target = outcome.get(&phobius).unwrap();
    assert_eq!(target.n_cached, 1);
    assert_eq!(target.remaining, vec!["SR001"]);

    let written = write_remaining_fasta(&outcome, &sequences, &split_opts).unwrap();
    assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), ">SR001\nMQQQWWW\n");

    // the reused line now carries the second run's id, and decodes to both names
    let cached = String::from_utf8(cached).unwrap();
    let line: Value = serde_json::from_str(cached.trim_end()).unwrap();
    assert_eq!(line["data"]["name"], "SR002");
    assert_eq!(line["data"]["tm"], 9);

    let mut decoder = Decoder::new(
        read_mapping_table(&second_map).unwrap(),
        &DecodeOptions {
            template: format!("{}/out/{{filename_noext}}.ldjson", dir.path().display()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(decoder.decode_stream(Cursor::new(cached)).unwrap(), 2);
    let summary = decoder.finish().unwrap();

    let decoded = std::fs::read_to_string(dir.path().join("out").join("second.ldjson")).unwrap();
    let names: Vec<String> = decoded
        .lines()
        .map(|l| {
            let value: Value = serde_json::from_str(l).unwrap();
            value["data"]["name"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(names, vec!["Q2", "Q3"]);
    assert_eq!(summary.n_lines, 2);
}
