//! Integration tests for indexing a result store written through
//! `ResultStore::append` and fetching records back by seek.

use std::fs::File;
use std::path::Path;

use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::{Map, Value, json};

use predcache_core::models::{Analysis, CacheKey, ResultRecord, ResultStore};
use predcache_index::{CacheIndex, ChecksumSelector, KeySelector};

fn data(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn record(analysis: Analysis, version: &str, checksum: &str, name: &str) -> ResultRecord {
    let mut payload = data(json!({"score": 0.5}));
    analysis.set_name(&mut payload, name);
    ResultRecord::new(analysis, checksum, payload).with_software_version(Some(version))
}

fn fetch_all(index: &CacheIndex, path: &Path) -> Vec<(CacheKey, ResultRecord)> {
    let mut source = File::open(path).unwrap();
    index
        .fetch(&mut source, KeySelector::All, ChecksumSelector::All)
        .map(|item| {
            let (key, line) = item.unwrap();
            (key.clone(), serde_json::from_str(&line).unwrap())
        })
        .collect()
}

#[rstest]
fn test_fetch_returns_the_record_for_each_checksum() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.ldjson");
    let store = ResultStore::new(&path);

    let records: Vec<ResultRecord> = (0..50)
        .map(|i| record(Analysis::DeepLoc, "1.0", &format!("chk{}", i), &format!("SR{:03}", i)))
        .collect();
    store.append(&records).unwrap();

    let index = CacheIndex::from_path(&path).unwrap();
    assert_eq!(index.len(), 50);

    let key = CacheKey::new(Analysis::DeepLoc, Some("1.0"), None);
    let mut source = File::open(&path).unwrap();
    for i in [0, 17, 49] {
        let checksum = format!("chk{}", i);
        let lines: Vec<String> = index
            .fetch(&mut source, KeySelector::One(&key), ChecksumSelector::One(&checksum))
            .map(|item| item.unwrap().1)
            .collect();
        assert_eq!(lines.len(), 1);

        let parsed: ResultRecord = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed.checksum, checksum);
        assert_eq!(parsed, records[i]);
    }
}

#[rstest]
fn test_appended_record_supersedes_earlier_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.ldjson");
    let store = ResultStore::new(&path);

    store
        .append([
            &record(Analysis::SignalP6, "6.0g", "x", "SR001"),
            &record(Analysis::SignalP6, "6.0h", "x", "SR001"),
        ])
        .unwrap();
    store
        .append([&record(Analysis::SignalP6, "6.0g", "x", "SR777")])
        .unwrap();

    let index = CacheIndex::from_path(&path).unwrap();
    let fetched = fetch_all(&index, &path);

    assert_eq!(fetched.len(), 2);
    assert_eq!(fetched[0].0.software_version.as_deref(), Some("6.0g"));
    assert_eq!(fetched[0].1.name(), Some("SR777"));
    assert_eq!(fetched[1].0.software_version.as_deref(), Some("6.0h"));
}

#[rstest]
fn test_store_without_trailing_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.ldjson");
    let line = record(Analysis::Tmhmm, "2.0c", "x", "SR001").to_line().unwrap();
    std::fs::write(&path, format!("\n{}\n\n{}", line, line.replace("\"x\"", "\"y\""))).unwrap();

    let index = CacheIndex::from_path(&path).unwrap();
    let fetched = fetch_all(&index, &path);
    let checksums: Vec<&str> = fetched.iter().map(|(_, r)| r.checksum.as_str()).collect();
    assert_eq!(checksums, vec!["x", "y"]);
}
