use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::PathBuf;

use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
use serde_json::{Map, Value};

use predcache_core::consts::NA_VALUE;
use predcache_core::errors::{CacheError, Result};
use predcache_core::models::CacheKey;
use predcache_core::utils::create_parent_dirs;

use crate::index::{CacheIndex, ChecksumSelector, KeySelector};

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NA_VALUE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

///
/// Write one tab separated table per cache key in the index.
///
/// Each row is the `data` payload of one (current) record. The header is the
/// union of the keys of every payload written to that table, in the order they
/// are first seen. Missing and null values are written as `.`.
///
/// Keys whose paths render identically, e.g. two versions of one analysis
/// under `{analysis}.tsv`, share a single table.
///
/// # Arguments
///
/// - index: the index of `source`
/// - source: the store, opened for reading
/// - template: output path template, e.g. `{analysis}.tsv`
///
/// Returns each path written once, in the order of [`CacheIndex::analyses`].
///
pub fn write_analysis_tables<R: Read + Seek>(
    index: &CacheIndex,
    source: &mut R,
    template: &str,
) -> Result<Vec<PathBuf>> {
    let mut tables: Vec<(PathBuf, Vec<CacheKey>)> = Vec::new();
    let mut positions: HashMap<PathBuf, usize> = HashMap::default();
    for key in index.analyses() {
        let path = PathBuf::from(key.render(template)?);
        match positions.get(&path) {
            Some(&i) => {
                log::warn!(
                    "{} renders to {} like {}, writing both to one table",
                    key,
                    path.display(),
                    tables[i].1[0]
                );
                tables[i].1.push(key.clone());
            }
            None => {
                positions.insert(path.clone(), tables.len());
                tables.push((path, vec![key.clone()]));
            }
        }
    }

    let mut written = Vec::with_capacity(tables.len());
    for (path, keys) in tables {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::default();
        let mut rows: Vec<Map<String, Value>> = Vec::new();

        for item in index.fetch(source, KeySelector::Many(&keys), ChecksumSelector::All) {
            let (key, line) = item?;
            let mut record: Value = serde_json::from_str(&line)?;
            let data = match record.get_mut("data").map(Value::take) {
                Some(Value::Object(data)) => data,
                _ => {
                    return Err(CacheError::InvalidRecord(format!(
                        "{} record has no 'data' object",
                        key.analysis
                    )));
                }
            };

            for column in data.keys() {
                if seen.insert(column.clone()) {
                    columns.push(column.clone());
                }
            }
            rows.push(data);
        }

        create_parent_dirs(&path)?;
        let mut writer = BufWriter::new(File::create(&path)?);

        writeln!(writer, "{}", columns.join("\t"))?;
        for row in &rows {
            let cells: Vec<String> = columns.iter().map(|c| cell(row.get(c))).collect();
            writeln!(writer, "{}", cells.join("\t"))?;
        }
        writer.flush()?;

        log::info!("Wrote {} rows to {}", rows.len(), path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;
    use std::io::Cursor;

    #[rstest]
    #[case(None, ".")]
    #[case(Some(json!(null)), ".")]
    #[case(Some(json!("SR001")), "SR001")]
    #[case(Some(json!(0.25)), "0.25")]
    #[case(Some(json!(true)), "true")]
    fn test_cell(#[case] value: Option<Value>, #[case] expected: &str) {
        assert_eq!(cell(value.as_ref()), expected);
    }

    #[rstest]
    fn test_tables_union_columns() {
        let store = concat!(
            r#"{"analysis":"phobius","software_version":"1.01","checksum":"a","data":{"name":"SR001","tm":0}}"#,
            "\n",
            r#"{"analysis":"phobius","software_version":"1.01","checksum":"b","data":{"name":"SR002","sp":true,"tm":null}}"#,
            "\n",
            r#"{"analysis":"pfamscan","software_version":"1.6","database_version":"33.1","checksum":"a","data":{"query":"SR001"}}"#,
            "\n",
        );
        let index = CacheIndex::build(Cursor::new(store)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let template = format!("{}/{{analysis}}/{{database_version}}.tsv", dir.path().display());

        let written = write_analysis_tables(&index, &mut Cursor::new(store), &template).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0], dir.path().join("phobius").join(".tsv"));

        let phobius = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(phobius, "name\ttm\tsp\nSR001\t0\t.\nSR002\t.\ttrue\n");

        let pfam = std::fs::read_to_string(&written[1]).unwrap();
        assert_eq!(pfam, "query\nSR001\n");
    }

    #[rstest]
    fn test_keys_sharing_a_path_share_one_table() {
        let store = concat!(
            r#"{"analysis":"phobius","software_version":"1.01","checksum":"a","data":{"name":"SR001","tm":0}}"#,
            "\n",
            r#"{"analysis":"tmhmm","software_version":"2.0c","checksum":"a","data":{"name":"SR001","pred_hel":1}}"#,
            "\n",
            r#"{"analysis":"phobius","software_version":"1.02","checksum":"b","data":{"name":"SR002","tm":1,"sp":false}}"#,
            "\n",
        );
        let index = CacheIndex::build(Cursor::new(store)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let template = format!("{}/{{analysis}}.tsv", dir.path().display());

        let written = write_analysis_tables(&index, &mut Cursor::new(store), &template).unwrap();
        assert_eq!(
            written,
            vec![dir.path().join("phobius.tsv"), dir.path().join("tmhmm.tsv")]
        );

        let phobius = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(phobius, "name\ttm\tsp\nSR001\t0\t.\nSR002\t1\tfalse\n");
    }
}
