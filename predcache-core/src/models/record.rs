use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{CacheError, Result};
use crate::models::analysis::Analysis;
use crate::models::cache_key::CacheKey;
use crate::utils::create_parent_dirs;

/// The fields of a stored record needed to index it. Everything else on the
/// line (notably the `data` payload) is skipped during deserialization.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RecordHeader {
    pub analysis: String,
    #[serde(default)]
    pub software_version: Option<String>,
    #[serde(default)]
    pub database_version: Option<String>,
    pub checksum: String,
}

impl RecordHeader {
    /// Empty version strings count as unset, the same as an empty column in
    /// a targets file.
    pub fn cache_key(&self) -> Result<CacheKey> {
        let unset_if_empty =
            |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);
        Ok(CacheKey {
            analysis: self.analysis.parse()?,
            software_version: unset_if_empty(&self.software_version),
            database_version: unset_if_empty(&self.database_version),
        })
    }
}

/// One line of the result store.
///
/// `checksum` says which sequence the record is about. It is deliberately
/// independent of any external sequence name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResultRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    pub analysis: Analysis,
    pub checksum: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5sum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_version: Option<String>,
    pub data: Map<String, Value>,
}

impl ResultRecord {
    pub fn new(analysis: Analysis, checksum: &str, data: Map<String, Value>) -> Self {
        ResultRecord {
            software: None,
            database: None,
            analysis,
            checksum: checksum.to_string(),
            md5sum: None,
            pipeline_version: None,
            software_version: None,
            database_version: None,
            data,
        }
    }

    pub fn with_software(mut self, software: Option<&str>) -> Self {
        self.software = software.map(str::to_string);
        self
    }

    pub fn with_database(mut self, database: Option<&str>) -> Self {
        self.database = database.map(str::to_string);
        self
    }

    pub fn with_md5sum(mut self, md5sum: Option<&str>) -> Self {
        self.md5sum = md5sum.map(str::to_string);
        self
    }

    pub fn with_pipeline_version(mut self, version: Option<&str>) -> Self {
        self.pipeline_version = version.map(str::to_string);
        self
    }

    pub fn with_software_version(mut self, version: Option<&str>) -> Self {
        self.software_version = version.map(str::to_string);
        self
    }

    pub fn with_database_version(mut self, version: Option<&str>) -> Self {
        self.database_version = version.map(str::to_string);
        self
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            analysis: self.analysis,
            software_version: self.software_version.clone(),
            database_version: self.database_version.clone(),
        }
    }

    /// The sequence name embedded in `data`, if any.
    pub fn name(&self) -> Option<&str> {
        self.analysis.get_name(&self.data)
    }

    pub fn to_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

///
/// Overwrite the sequence name embedded in a raw, parsed record.
///
/// Works on an untyped [`Value`] so that envelope fields unknown to this crate
/// survive the rewrite untouched.
///
pub fn set_record_name(record: &mut Value, name: &str) -> Result<()> {
    let object = record
        .as_object_mut()
        .ok_or_else(|| CacheError::InvalidRecord("record is not a JSON object".to_string()))?;

    let analysis: Analysis = object
        .get("analysis")
        .and_then(Value::as_str)
        .ok_or_else(|| CacheError::InvalidRecord("record has no 'analysis' field".to_string()))?
        .parse()?;

    let data = object
        .get_mut("data")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| CacheError::InvalidRecord("record has no 'data' object".to_string()))?;

    analysis.set_name(data, name);
    Ok(())
}

/// Append-only handle on a result store file.
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ResultStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    ///
    /// Append records to the end of the store, one JSON object per line.
    /// Returns the number of records written.
    ///
    /// If the existing store does not end with a newline, one is written first so
    /// the previous record keeps its own line.
    ///
    pub fn append<'a, I>(&self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a ResultRecord>,
    {
        create_parent_dirs(&self.path)?;
        let needs_newline = self.ends_without_newline()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);

        if needs_newline {
            writer.write_all(b"\n")?;
        }

        let mut n = 0;
        for record in records {
            writeln!(writer, "{}", record.to_line()?)?;
            n += 1;
        }
        writer.flush()?;

        log::debug!("Appended {} records to {}", n, self.path.display());
        Ok(n)
    }

    fn ends_without_newline(&self) -> Result<bool> {
        use std::io::{Read, Seek, SeekFrom};

        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        if file.metadata()?.len() == 0 {
            return Ok(false);
        }
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] != b'\n')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    fn phobius_data(name: &str) -> Map<String, Value> {
        json!({"name": name, "tm": 0, "sp": true, "topology": "n5-16c21/22o"})
            .as_object()
            .unwrap()
            .clone()
    }

    #[rstest]
    fn test_optional_fields_are_omitted() {
        let record = ResultRecord::new(Analysis::Phobius, "abc", phobius_data("SR001"));
        let line = record.to_line().unwrap();
        assert!(!line.contains("software_version"));
        assert!(line.contains("\"analysis\":\"phobius\""));

        let with_version = record.with_software_version(Some("1.01"));
        assert!(with_version.to_line().unwrap().contains("\"software_version\":\"1.01\""));
    }

    #[rstest]
    fn test_header_parses_null_versions() {
        let line = r#"{"analysis":"tmhmm","checksum":"x","software_version":null,"data":{}}"#;
        let header: RecordHeader = serde_json::from_str(line).unwrap();
        assert_eq!(header.software_version, None);
        assert_eq!(
            header.cache_key().unwrap(),
            CacheKey::new(Analysis::Tmhmm, None, None)
        );
    }

    #[rstest]
    fn test_header_empty_versions_are_unset() {
        let line = r#"{"analysis":"phobius","checksum":"x","software_version":"","database_version":"","data":{}}"#;
        let header: RecordHeader = serde_json::from_str(line).unwrap();
        let key = header.cache_key().unwrap();
        assert_eq!(key, CacheKey::new(Analysis::Phobius, None, None));
        assert!(!key.is_cacheable());
    }

    #[rstest]
    fn test_set_record_name_keeps_unknown_fields() {
        let mut value = json!({
            "analysis": "pfamscan",
            "checksum": "x",
            "extra": [1, 2],
            "data": {"query": "SR001", "hmm": "PF1"}
        });
        set_record_name(&mut value, "orig").unwrap();
        assert_eq!(value["data"]["query"], "orig");
        assert_eq!(value["extra"], json!([1, 2]));
    }

    #[rstest]
    fn test_set_record_name_requires_data() {
        let mut value = json!({"analysis": "phobius", "checksum": "x"});
        assert!(matches!(
            set_record_name(&mut value, "a"),
            Err(CacheError::InvalidRecord(_))
        ));
    }

    #[rstest]
    fn test_append_repairs_missing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.ldjson");
        std::fs::write(&path, r#"{"analysis":"phobius","checksum":"a","data":{}}"#).unwrap();

        let store = ResultStore::new(&path);
        let record = ResultRecord::new(Analysis::Phobius, "b", phobius_data("SR002"));
        assert_eq!(store.append([&record]).unwrap(), 1);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: ResultRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed, record);
    }
}
