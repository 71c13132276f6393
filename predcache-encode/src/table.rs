use std::io::{BufRead, Write};
use std::path::Path;

use predcache_core::errors::{CacheError, Result};
use predcache_core::utils::get_dynamic_reader;

/// One row of the identifier mapping table, i.e. one original occurrence of a
/// sequence. Rows are written once at encode time and never modified.
///
/// On disk: `encoded_id<TAB>source_file<TAB>original_id<TAB>checksum<TAB>md5sum`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentifierMapping {
    pub encoded_id: String,
    pub source_file: String,
    pub original_id: String,
    pub checksum: String,
    pub digest: String,
}

impl IdentifierMapping {
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.encoded_id, self.source_file, self.original_id, self.checksum, self.digest
        )
    }

    /// Parse one table row. The md5sum column is optional for tables written
    /// by older pipelines.
    pub fn from_line(line: &str) -> std::result::Result<Self, String> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() < 4 || fields.len() > 5 {
            return Err(format!(
                "Expected 4 or 5 tab-separated columns, found {}",
                fields.len()
            ));
        }
        if fields[..4].iter().any(|f| f.is_empty()) {
            return Err("encoded_id, source_file, original_id and checksum must be non-empty".to_string());
        }

        Ok(IdentifierMapping {
            encoded_id: fields[0].to_string(),
            source_file: fields[1].to_string(),
            original_id: fields[2].to_string(),
            checksum: fields[3].to_string(),
            digest: fields.get(4).map(|s| s.to_string()).unwrap_or_default(),
        })
    }
}

/// Read a full mapping table. Blank lines are skipped.
pub fn read_mapping_table(path: &Path) -> Result<Vec<IdentifierMapping>> {
    let reader = get_dynamic_reader(path)?;
    let mut rows = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = IdentifierMapping::from_line(&line).map_err(|reason| CacheError::MalformedTable {
            path: path.to_path_buf(),
            line: index + 1,
            reason,
        })?;
        rows.push(row);
    }

    Ok(rows)
}

/// Write rows to an (already opened) table, one per line.
pub fn write_mapping_rows<'a, W, I>(writer: &mut W, rows: I) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a IdentifierMapping>,
{
    for row in rows {
        writeln!(writer, "{}", row.to_line())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn row() -> IdentifierMapping {
        IdentifierMapping {
            encoded_id: "SR001".to_string(),
            source_file: "proteome.fasta".to_string(),
            original_id: "sp|P1|A".to_string(),
            checksum: "abc/def".to_string(),
            digest: "0123".to_string(),
        }
    }

    #[rstest]
    fn test_line_format() {
        assert_eq!(row().to_line(), "SR001\tproteome.fasta\tsp|P1|A\tabc/def\t0123");
        assert_eq!(IdentifierMapping::from_line(&row().to_line()).unwrap(), row());
    }

    #[rstest]
    fn test_four_columns_accepted() {
        let parsed = IdentifierMapping::from_line("SR001\tf.fa\tA\tchk").unwrap();
        assert_eq!(parsed.digest, "");
    }

    #[rstest]
    #[case("SR001\tf.fa\tA")]
    #[case("SR001\tf.fa\t\tchk\tmd5")]
    #[case("a\tb\tc\td\te\tf")]
    fn test_bad_rows(#[case] line: &str) {
        assert!(IdentifierMapping::from_line(line).is_err());
    }

    #[rstest]
    fn test_read_table() {
        let mut file = NamedTempFile::new().unwrap();
        write_mapping_rows(&mut file, [&row(), &row()]).unwrap();
        writeln!(file).unwrap();
        file.flush().unwrap();

        let rows = read_mapping_table(file.path()).unwrap();
        assert_eq!(rows, vec![row(), row()]);
    }

    #[rstest]
    fn test_read_table_reports_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", row().to_line()).unwrap();
        writeln!(file, "only\ttwo").unwrap();

        let result = read_mapping_table(file.path());
        assert!(matches!(result, Err(CacheError::MalformedTable { line: 2, .. })));
    }
}
