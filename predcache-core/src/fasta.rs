//! Streaming FASTA reading and writing.
//!
//! Records are yielded one at a time so that arbitrarily large inputs can be
//! processed without materialising the whole file.

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use crate::errors::{CacheError, Result};
use crate::utils::get_dynamic_reader;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub description: Option<String>,
    pub sequence: String,
}

/// Parse a FASTA header line (without the leading '>') into id and description.
///
/// The id is the first word, everything after the first run of whitespace is
/// the description.
pub fn parse_fasta_header(header: &str) -> (String, Option<String>) {
    let header = header.trim();
    match header.split_once(char::is_whitespace) {
        Some((id, desc)) => (id.to_string(), Some(desc.trim().to_string())),
        None => (header.to_string(), None),
    }
}

/// Iterator over the records of a FASTA stream.
pub struct FastaReader<R: BufRead> {
    reader: R,
    line: String,
    line_num: usize,
    pending_header: Option<String>,
    finished: bool,
}

impl FastaReader<BufReader<Box<dyn Read>>> {
    /// Open a (possibly gzip'd) FASTA file.
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(FastaReader::new(get_dynamic_reader(path)?))
    }
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        FastaReader {
            reader,
            line: String::new(),
            line_num: 0,
            pending_header: None,
            finished: false,
        }
    }

    fn read_record(&mut self) -> Result<Option<FastaRecord>> {
        let mut header = self.pending_header.take();
        let mut sequence = String::new();

        loop {
            self.line.clear();
            let bytes_read = self.reader.read_line(&mut self.line)?;
            if bytes_read == 0 {
                self.finished = true;
                break;
            }
            self.line_num += 1;

            let trimmed = self.line.trim_end();
            if let Some(rest) = trimmed.strip_prefix('>') {
                if header.is_some() {
                    self.pending_header = Some(rest.to_string());
                    break;
                }
                header = Some(rest.to_string());
            } else if trimmed.trim().is_empty() {
                continue;
            } else if header.is_none() {
                return Err(CacheError::MalformedFasta {
                    line: self.line_num,
                    reason: "sequence data found before the first header".to_string(),
                });
            } else {
                sequence.extend(trimmed.chars().filter(|c| !c.is_whitespace()));
            }
        }

        Ok(header.map(|h| {
            let (id, description) = parse_fasta_header(&h);
            FastaRecord {
                id,
                description,
                sequence,
            }
        }))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished && self.pending_header.is_none() {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.finished = true;
                self.pending_header = None;
                Some(Err(e))
            }
        }
    }
}

/// Write one FASTA record, wrapping the sequence at `line_width` residues.
pub fn write_fasta_record<W: Write>(
    writer: &mut W,
    id: &str,
    sequence: &str,
    line_width: usize,
) -> std::io::Result<()> {
    writeln!(writer, ">{}", id)?;
    if sequence.is_empty() {
        return Ok(());
    }
    for chunk in sequence.as_bytes().chunks(line_width.max(1)) {
        writer.write_all(chunk)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Cursor;

    fn read_all(text: &str) -> Result<Vec<FastaRecord>> {
        FastaReader::new(Cursor::new(text.to_string())).collect()
    }

    #[rstest]
    fn test_parse_fasta_header() {
        let (id, desc) = parse_fasta_header("prot1 some description here");
        assert_eq!(id, "prot1");
        assert_eq!(desc, Some("some description here".to_string()));

        let (id, desc) = parse_fasta_header("prot1");
        assert_eq!(id, "prot1");
        assert_eq!(desc, None);
    }

    #[rstest]
    fn test_multiline_records() {
        let records = read_all(">a desc\nMKV\nLLA\n\n>b\nmkv\n>c\n").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[0].description.as_deref(), Some("desc"));
        assert_eq!(records[0].sequence, "MKVLLA");
        assert_eq!(records[1].sequence, "mkv");
        assert_eq!(records[2].sequence, "");
    }

    #[rstest]
    fn test_no_trailing_newline() {
        let records = read_all(">a\nMKV\r\n>b\nAAA").unwrap();
        assert_eq!(records[0].sequence, "MKV");
        assert_eq!(records[1].sequence, "AAA");
    }

    #[rstest]
    fn test_sequence_before_header() {
        let result = read_all("MKV\n>a\nMKV\n");
        assert!(matches!(result, Err(CacheError::MalformedFasta { line: 1, .. })));
    }

    #[rstest]
    fn test_empty_input() {
        assert!(read_all("").unwrap().is_empty());
    }

    #[rstest]
    fn test_write_wraps_lines() {
        let mut out = Vec::new();
        write_fasta_record(&mut out, "SR001", "ABCDEFG", 3).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ">SR001\nABC\nDEF\nG\n");
    }
}
