use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use fxhash::FxHashMap as HashMap;

use predcache_core::errors::{CacheError, Result};
use predcache_core::models::{CacheKey, RecordHeader};

/// Location of one record in the store. `end` is exclusive and stops before
/// the line terminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// All ranges recorded under one cache key. Each checksum owns one slot in
/// `ranges`; a later record for the same checksum overwrites its slot.
#[derive(Debug, Default)]
struct KeyArena {
    slots: HashMap<String, u32>,
    ranges: Vec<ByteRange>,
}

impl KeyArena {
    fn insert(&mut self, checksum: &str, range: ByteRange) {
        match self.slots.get(checksum) {
            Some(&slot) => self.ranges[slot as usize] = range,
            None => {
                self.slots.insert(checksum.to_string(), self.ranges.len() as u32);
                self.ranges.push(range);
            }
        }
    }

    fn get(&self, checksum: &str) -> Option<ByteRange> {
        self.slots.get(checksum).map(|&slot| self.ranges[slot as usize])
    }
}

/// Which cache keys to fetch from.
#[derive(Clone, Copy, Debug)]
pub enum KeySelector<'a> {
    One(&'a CacheKey),
    Many(&'a [CacheKey]),
    All,
}

/// Which checksums to fetch for each selected key.
#[derive(Clone, Copy, Debug)]
pub enum ChecksumSelector<'a> {
    One(&'a str),
    Many(&'a [String]),
    /// Every checksum of the key, in the order first seen in the store.
    All,
}

///
/// In-memory index over a result store.
///
/// Maps `CacheKey -> checksum -> ByteRange`. It holds offsets only, never
/// record contents, and is read-only once built.
///
#[derive(Debug, Default)]
pub struct CacheIndex {
    keys: Vec<CacheKey>,
    positions: HashMap<CacheKey, usize>,
    arenas: Vec<KeyArena>,
}

fn strip_line_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

impl CacheIndex {
    ///
    /// Build the index with a single forward pass over `reader`.
    ///
    /// Blank lines are skipped. The final line may or may not end with a
    /// newline. Offsets are counted from the current position of `reader`,
    /// which should be the start of the store.
    ///
    /// # Errors
    ///
    /// `MalformedRecord` with the 1-based line number and byte offset of the
    /// first line that is not a valid record.
    ///
    pub fn build<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut index = CacheIndex::default();
        let mut buf: Vec<u8> = Vec::new();
        let mut offset: u64 = 0;
        let mut line_num: usize = 0;

        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf)?;
            if n == 0 {
                break;
            }
            line_num += 1;

            let start = offset;
            offset += n as u64;

            let content = strip_line_terminator(&buf);
            if content.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let malformed = |reason: String| CacheError::MalformedRecord {
                line: line_num,
                offset: start,
                reason,
            };
            let header: RecordHeader =
                serde_json::from_slice(content).map_err(|e| malformed(e.to_string()))?;
            let key = header.cache_key().map_err(|e| malformed(e.to_string()))?;

            let range = ByteRange {
                start,
                end: start + content.len() as u64,
            };
            index.insert(key, &header.checksum, range);
        }

        log::info!(
            "Indexed {} records under {} analyses from {} lines",
            index.len(),
            index.keys.len(),
            line_num
        );
        Ok(index)
    }

    /// Build the index of a store file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            std::io::Error::new(e.kind(), format!("Failed to open store {:?}: {}", path, e))
        })?;
        CacheIndex::build(BufReader::new(file))
    }

    fn insert(&mut self, key: CacheKey, checksum: &str, range: ByteRange) {
        let position = match self.positions.get(&key) {
            Some(&position) => position,
            None => {
                let position = self.keys.len();
                self.positions.insert(key.clone(), position);
                self.keys.push(key);
                self.arenas.push(KeyArena::default());
                position
            }
        };
        self.arenas[position].insert(checksum, range);
    }

    /// All cache keys present in the store, in the order first seen.
    pub fn analyses(&self) -> &[CacheKey] {
        &self.keys
    }

    /// Total number of (key, checksum) entries.
    pub fn len(&self) -> usize {
        self.arenas.iter().map(|a| a.ranges.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.arenas.iter().all(|a| a.ranges.is_empty())
    }

    /// Number of checksums recorded under `key`.
    pub fn len_of(&self, key: &CacheKey) -> usize {
        self.arena(key).map_or(0, |a| a.ranges.len())
    }

    fn arena(&self, key: &CacheKey) -> Option<&KeyArena> {
        self.positions.get(key).map(|&p| &self.arenas[p])
    }

    pub fn contains(&self, key: &CacheKey, checksum: &str) -> bool {
        self.range(key, checksum).is_some()
    }

    pub fn range(&self, key: &CacheKey, checksum: &str) -> Option<ByteRange> {
        self.arena(key).and_then(|a| a.get(checksum))
    }

    fn plan(&self, keys: KeySelector, checksums: ChecksumSelector) -> Vec<(usize, ByteRange)> {
        let positions: Vec<usize> = match keys {
            KeySelector::One(key) => self.positions.get(key).copied().into_iter().collect(),
            KeySelector::Many(keys) => keys
                .iter()
                .filter_map(|k| self.positions.get(k).copied())
                .collect(),
            KeySelector::All => (0..self.keys.len()).collect(),
        };

        let mut plan = Vec::new();
        for position in positions {
            let arena = &self.arenas[position];
            match checksums {
                ChecksumSelector::One(checksum) => {
                    plan.extend(arena.get(checksum).map(|r| (position, r)));
                }
                ChecksumSelector::Many(checksums) => {
                    plan.extend(
                        checksums
                            .iter()
                            .filter_map(|c| arena.get(c))
                            .map(|r| (position, r)),
                    );
                }
                ChecksumSelector::All => {
                    plan.extend(arena.ranges.iter().map(|r| (position, *r)));
                }
            }
        }
        plan
    }

    ///
    /// Fetch the raw record lines matching both selectors.
    ///
    /// Each record is read by seeking `source` to the start of its range and
    /// reading exactly its length, so `source` must be the same store the
    /// index was built from. Selections with no match yield nothing.
    ///
    /// # Arguments
    ///
    /// - source: the store, opened for reading
    /// - keys: which cache keys to fetch from
    /// - checksums: which checksums to fetch under each key
    ///
    pub fn fetch<'a, R: Read + Seek>(
        &'a self,
        source: &'a mut R,
        keys: KeySelector,
        checksums: ChecksumSelector,
    ) -> Fetch<'a, R> {
        Fetch {
            index: self,
            source,
            plan: self.plan(keys, checksums).into_iter(),
            buf: Vec::new(),
        }
    }
}

/// Iterator returned by [`CacheIndex::fetch`].
pub struct Fetch<'a, R> {
    index: &'a CacheIndex,
    source: &'a mut R,
    plan: std::vec::IntoIter<(usize, ByteRange)>,
    buf: Vec<u8>,
}

impl<R: Read + Seek> Fetch<'_, R> {
    fn read_range(&mut self, range: ByteRange) -> Result<String> {
        self.source.seek(SeekFrom::Start(range.start))?;
        self.buf.resize(range.len() as usize, 0);
        self.source.read_exact(&mut self.buf)?;
        String::from_utf8(std::mem::take(&mut self.buf)).map_err(|e| {
            CacheError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

impl<'a, R: Read + Seek> Iterator for Fetch<'a, R> {
    type Item = Result<(&'a CacheKey, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        let (position, range) = self.plan.next()?;
        let key = &self.index.keys[position];
        Some(self.read_range(range).map(|line| (key, line)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.plan.size_hint()
    }
}
