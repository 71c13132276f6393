use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

use predcache_core::errors::Result;
use predcache_core::utils::create_parent_dirs;

///
/// Buffered writer spreading lines over many output files.
///
/// Lines are held in memory until `chunk_size` lines are buffered in total,
/// then every buffer is flushed. The first flush to a path truncates the file,
/// later flushes append to it. Not meant to be shared between threads.
///
#[derive(Debug)]
pub struct FanOutWriter {
    chunk_size: usize,
    buffers: HashMap<PathBuf, Vec<u8>>,
    buffered: usize,
    written: HashSet<PathBuf>,
    order: Vec<PathBuf>,
}

impl FanOutWriter {
    pub fn new(chunk_size: usize) -> Self {
        FanOutWriter {
            chunk_size: chunk_size.max(1),
            buffers: HashMap::default(),
            buffered: 0,
            written: HashSet::default(),
            order: Vec::new(),
        }
    }

    /// Queue one line (without terminator) for `path`.
    pub fn push(&mut self, path: &Path, line: &str) -> Result<()> {
        match self.buffers.get_mut(path) {
            Some(buffer) => {
                buffer.extend_from_slice(line.as_bytes());
                buffer.push(b'\n');
            }
            None => {
                let mut buffer = Vec::with_capacity(line.len() + 1);
                buffer.extend_from_slice(line.as_bytes());
                buffer.push(b'\n');
                self.buffers.insert(path.to_path_buf(), buffer);
            }
        }

        self.buffered += 1;
        if self.buffered >= self.chunk_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Write every non-empty buffer to its file.
    pub fn flush(&mut self) -> Result<()> {
        for (path, buffer) in self.buffers.iter_mut() {
            if buffer.is_empty() {
                continue;
            }

            let previously_written = self.written.contains(path);
            if !previously_written {
                create_parent_dirs(path)?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .append(previously_written)
                .truncate(!previously_written)
                .open(path)?;
            file.write_all(buffer)?;
            buffer.clear();

            if !previously_written {
                self.written.insert(path.clone());
                self.order.push(path.clone());
            }
        }

        log::debug!("Flushed {} lines", self.buffered);
        self.buffered = 0;
        Ok(())
    }

    /// Flush what is left and return the files written, in the order they
    /// were first written.
    pub fn finish(mut self) -> Result<Vec<PathBuf>> {
        self.flush()?;
        Ok(self.order)
    }
}
