use std::ffi::OsStr;
use std::fs::{File, create_dir_all};
use std::io::prelude::*;
use std::io::BufReader;
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::errors::{CacheError, Result};

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("Failed to open file {:?}: {}", path, e))
    })?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// The final path component, or the whole string if there is none.
pub fn base_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Strip the last extension of the file name, leaving earlier ones intact
/// (`proteins.fa.gz` becomes `proteins.fa`).
pub fn file_name_without_extension(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Create the parent directory of `path` if it has one.
pub fn create_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    Ok(())
}

///
/// Render an output filename template.
///
/// Placeholders are written `{name}` and are looked up in `vars`. A doubled
/// brace (`{{` or `}}`) produces a literal brace.
///
/// # Arguments
///
/// - template: the template string
/// - vars: placeholder names and their values
///
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> Result<String> {
    let invalid = |reason: String| CacheError::InvalidTemplate {
        template: template.to_string(),
        reason,
    };

    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => return Err(invalid("unclosed '{'".to_string())),
                    }
                }
                let value = vars
                    .iter()
                    .find(|(k, _)| *k == name)
                    .map(|(_, v)| *v)
                    .ok_or_else(|| invalid(format!("unknown placeholder '{{{}}}'", name)))?;
                out.push_str(value);
            }
            '}' => return Err(invalid("unmatched '}'".to_string())),
            _ => out.push(c),
        }
    }

    Ok(out)
}
