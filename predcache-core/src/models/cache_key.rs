use std::fmt::Display;
use std::io::BufRead;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CacheError, Result};
use crate::models::analysis::Analysis;
use crate::utils::{get_dynamic_reader, render_template};

fn non_empty(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|s| !s.is_empty())
}

/// Identifies a reusable computation context: which analysis was run, with
/// which software version, against which database version.
///
/// Two keys are equal only if all three fields match, `None` included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub analysis: Analysis,
    pub software_version: Option<String>,
    pub database_version: Option<String>,
}

impl CacheKey {
    pub fn new(
        analysis: Analysis,
        software_version: Option<&str>,
        database_version: Option<&str>,
    ) -> Self {
        CacheKey {
            analysis,
            software_version: software_version.map(str::to_string),
            database_version: database_version.map(str::to_string),
        }
    }

    ///
    /// Whether records under this key may be reused by a later run.
    ///
    /// A record without a software version cannot be shown to be equivalent
    /// to a future run, so it never counts as a cache hit. This holds even
    /// when a database version is present.
    ///
    pub fn is_cacheable(&self) -> bool {
        self.software_version.is_some()
    }

    ///
    /// Parse one line of a targets file:
    /// `analysis<TAB>software_version<TAB>database_version`.
    ///
    /// Empty version columns, or a missing database column, mean "unset".
    ///
    pub fn from_target_line(line: &str) -> Result<Self> {
        let mut fields = line.trim_end_matches(['\r', '\n']).split('\t');

        let analysis: Analysis = fields
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CacheError::UnknownAnalysis(String::new()))?
            .parse()?;

        let software_version = non_empty(fields.next());
        let database_version = non_empty(fields.next());

        Ok(CacheKey::new(analysis, software_version, database_version))
    }

    /// Render an output filename for this key. `{analysis}`,
    /// `{software_version}` and `{database_version}` are available; unset
    /// versions render as empty strings.
    pub fn render(&self, template: &str) -> Result<String> {
        render_template(
            template,
            &[
                ("analysis", self.analysis.as_str()),
                (
                    "software_version",
                    self.software_version.as_deref().unwrap_or(""),
                ),
                (
                    "database_version",
                    self.database_version.as_deref().unwrap_or(""),
                ),
            ],
        )
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (software: {}, database: {})",
            self.analysis,
            self.software_version.as_deref().unwrap_or("-"),
            self.database_version.as_deref().unwrap_or("-"),
        )
    }
}

///
/// Read a targets file. Blank lines are skipped.
///
/// # Arguments
///
/// - path: path to the 3 column tsv file, no header
///
pub fn read_targets(path: &Path) -> Result<Vec<CacheKey>> {
    let reader = get_dynamic_reader(path)?;
    let mut targets = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let key = CacheKey::from_target_line(&line).map_err(|e| CacheError::MalformedTable {
            path: path.to_path_buf(),
            line: index + 1,
            reason: e.to_string(),
        })?;
        targets.push(key);
    }

    Ok(targets)
}
