//! Lookup table loading and dataset name resolution.

use crate::error::MirrorError;
use crate::types::{DatasetRecord, EmptySelection};
use globset::GlobBuilder;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// The dataset table, in the key order of the source file.
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    datasets: Vec<Dataset>,
}

#[derive(Debug, Clone)]
struct Dataset {
    name: String,
    record: DatasetRecord,
    /// The table entry as written, echoed back by `--info`.
    raw: serde_json::Value,
}

/// Dataset names selected by a set of patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Matched names, in pattern order then table order, without duplicates.
    pub names: Vec<String>,
    /// Patterns that matched nothing.
    pub unmatched: Vec<String>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Lookup {
    /// Reads a lookup table of the form
    /// `{ "name": { "database": "...", "path": "...", "server": "..." } }`.
    pub fn from_path(path: &Path) -> Result<Self, MirrorError> {
        let content = std::fs::read_to_string(path).map_err(|e| MirrorError::Lookup {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let lookup = Self::from_json_str(&content).map_err(|e| MirrorError::Lookup {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!("Loaded {} datasets from {}", lookup.len(), path.display());
        Ok(lookup)
    }

    pub fn from_json_str(content: &str) -> Result<Self, MirrorError> {
        let table: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;
        let mut datasets = Vec::with_capacity(table.len());
        for (name, raw) in table {
            let record = DatasetRecord::deserialize(&raw)?;
            datasets.push(Dataset { name, record, raw });
        }
        Ok(Self { datasets })
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// All dataset names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(|d| d.name.as_str())
    }

    fn find(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&DatasetRecord> {
        self.find(name).map(|d| &d.record)
    }

    /// Unparsed table entries for the given names, with their original key order.
    pub fn raw_records(&self, names: &[String]) -> Vec<&serde_json::Value> {
        names
            .iter()
            .filter_map(|name| self.find(name).map(|d| &d.raw))
            .collect()
    }

    /// Matches shell-style glob patterns against the table's names.
    ///
    /// `empty` decides the result when `patterns` is empty. A pattern that
    /// is not a well-formed glob (e.g. an unclosed `[`) only matches the
    /// name spelled exactly the same. Backslash is an ordinary character.
    pub fn resolve<S: AsRef<str>>(&self, patterns: &[S], empty: EmptySelection) -> Resolution {
        let mut resolution = Resolution::default();

        if patterns.is_empty() {
            if empty == EmptySelection::All {
                resolution.names = self.names().map(str::to_string).collect();
            }
            return resolution;
        }

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let matcher = match GlobBuilder::new(pattern).backslash_escape(false).build() {
                Ok(glob) => Some(glob.compile_matcher()),
                Err(e) => {
                    debug!("Matching '{}' literally: {}", pattern, e);
                    None
                }
            };
            let is_match = |name: &str| match &matcher {
                Some(matcher) => matcher.is_match(name),
                None => name == pattern,
            };

            let mut matched_any = false;
            for name in self.names().filter(|name| is_match(*name)) {
                matched_any = true;
                if !resolution.names.iter().any(|n| n == name) {
                    resolution.names.push(name.to_string());
                }
            }

            if !matched_any {
                warn!("No database matches '{}'", pattern);
                resolution.unmatched.push(pattern.to_string());
            }
        }

        resolution
    }

    /// Records for the given names, skipping names not in the table.
    pub fn records<'a>(&'a self, names: &'a [String]) -> Vec<(&'a str, &'a DatasetRecord)> {
        names
            .iter()
            .filter_map(|name| self.get(name).map(|record| (name.as_str(), record)))
            .collect()
    }
}
