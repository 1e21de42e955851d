//! Data structures for mirror operations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the lookup table file.
pub const LOOKUP_ENV_VAR: &str = "ENSEMBL_DBLOOKUP";

/// File name of the lookup table when no path is configured.
pub const DEFAULT_LOOKUP_FILE: &str = "dblookup.json";

/// Name of the checksum manifest inside every dataset directory.
pub const MANIFEST_FILE: &str = "CHECKSUMS.gz";

/// Where a dataset lives remotely and locally, as listed in the lookup table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DatasetRecord {
    /// Local directory name under the base directory.
    pub database: String,
    /// Remote directory on the FTP server (e.g. `/pub/release-110/mysql/...`).
    pub path: String,
    /// FTP hostname, optionally with `:port`.
    pub server: String,
}

impl DatasetRecord {
    /// Local mirror directory for this dataset.
    pub fn local_dir(&self, basedir: &Path) -> PathBuf {
        basedir.join(&self.database)
    }
}

/// One line of a `CHECKSUMS.gz` manifest.
///
/// Fields are kept as the strings found in the file; comparison against
/// local files is an exact string comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub checksum: String,
    pub blocks: String,
    pub filename: String,
}

/// Configuration shared by every mode.
///
/// # Example
///
/// ```
/// use ensembl_mirror::MirrorConfig;
/// use std::path::PathBuf;
///
/// let config = MirrorConfig {
///     lookup_path: PathBuf::from("dblookup.json"),
///     basedir: PathBuf::from("/data/ensembl"),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Path to the JSON lookup table.
    pub lookup_path: PathBuf,
    /// Directory holding one sub-directory per dataset.
    pub basedir: PathBuf,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            lookup_path: default_lookup_path(),
            basedir: PathBuf::from("."),
        }
    }
}

/// `dblookup.json` next to the running executable, falling back to the
/// current directory when the executable path is unknown.
pub fn default_lookup_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_LOOKUP_FILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOOKUP_FILE))
}

/// What an empty pattern list selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptySelection {
    /// Every dataset in the table (used by `--list`)
    All,
    /// No datasets (used by `--info`, `--download` and `--validate`)
    Nothing,
}
