//! Dataset verification against `CHECKSUMS.gz` (BSD checksums and block counts).

use crate::checksum::{file_sum, FileSum};
use crate::error::MirrorError;
use crate::manifest::read_manifest;
use crate::types::{ManifestEntry, MANIFEST_FILE};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of checking one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Match,
    Mismatch {
        expected_checksum: String,
        expected_blocks: String,
        actual_checksum: String,
        actual_blocks: String,
    },
    /// The manifest names a file that is not on disk.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub filename: String,
    pub outcome: EntryOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetStatus {
    /// The dataset directory does not exist; nothing was checked.
    MissingDirectory,
    /// Every manifest entry was checked.
    Checked(Vec<EntryReport>),
}

/// Verification result for one dataset directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetReport {
    pub name: String,
    pub directory: PathBuf,
    pub status: DatasetStatus,
}

impl DatasetReport {
    /// True when every manifest entry matched.
    pub fn is_correct(&self) -> bool {
        match &self.status {
            DatasetStatus::MissingDirectory => false,
            DatasetStatus::Checked(entries) => {
                entries.iter().all(|e| e.outcome == EntryOutcome::Match)
            }
        }
    }

    /// One diagnostic per problem found, in manifest order.
    pub fn diagnostics(&self) -> Vec<Diagnostic<'_>> {
        match &self.status {
            DatasetStatus::MissingDirectory => vec![Diagnostic::MissingDirectory {
                directory: &self.directory,
            }],
            DatasetStatus::Checked(entries) => entries
                .iter()
                .filter_map(|entry| match &entry.outcome {
                    EntryOutcome::Match => None,
                    EntryOutcome::Mismatch {
                        expected_checksum,
                        expected_blocks,
                        actual_checksum,
                        actual_blocks,
                    } => Some(Diagnostic::Mismatch {
                        directory: &self.directory,
                        filename: &entry.filename,
                        expected: (expected_checksum.as_str(), expected_blocks.as_str()),
                        actual: (actual_checksum.as_str(), actual_blocks.as_str()),
                    }),
                    EntryOutcome::Missing => Some(Diagnostic::MissingFile {
                        directory: &self.directory,
                        filename: &entry.filename,
                    }),
                })
                .collect(),
        }
    }
}

/// Outcome of a whole validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub datasets: Vec<DatasetReport>,
    /// Requested patterns that matched no dataset.
    pub unmatched_patterns: Vec<String>,
}

impl ValidationReport {
    pub fn is_success(&self) -> bool {
        self.unmatched_patterns.is_empty() && self.datasets.iter().all(DatasetReport::is_correct)
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic<'_>> {
        let mut out: Vec<Diagnostic<'_>> = self
            .unmatched_patterns
            .iter()
            .map(|pattern| Diagnostic::UnmatchedPattern { pattern })
            .collect();
        for dataset in &self.datasets {
            out.extend(dataset.diagnostics());
        }
        out
    }
}

/// A printable validation problem.
#[derive(Debug, Clone, Copy)]
pub enum Diagnostic<'a> {
    UnmatchedPattern {
        pattern: &'a str,
    },
    MissingDirectory {
        directory: &'a Path,
    },
    /// `(checksum, blocks)` pairs as strings.
    Mismatch {
        directory: &'a Path,
        filename: &'a str,
        expected: (&'a str, &'a str),
        actual: (&'a str, &'a str),
    },
    MissingFile {
        directory: &'a Path,
        filename: &'a str,
    },
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnmatchedPattern { pattern } => {
                write!(f, "No database matches '{}'", pattern)
            }
            Diagnostic::MissingDirectory { directory } => {
                write!(f, "Cannot find database directory \"{}\"", directory.display())
            }
            Diagnostic::Mismatch {
                directory,
                filename,
                expected,
                actual,
            } => write!(
                f,
                "Checksum check failed for {} and {}. Expected '{} {}' but got '{} {}'",
                directory.display(),
                filename,
                expected.0,
                expected.1,
                actual.0,
                actual.1
            ),
            Diagnostic::MissingFile {
                directory,
                filename,
            } => write!(f, "Missing file for {} and {}", directory.display(), filename),
        }
    }
}

/// Compares a manifest entry with the checksum of the local file.
///
/// All three fields are compared as strings.
pub fn compare_entry(entry: &ManifestEntry, actual: &FileSum) -> EntryOutcome {
    let actual_checksum = actual.checksum_str();
    let actual_blocks = actual.blocks_str();

    if actual_checksum == entry.checksum && actual_blocks == entry.blocks {
        EntryOutcome::Match
    } else {
        EntryOutcome::Mismatch {
            expected_checksum: entry.checksum.clone(),
            expected_blocks: entry.blocks.clone(),
            actual_checksum,
            actual_blocks,
        }
    }
}

/// Computes the checksum of one file without blocking the async runtime.
///
/// `Ok(None)` means the file does not exist.
async fn compute_file_sum(path: PathBuf) -> Result<Option<FileSum>, MirrorError> {
    let result = tokio::task::spawn_blocking(move || file_sum(&path)).await?;
    match result {
        Ok(sum) => Ok(Some(sum)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(MirrorError::IoError(e)),
    }
}

/// Verifies one dataset directory against its `CHECKSUMS.gz`.
///
/// A missing directory is reported, not raised. A missing manifest, a
/// malformed manifest line or an unreadable file is an error.
///
/// # Arguments
///
/// * `name` - Dataset name used in logs
/// * `directory` - Local dataset directory
/// * `pb` - Progress bar, one tick per manifest entry
pub async fn verify_dataset(
    name: &str,
    directory: &Path,
    pb: &indicatif::ProgressBar,
) -> Result<DatasetReport, MirrorError> {
    let mut report = DatasetReport {
        name: name.to_string(),
        directory: directory.to_path_buf(),
        status: DatasetStatus::MissingDirectory,
    };

    if !tokio::fs::try_exists(directory).await? {
        return Ok(report);
    }

    let manifest_path = directory.join(MANIFEST_FILE);
    let entries = tokio::task::spawn_blocking(move || read_manifest(&manifest_path)).await??;
    info!("Checking {} files for {}", entries.len(), name);
    pb.set_length(entries.len() as u64);
    pb.set_position(0);

    let mut checked = Vec::with_capacity(entries.len());
    for entry in entries {
        pb.set_message(format!("| 🔍 Verifying: {}", entry.filename));

        let outcome = match compute_file_sum(directory.join(&entry.filename)).await? {
            Some(actual) => compare_entry(&entry, &actual),
            None => EntryOutcome::Missing,
        };
        debug!("{}/{}: {:?}", name, entry.filename, outcome);

        checked.push(EntryReport {
            filename: entry.filename,
            outcome,
        });
        pb.inc(1);
    }

    report.status = DatasetStatus::Checked(checked);
    Ok(report)
}
