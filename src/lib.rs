//! Ensembl Mirror - download Ensembl database dumps over FTP and validate them
//!
//! This library mirrors named datasets from a public FTP archive into local
//! directories and checks each local file against the `CHECKSUMS.gz`
//! manifest shipped with the dataset.
//!
//! # Features
//!
//! - **Glob Selection**: Pick datasets from the lookup table with shell globs
//! - **FTP Mirroring**: Anonymous, binary-mode download of a whole remote directory
//! - **BSD Checksums**: Validate files with the 16-bit `sum` checksum and block count
//!
//! # Example
//!
//! ```no_run
//! use ensembl_mirror::{validate_datasets, EmptySelection, Lookup, MirrorConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MirrorConfig::default();
//! let lookup = Lookup::from_path(&config.lookup_path)?;
//! let resolution = lookup.resolve(&["homo_sapiens_*"], EmptySelection::Nothing);
//!
//! let report = validate_datasets(&config, &lookup, &resolution, |dataset| {
//!     for diagnostic in dataset.diagnostics() {
//!         println!("{}", diagnostic);
//!     }
//! })
//! .await?;
//! println!("success: {}", report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod checksum;
pub mod download;
pub mod error;
pub mod lookup;
pub mod manifest;
pub mod orchestrator;
pub mod types;
pub mod verify;

pub use checksum::{block_count, file_sum, BsdChecksum, FileSum};
pub use error::MirrorError;
pub use lookup::{Lookup, Resolution};
pub use orchestrator::{download_datasets, validate_datasets};
pub use types::{
    default_lookup_path, DatasetRecord, EmptySelection, ManifestEntry, MirrorConfig,
    LOOKUP_ENV_VAR, MANIFEST_FILE,
};
pub use verify::{DatasetReport, ValidationReport};
