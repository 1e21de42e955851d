//! Main orchestration logic for downloading and validating datasets.

use crate::download::{mirror_archive, FtpArchive, RemoteArchive};
use crate::error::MirrorError;
use crate::lookup::{Lookup, Resolution};
use crate::types::MirrorConfig;
use crate::verify::{verify_dataset, DatasetReport, ValidationReport};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Creates a progress bar in the crate's style, hidden when stderr is not a
/// terminal so logs and piped output stay clean.
fn progress_bar() -> indicatif::ProgressBar {
    if !atty::is(atty::Stream::Stderr) {
        return indicatif::ProgressBar::hidden();
    }

    let pb = indicatif::ProgressBar::new(0);
    if let Ok(style) = indicatif::ProgressStyle::default_bar().template(
        "{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg} | {elapsed_precise} elapsed",
    ) {
        pb.set_style(style.progress_chars("█▓▒░ "));
    }
    pb
}

/// Downloads every resolved dataset into `config.basedir`, one after another.
///
/// For each dataset the local directory `basedir/<database>` is created if
/// needed, then every file of the remote directory is fetched into it. Any
/// failure aborts the whole run.
///
/// # Arguments
///
/// * `config` - Mirror configuration
/// * `lookup` - Dataset table
/// * `names` - Resolved dataset names
///
/// # Example
///
/// ```no_run
/// use ensembl_mirror::{download_datasets, EmptySelection, Lookup, MirrorConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = MirrorConfig::default();
/// let lookup = Lookup::from_path(&config.lookup_path)?;
/// let resolution = lookup.resolve(&["homo_sapiens_core"], EmptySelection::Nothing);
/// download_datasets(&config, &lookup, &resolution.names).await?;
/// # Ok(())
/// # }
/// ```
pub async fn download_datasets(
    config: &MirrorConfig,
    lookup: &Lookup,
    names: &[String],
) -> Result<(), MirrorError> {
    for (name, record) in lookup.records(names) {
        let local_dir = record.local_dir(&config.basedir);
        std::fs::create_dir_all(&local_dir)?;

        let started = Instant::now();
        let server = record.server.clone();
        let remote_path = record.path.clone();
        let target = local_dir.clone();
        let database = record.database.clone();

        let files = tokio::task::spawn_blocking(move || -> Result<usize, MirrorError> {
            let mut archive = FtpArchive::open(&server, &remote_path)?;
            info!("Listing database files for {}", database);

            let pb = progress_bar();
            let written = mirror_archive(&mut archive, &target, &pb)?;
            pb.finish_and_clear();

            archive.close()?;
            Ok(written.len())
        })
        .await??;

        info!(
            "✅ Downloaded {} files for {} into {} in {}",
            files,
            name,
            local_dir.display(),
            humantime::format_duration(Duration::from_secs(started.elapsed().as_secs()))
        );
    }

    Ok(())
}

/// Validates every resolved dataset against its `CHECKSUMS.gz`.
///
/// A missing dataset directory is recorded and the next dataset is checked.
/// Patterns in `resolution.unmatched` are carried into the report and make
/// it fail. `on_dataset` sees each dataset's report as soon as it is checked,
/// so problems found before a fatal error still reach the caller.
///
/// # Arguments
///
/// * `config` - Mirror configuration
/// * `lookup` - Dataset table
/// * `resolution` - Resolved dataset names and unmatched patterns
/// * `on_dataset` - Called once per finished dataset
///
/// # Returns
///
/// A report with one entry per dataset, or an error for unrecoverable I/O.
pub async fn validate_datasets<F>(
    config: &MirrorConfig,
    lookup: &Lookup,
    resolution: &Resolution,
    mut on_dataset: F,
) -> Result<ValidationReport, MirrorError>
where
    F: FnMut(&DatasetReport),
{
    let mut report = ValidationReport {
        datasets: Vec::with_capacity(resolution.names.len()),
        unmatched_patterns: resolution.unmatched.clone(),
    };

    let pb = progress_bar();
    for (name, record) in lookup.records(&resolution.names) {
        let directory = record.local_dir(&config.basedir);
        let dataset = verify_dataset(name, &directory, &pb).await?;
        if !dataset.is_correct() {
            warn!("Dataset {} failed validation", name);
        }
        pb.suspend(|| on_dataset(&dataset));
        report.datasets.push(dataset);
    }
    pb.finish_and_clear();

    Ok(report)
}
