//! Dataset download over anonymous FTP.

use crate::error::MirrorError;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use suppaftp::types::FileType;
use suppaftp::{FtpStream, Mode};
use tracing::{debug, info};

const DEFAULT_FTP_PORT: u16 = 21;
const ANONYMOUS_USER: &str = "anonymous";
const ANONYMOUS_PASSWORD: &str = "anonymous@";

/// A remote directory whose files can be listed and fetched one by one.
pub trait RemoteArchive {
    /// Names of the entries in the remote directory.
    fn list(&mut self) -> Result<Vec<String>, MirrorError>;

    /// Streams one remote file into `out`, returning the number of bytes copied.
    fn fetch(&mut self, name: &str, out: &mut dyn Write) -> Result<u64, MirrorError>;

    /// Ends the session.
    fn close(self) -> Result<(), MirrorError>;
}

/// An FTP session positioned on a dataset's remote directory.
pub struct FtpArchive {
    stream: FtpStream,
}

impl FtpArchive {
    /// Connects, logs in anonymously and changes to `remote_path`.
    pub fn open(server: &str, remote_path: &str) -> Result<Self, MirrorError> {
        info!("Logging into {}", server);
        let mut stream = FtpStream::connect(control_address(server))?;
        stream.login(ANONYMOUS_USER, ANONYMOUS_PASSWORD)?;
        stream.set_mode(Mode::Passive);
        stream.transfer_type(FileType::Binary)?;

        debug!("Changing directory to {}", remote_path);
        stream.cwd(remote_path)?;

        Ok(Self { stream })
    }
}

impl RemoteArchive for FtpArchive {
    fn list(&mut self) -> Result<Vec<String>, MirrorError> {
        Ok(self.stream.nlst(None)?)
    }

    fn fetch(&mut self, name: &str, out: &mut dyn Write) -> Result<u64, MirrorError> {
        let mut data = self.stream.retr_as_stream(name)?;
        let copied = io::copy(&mut data, out)?;
        self.stream.finalize_retr_stream(data)?;
        Ok(copied)
    }

    fn close(mut self) -> Result<(), MirrorError> {
        self.stream.quit()?;
        Ok(())
    }
}

/// Appends the default FTP port when `server` does not carry one.
pub fn control_address(server: &str) -> String {
    if server.contains(':') {
        server.to_string()
    } else {
        format!("{}:{}", server, DEFAULT_FTP_PORT)
    }
}

/// Local file name for a listed entry. Some servers answer `NLST` with
/// paths, so only the last component is kept.
fn local_name(entry: &str) -> &str {
    Path::new(entry)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(entry)
}

/// Copies every file of `archive` into `local_dir`, overwriting existing files.
///
/// # Arguments
///
/// * `archive` - An open remote directory
/// * `local_dir` - Existing local directory to write into
/// * `pb` - Progress bar, one tick per file
///
/// # Returns
///
/// The local paths written, in listing order.
pub fn mirror_archive<A: RemoteArchive>(
    archive: &mut A,
    local_dir: &Path,
    pb: &indicatif::ProgressBar,
) -> Result<Vec<PathBuf>, MirrorError> {
    let entries = archive.list()?;
    pb.set_length(entries.len() as u64);

    let mut written = Vec::with_capacity(entries.len());
    for entry in &entries {
        let local_target = local_dir.join(local_name(entry));
        info!("Downloading {}", local_target.display());
        pb.set_message(format!("| ⬇️  Downloading: {}", entry));

        let mut file = BufWriter::new(std::fs::File::create(&local_target)?);
        let bytes = archive.fetch(entry, &mut file)?;
        file.flush()?;
        debug!("Wrote {} bytes to {}", bytes, local_target.display());

        written.push(local_target);
        pb.inc(1);
    }

    Ok(written)
}
