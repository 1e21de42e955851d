//! BSD checksum and block counting, as printed by `sum -r`.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Block size used for the block count column of `CHECKSUMS.gz`.
pub const BLOCK_SIZE: u64 = 1024;

/// Running 16-bit BSD checksum.
///
/// For every byte the accumulator is rotated right by one bit and the byte
/// is added modulo 2^16. The rotate makes the result depend on byte order,
/// so input must be fed in file order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BsdChecksum(u16);

impl BsdChecksum {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.0 = bytes.iter().fold(self.0, |acc, &byte| {
            acc.rotate_right(1).wrapping_add(u16::from(byte))
        });
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

/// Number of 1024-byte blocks needed to hold `size` bytes.
pub fn block_count(size: u64) -> u64 {
    size.div_ceil(BLOCK_SIZE)
}

/// Checksum and block count of one local file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSum {
    pub checksum: u16,
    pub blocks: u64,
}

impl FileSum {
    /// Checksum rendered the way the manifest stores it (plain decimal).
    pub fn checksum_str(&self) -> String {
        self.checksum.to_string()
    }

    pub fn blocks_str(&self) -> String {
        self.blocks.to_string()
    }
}

/// Computes the BSD checksum of everything `reader` yields.
pub fn checksum_reader<R: Read>(mut reader: R) -> io::Result<u16> {
    let mut sum = BsdChecksum::new();
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        sum.update(&buffer[..n]);
    }

    Ok(sum.value())
}

/// Computes checksum and block count of a local file.
///
/// The block count comes from the file's metadata size, matching how the
/// manifest was produced on the server.
pub fn file_sum(path: &Path) -> io::Result<FileSum> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let checksum = checksum_reader(BufReader::with_capacity(1024 * 1024, file))?;

    Ok(FileSum {
        checksum,
        blocks: block_count(size),
    })
}
