//! `CHECKSUMS.gz` reading.

use crate::error::MirrorError;
use crate::types::ManifestEntry;
use flate2::read::GzDecoder;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Reads and parses a gzip-compressed manifest.
///
/// A missing or corrupt file is returned as [`MirrorError::Manifest`].
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>, MirrorError> {
    let file = std::fs::File::open(path).map_err(|source| MirrorError::Manifest {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(GzDecoder::new(BufReader::new(file)), path)
}

/// Parses decompressed manifest text, one `checksum blocks filename` per line.
///
/// `path` is only used in error messages.
pub fn parse_manifest<R: Read>(reader: R, path: &Path) -> Result<Vec<ManifestEntry>, MirrorError> {
    let mut entries = Vec::new();

    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.map_err(|source| MirrorError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let [checksum, blocks, filename] = fields[..] else {
            return Err(MirrorError::MalformedManifest {
                path: path.to_path_buf(),
                line: index + 1,
                content: line.clone(),
            });
        };

        entries.push(ManifestEntry {
            checksum: checksum.to_string(),
            blocks: blocks.to_string(),
            filename: filename.to_string(),
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn parse(text: &str) -> Result<Vec<ManifestEntry>, MirrorError> {
        parse_manifest(text.as_bytes(), Path::new("CHECKSUMS.gz"))
    }

    #[test]
    fn test_parses_whitespace_runs() {
        let entries = parse("08403 1 a.txt\n  123\t\t45   b.sql.gz  \n").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].checksum, "08403");
        assert_eq!(entries[1].blocks, "45");
        assert_eq!(entries[1].filename, "b.sql.gz");
    }

    #[test]
    fn test_skips_blank_lines() {
        let entries = parse("\n1 1 a\n   \n").unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_wrong_field_count_reports_line() {
        match parse("1 1 a\n2 b\n") {
            Err(MirrorError::MalformedManifest { line, content, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(content, "2 b");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(parse("1 1 a b\n").is_err());
    }

    #[test]
    fn test_reads_gzip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHECKSUMS.gz");
        let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"8403 1 a.txt\n0 0 empty.txt\n").unwrap();
        encoder.finish().unwrap();

        let entries = read_manifest(&path).unwrap();
        assert_eq!(
            entries[1],
            ManifestEntry {
                checksum: "0".to_string(),
                blocks: "0".to_string(),
                filename: "empty.txt".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_manifest_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHECKSUMS.gz");
        let err = read_manifest(&path).unwrap_err();
        assert!(matches!(err, MirrorError::Manifest { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn test_corrupt_gzip_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHECKSUMS.gz");
        std::fs::write(&path, b"not gzip at all").unwrap();
        assert!(matches!(read_manifest(&path), Err(MirrorError::Manifest { .. })));
    }
}
