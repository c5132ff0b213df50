//! Archive and extraction primitives
//!
//! The assembler and packager only see the `Archiver` trait, so tests can
//! substitute stub implementations; the service wires in `ZipArchiver`.

use std::fs::File;
use std::io;
use std::path::Path;

use thiserror::Error;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;

/// Archive handling errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Malformed or unreadable zip data
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Archive/extract capability
pub trait Archiver: Send + Sync {
    /// Extract `archive` into `dest`, creating directories as needed
    fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ArchiveError>;

    /// Archive the contents of `dir` (relative paths, `dir` itself excluded)
    /// into a new archive at `dest`
    fn archive_dir(&self, dir: &Path, dest: &Path) -> Result<(), ArchiveError>;
}

/// Production zip implementation
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ArchiveError> {
        let file = File::open(archive)?;
        let mut zip = zip::ZipArchive::new(file)?;
        zip.extract(dest)?;
        Ok(())
    }

    fn archive_dir(&self, dir: &Path, dest: &Path) -> Result<(), ArchiveError> {
        let file = File::create(dest)?;
        let mut zip = zip::ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for entry in WalkDir::new(dir) {
            let entry = entry.map_err(io::Error::from)?;
            let path = entry.path();
            if path == dir {
                continue;
            }
            // Zip entry names are always forward-slash relative paths
            let name = path
                .strip_prefix(dir)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");

            if entry.file_type().is_dir() {
                zip.add_directory(name, options)?;
            } else {
                zip.start_file(name, options)?;
                let mut source = File::open(path)?;
                io::copy(&mut source, &mut zip)?;
            }
        }

        zip.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_dir_then_extract_preserves_tree() {
        let work = tempfile::tempdir().unwrap();
        let src = work.path().join("src");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("top.txt"), b"top").unwrap();
        std::fs::write(src.join("nested/deep.bin"), b"deep").unwrap();

        let archive = work.path().join("out.zip");
        ZipArchiver.archive_dir(&src, &archive).unwrap();
        assert!(archive.is_file());

        let dest = work.path().join("dest");
        ZipArchiver.extract(&archive, &dest).unwrap();
        assert_eq!(std::fs::read(dest.join("top.txt")).unwrap(), b"top");
        assert_eq!(std::fs::read(dest.join("nested/deep.bin")).unwrap(), b"deep");
    }

    #[test]
    fn extract_rejects_non_archive_payload() {
        let work = tempfile::tempdir().unwrap();
        let bogus = work.path().join("not-a.zip");
        std::fs::write(&bogus, b"plain bytes, no zip magic").unwrap();

        let err = ZipArchiver.extract(&bogus, work.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::Zip(_)));
    }
}
