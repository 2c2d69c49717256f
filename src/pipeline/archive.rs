//! Archive assembly: pack a finished scratch directory into one ZIP.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File extension of split archives.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Archive path for a scratch directory: same location, `.zip` appended.
pub fn archive_path_for(scratch: &Path) -> PathBuf {
    scratch.with_extension(ARCHIVE_EXTENSION)
}

/// Write every file in `entries` (names relative to `scratch`, in order)
/// into a deflated ZIP at `dest`.
///
/// Any file in `scratch` that is not listed is an error: the archive must
/// hold exactly what the job wrote.
pub fn zip_directory(scratch: &Path, entries: &[String], dest: &Path) -> io::Result<u64> {
    let on_disk = std::fs::read_dir(scratch)?.count();
    if on_disk != entries.len() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!(
                "scratch directory holds {on_disk} files but {} pages were written",
                entries.len()
            ),
        ));
    }

    let mut zip = ZipWriter::new(File::create(dest)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for name in entries {
        zip.start_file(name.as_str(), options)?;
        let mut page = File::open(scratch.join(name))?;
        io::copy(&mut page, &mut zip)?;
    }

    let file = zip.finish()?;
    let size = file.metadata()?.len();
    debug!("Archived {} entries → {} ({} bytes)", entries.len(), dest.display(), size);
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    #[test]
    fn archive_sits_next_to_scratch_dir() {
        let p = archive_path_for(Path::new("/media/tmp/certificates/1b4e28ba"));
        assert_eq!(p, PathBuf::from("/media/tmp/certificates/1b4e28ba.zip"));
    }

    #[test]
    fn entries_keep_requested_order() {
        let tmp = TempDir::new().unwrap();
        let scratch = tmp.path().join("job");
        std::fs::create_dir(&scratch).unwrap();
        for (name, body) in [("Yusuf.pdf", "y"), ("Ibrahim.pdf", "i")] {
            std::fs::write(scratch.join(name), body).unwrap();
        }

        let dest = archive_path_for(&scratch);
        let order = vec!["Yusuf.pdf".to_string(), "Ibrahim.pdf".to_string()];
        zip_directory(&scratch, &order, &dest).unwrap();

        let mut archive = ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, order);

        let mut body = String::new();
        archive
            .by_name("Ibrahim.pdf")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "i");
    }

    #[test]
    fn unlisted_files_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let scratch = tmp.path().join("job");
        std::fs::create_dir(&scratch).unwrap();
        std::fs::write(scratch.join("a.pdf"), "a").unwrap();
        std::fs::write(scratch.join("stray.pdf"), "b").unwrap();

        let err = zip_directory(&scratch, &["a.pdf".into()], &archive_path_for(&scratch));
        assert!(err.is_err());
    }
}
