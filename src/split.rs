//! Split a certificate PDF into one named PDF per page, packed in a ZIP.
//!
//! ## Job layout
//!
//! ```text
//! <archive_dir>/
//!   ├─ <uuid>/          scratch directory, exists only while the job runs
//!   │    ├─ Ibrahim.pdf
//!   │    ├─ Ibrahim_1.pdf
//!   │    └─ Yusuf.pdf
//!   └─ <uuid>.zip       the deliverable
//! ```
//!
//! Every job gets a fresh UUID, so concurrent jobs never see each other's
//! files and their collision numbering cannot interfere.
//!
//! ## Ordering
//!
//! Extraction of upcoming pages may run ahead (`extract_concurrency`), but
//! results are consumed strictly in page order, and each page's name is
//! resolved against the scratch directory immediately before that page is
//! written. Two pages named "Ibrahim" therefore always become
//! `Ibrahim.pdf` then `Ibrahim_1.pdf`, in that order.
//!
//! ## Failure
//!
//! The first failing page aborts the job. The scratch directory is removed
//! explicitly on the normal exit paths; [`ScratchDir`]'s `Drop` is the
//! fallback for early returns and panics. A partially written archive is
//! deleted, so a failed job leaves nothing.

use crate::config::SplitterConfig;
use crate::error::{PageFailure, SplitError};
use crate::observe::log_failure;
use crate::output::{NamedPage, SplitArchive};
use crate::pipeline::archive::{archive_path_for, zip_directory};
use crate::pipeline::filename::{desired_path, resolve_collision, sanitize, trim_to_newline};
use crate::pipeline::pages::{PageDocument, SourceDocument, PAGE_EXTENSION};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Split `document` into one PDF per page named after the text found at
/// `name_offset`, and pack them into a ZIP under
/// [`SplitterConfig::archive_dir`].
///
/// For each page the name is the page text from char `name_offset` up to
/// the next newline, passed through [`crate::sanitize`]. An offset past the
/// end of a page's text gives an empty name (`.pdf`, `_1.pdf`, …), not an
/// error.
///
/// # Errors
/// - [`SplitError::PageFailed`] — a page could not be cut, extracted or
///   written; carries the 0-based page index
/// - [`SplitError::ArchiveFailed`] — all pages were written but zipping failed
/// - [`SplitError::Io`] — the archive directory could not be created
pub async fn split(
    document: &SourceDocument,
    name_offset: usize,
    config: &SplitterConfig,
) -> Result<SplitArchive, SplitError> {
    log_failure("split", split_inner(document, name_offset, config)).await
}

/// Blocking wrapper around [`split`].
///
/// Creates a temporary tokio runtime internally, so it must not be called
/// from inside another runtime.
pub fn split_sync(
    document: &SourceDocument,
    name_offset: usize,
    config: &SplitterConfig,
) -> Result<SplitArchive, SplitError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SplitError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(split(document, name_offset, config))
}

async fn split_inner(
    document: &SourceDocument,
    name_offset: usize,
    config: &SplitterConfig,
) -> Result<SplitArchive, SplitError> {
    let start = Instant::now();
    let archive_dir = config.archive_dir();
    tokio::fs::create_dir_all(&archive_dir)
        .await
        .map_err(|e| SplitError::Io {
            path: archive_dir.clone(),
            source: e,
        })?;

    let mut scratch = ScratchDir::new(archive_dir.join(Uuid::new_v4().to_string()));
    let total_pages = document.page_count();
    info!(
        "Splitting {} pages at name offset {} into {}",
        total_pages,
        name_offset,
        scratch.path().display()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_split_start(total_pages);
    }

    // ── Cut + extract, ordered, with bounded look-ahead ──────────────────
    let extracted = stream::iter(0..total_pages)
        .map(|index| {
            let extractor = Arc::clone(&config.extractor);
            async move {
                let outcome = async {
                    let page = document.page_async(index).await.map_err(PageFailure::Cut)?;
                    let text = extractor.extract(&page.bytes).await?;
                    Ok::<_, PageFailure>((page, text))
                }
                .await;
                (index, outcome)
            }
        })
        .buffered(config.extract_concurrency);
    futures::pin_mut!(extracted);

    // ── Resolve + persist, strictly one page at a time ───────────────────
    let mut pages = Vec::with_capacity(total_pages);
    while let Some((index, outcome)) = extracted.next().await {
        let written = match outcome {
            Ok((page, text)) => write_page(&mut scratch, page, &text, name_offset).await,
            Err(cause) => Err(cause),
        };

        match written {
            Ok(named) => {
                debug!("Page {} → {}", index + 1, named.file_name);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_written(index, total_pages, &named.file_name);
                }
                pages.push(named);
            }
            Err(cause) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(index, total_pages, &cause.to_string());
                }
                scratch.remove().await;
                return Err(SplitError::PageFailed { page: index, cause });
            }
        }
    }

    // ── Archive ──────────────────────────────────────────────────────────
    scratch.ensure_created().await.map_err(|e| SplitError::Io {
        path: scratch.path().to_path_buf(),
        source: e,
    })?;
    let archive = archive_path_for(scratch.path());
    let entries: Vec<String> = pages.iter().map(|p| p.file_name.clone()).collect();

    let scratch_path = scratch.path().to_path_buf();
    let dest = archive.clone();
    let zipped = tokio::task::spawn_blocking(move || zip_directory(&scratch_path, &entries, &dest))
        .await
        .map_err(|e| e.to_string())
        .and_then(|r| r.map_err(|e| e.to_string()));

    if let Err(detail) = zipped {
        scratch.remove().await;
        remove_partial_archive(&archive).await;
        return Err(SplitError::ArchiveFailed {
            path: archive,
            detail,
        });
    }

    scratch.remove().await;
    info!(
        "Split complete: {} pages → {} in {}ms",
        pages.len(),
        archive.display(),
        start.elapsed().as_millis()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_archive_complete(&archive, pages.len());
    }

    Ok(SplitArchive {
        path: archive,
        pages,
    })
}

/// Name `page` from its text and write it into the scratch directory.
async fn write_page(
    scratch: &mut ScratchDir,
    page: PageDocument,
    text: &str,
    name_offset: usize,
) -> Result<NamedPage, PageFailure> {
    let sanitized_name = sanitize(trim_to_newline(text, name_offset));

    scratch
        .ensure_created()
        .await
        .map_err(|source| PageFailure::Write {
            path: scratch.path().to_path_buf(),
            source,
        })?;

    let dir = scratch.path();
    let wanted = desired_path(dir, &sanitized_name, PAGE_EXTENSION);
    let path = resolve_collision(&wanted, dir, &sanitized_name, PAGE_EXTENSION);

    tokio::fs::write(&path, &page.bytes)
        .await
        .map_err(|source| PageFailure::Write {
            path: path.clone(),
            source,
        })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(NamedPage {
        page_index: page.index,
        sanitized_name,
        file_name,
    })
}

async fn remove_partial_archive(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not remove partial archive {}: {}", path.display(), e);
        }
    }
}

/// A job-local directory, created on first use and removed on drop.
struct ScratchDir {
    path: PathBuf,
    created: bool,
}

impl ScratchDir {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            created: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_created(&mut self) -> std::io::Result<()> {
        if !self.created {
            tokio::fs::create_dir_all(&self.path).await?;
            self.created = true;
        }
        Ok(())
    }

    /// Remove the directory without blocking the runtime. `Drop` then has
    /// nothing left to do.
    async fn remove(mut self) {
        if !self.created {
            return;
        }
        self.created = false;
        if let Err(e) = tokio::fs::remove_dir_all(&self.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove scratch directory {}: {}", self.path.display(), e);
            }
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.created {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove scratch directory {}: {}", self.path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::pages::tests::pdf_with_pages;
    use tempfile::TempDir;

    #[tokio::test]
    async fn scratch_dir_is_lazy_and_removed_on_drop() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("job");
        {
            let mut scratch = ScratchDir::new(path.clone());
            assert!(!path.exists());
            scratch.ensure_created().await.unwrap();
            std::fs::write(path.join("a.pdf"), b"x").unwrap();
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn scratch_dir_remove_deletes_without_drop() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("job");
        let mut scratch = ScratchDir::new(path.clone());
        scratch.ensure_created().await.unwrap();
        std::fs::write(path.join("a.pdf"), b"x").unwrap();

        scratch.remove().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn never_created_scratch_dir_leaves_foreign_dir_alone() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("job");
        std::fs::create_dir(&path).unwrap();

        ScratchDir::new(path.clone()).remove().await;
        drop(ScratchDir::new(path.clone()));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn write_page_names_from_offset() {
        let tmp = TempDir::new().unwrap();
        let mut scratch = ScratchDir::new(tmp.path().join("job"));
        let doc = SourceDocument::from_bytes(pdf_with_pages(&["x"])).unwrap();

        let named = write_page(&mut scratch, doc.page(0).unwrap(), "No: 7\nAli Khan\n", 6)
            .await
            .unwrap();
        assert_eq!(named.sanitized_name, "Ali_Khan");
        assert_eq!(named.file_name, "Ali_Khan.pdf");
        assert!(scratch.path().join("Ali_Khan.pdf").exists());
    }

    #[tokio::test]
    async fn offset_past_text_gives_empty_names() {
        let tmp = TempDir::new().unwrap();
        let mut scratch = ScratchDir::new(tmp.path().join("job"));
        let doc = SourceDocument::from_bytes(pdf_with_pages(&["x", "y"])).unwrap();

        let a = write_page(&mut scratch, doc.page(0).unwrap(), "short", 40)
            .await
            .unwrap();
        let b = write_page(&mut scratch, doc.page(1).unwrap(), "", 40)
            .await
            .unwrap();
        assert_eq!(a.file_name, ".pdf");
        assert_eq!(b.file_name, "_1.pdf");
    }
}
