//! Error types for the certsplit library.
//!
//! Each pipeline stage owns its error type so callers can match on exactly
//! the failures a given entry point can produce:
//!
//! * [`ExtractionError`] — the text-extraction backend could not be reached
//!   ([`ExtractionError::BackendUnavailable`]) or rejected the page
//!   ([`ExtractionError::BackendFailure`]). "No text found" is not an error.
//!
//! * [`CalibrationError`] — returned by [`crate::calibrate()`].
//!
//! * [`SplitError`] — returned by [`crate::split()`]. A failure on a single
//!   page aborts the job and carries the page index plus a [`PageFailure`].
//!
//! Nothing in the library retries. Errors are logged once at the entry point
//! (see [`crate::observe`]) and handed back unchanged.

use std::path::PathBuf;
use thiserror::Error;

/// Failure talking to a text-extraction backend.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Connection refused, DNS failure, timeout, or native library missing.
    #[error("Text extraction backend '{backend}' is unavailable: {detail}")]
    BackendUnavailable { backend: String, detail: String },

    /// The backend answered but could not process the page
    /// (malformed document, HTTP error status, unreadable response).
    #[error("Text extraction backend '{backend}' failed: {detail}")]
    BackendFailure { backend: String, detail: String },
}

/// Problems with the source PDF itself.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The bytes do not start with the `%PDF` magic.
    #[error("Input is not a PDF document (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// The PDF could not be parsed or re-serialised.
    #[error("PDF document is corrupt: {detail}")]
    Corrupt { detail: String },

    /// The PDF parsed but contains no pages.
    #[error("PDF document has no pages")]
    Empty,

    /// A page index beyond the document was requested.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },
}

/// A page could not be rasterised.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RenderError(pub String);

/// Errors returned by [`crate::calibrate()`].
#[derive(Debug, Error)]
pub enum CalibrationError {
    /// The first page's text contains no alphabetic character, so there is
    /// nothing that could be the start of a name.
    #[error("First page text contains no alphabetic character")]
    NoAlphabeticContent,

    /// Page 1 could not be rasterised or encoded as an image.
    #[error("Failed to render calibration preview: {detail}")]
    RenderFailure { detail: String },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Could not create the image directory or write the preview.
    #[error("Failed to write calibration image '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A blocking worker panicked or the runtime could not start.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a single page of a split job failed.
#[derive(Debug, Error)]
pub enum PageFailure {
    /// The page could not be cut out of the source document.
    #[error("could not extract page as a standalone PDF: {0}")]
    Cut(#[source] DocumentError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The page file could not be written to the scratch directory.
    #[error("could not write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned by [`crate::split()`].
#[derive(Debug, Error)]
pub enum SplitError {
    /// Page `page` (0-indexed) failed; the whole job was aborted and its
    /// scratch directory removed.
    #[error("Page {page} failed: {cause}")]
    PageFailed {
        page: usize,
        #[source]
        cause: PageFailure,
    },

    /// Every page was written but the archive could not be produced.
    #[error("Failed to create archive '{path}': {detail}")]
    ArchiveFailed { path: PathBuf, detail: String },

    /// Could not prepare the archive directory.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A blocking worker panicked or was cancelled.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RenderError> for CalibrationError {
    fn from(e: RenderError) -> Self {
        CalibrationError::RenderFailure { detail: e.0 }
    }
}

/// Builder validation failed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Render an error and every `source()` below it as `outer: inner: ...`.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        // `#[error(transparent)]` and `{cause}` formatting already inline the
        // inner message; skip links that would only repeat it.
        if !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = inner.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_failed_display_includes_index_and_cause() {
        let e = SplitError::PageFailed {
            page: 1,
            cause: PageFailure::Extraction(ExtractionError::BackendUnavailable {
                backend: "tika".into(),
                detail: "connection refused".into(),
            }),
        };
        let msg = e.to_string();
        assert!(msg.contains("Page 1"), "got: {msg}");
        assert!(msg.contains("connection refused"), "got: {msg}");
    }

    #[test]
    fn calibration_wraps_extraction_transparently() {
        let e: CalibrationError = ExtractionError::BackendFailure {
            backend: "tika".into(),
            detail: "HTTP 422".into(),
        }
        .into();
        assert!(matches!(e, CalibrationError::Extraction(_)));
        assert!(e.to_string().contains("HTTP 422"));
    }

    #[test]
    fn cut_failure_keeps_document_error_as_source() {
        let e = PageFailure::Cut(DocumentError::PageOutOfRange { page: 3, total: 3 });
        assert!(e.to_string().starts_with("could not extract page"), "got: {e}");
        let source = std::error::Error::source(&e).unwrap();
        assert!(source.downcast_ref::<DocumentError>().is_some());
    }

    #[test]
    fn not_a_pdf_display() {
        let e = DocumentError::NotAPdf {
            magic: b"PK\x03\x04".to_vec(),
        };
        assert!(e.to_string().contains("not a PDF"));
    }

    #[test]
    fn error_chain_walks_sources_without_repeating() {
        let e = SplitError::PageFailed {
            page: 2,
            cause: PageFailure::Write {
                path: PathBuf::from("/tmp/x.pdf"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            },
        };
        let chain = error_chain(&e);
        assert!(chain.starts_with("Page 2 failed"));
        assert_eq!(chain.matches("disk full").count(), 1, "got: {chain}");
    }
}
