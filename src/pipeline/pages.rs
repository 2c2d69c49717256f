//! Source document handling: validation, page count, single-page extraction.
//!
//! Pages are cut out with `lopdf` rather than pdfium so splitting works
//! without the native library: the document is parsed once, then for each
//! page a clone has every other page deleted and its orphaned objects
//! pruned before being serialised.

use crate::error::DocumentError;
use lopdf::Document;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// File extension of split pages.
pub const PAGE_EXTENSION: &str = "pdf";

/// The uploaded multi-page PDF. Immutable once loaded; clones share the
/// parsed document.
#[derive(Clone)]
pub struct SourceDocument {
    bytes: Arc<Vec<u8>>,
    document: Arc<Document>,
    page_count: usize,
}

impl fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceDocument")
            .field("bytes", &self.bytes.len())
            .field("page_count", &self.page_count)
            .finish()
    }
}

impl SourceDocument {
    /// Parse `bytes` as a PDF.
    ///
    /// Fails with [`DocumentError::NotAPdf`] when the `%PDF` magic is missing
    /// and [`DocumentError::Corrupt`] when the structure cannot be parsed.
    /// A document with zero pages is accepted; callers decide whether that
    /// is an error.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, DocumentError> {
        let bytes = bytes.into();
        if !bytes.starts_with(b"%PDF") {
            return Err(DocumentError::NotAPdf {
                magic: bytes.iter().take(4).copied().collect(),
            });
        }

        let document = Document::load_mem(&bytes).map_err(|e| DocumentError::Corrupt {
            detail: e.to_string(),
        })?;
        let page_count = document.get_pages().len();
        debug!("Loaded PDF: {} bytes, {} pages", bytes.len(), page_count);

        Ok(Self {
            bytes: Arc::new(bytes),
            document: Arc::new(document),
            page_count,
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// The raw bytes as uploaded.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Serialise page `index` (0-based) as a standalone single-page PDF.
    pub fn page(&self, index: usize) -> Result<PageDocument, DocumentError> {
        if index >= self.page_count {
            return Err(DocumentError::PageOutOfRange {
                page: index,
                total: self.page_count,
            });
        }

        let mut single = Document::clone(&self.document);
        let keep = index as u32 + 1;
        // lopdf numbers pages from 1; delete from the back so the remaining
        // numbers stay valid.
        let doomed: Vec<u32> = (1..=self.page_count as u32)
            .rev()
            .filter(|&p| p != keep)
            .collect();
        for page_num in doomed {
            single.delete_pages(&[page_num]);
        }
        single.prune_objects();
        single.compress();

        let mut bytes = Vec::new();
        single
            .save_to(&mut bytes)
            .map_err(|e| DocumentError::Corrupt {
                detail: format!("failed to save page {index}: {e}"),
            })?;

        Ok(PageDocument { index, bytes })
    }

    /// [`SourceDocument::page`] on the blocking pool.
    pub async fn page_async(&self, index: usize) -> Result<PageDocument, DocumentError> {
        let doc = self.clone();
        tokio::task::spawn_blocking(move || doc.page(index))
            .await
            .map_err(|e| DocumentError::Corrupt {
                detail: format!("page task panicked: {e}"),
            })?
    }
}

/// One page of a [`SourceDocument`] as its own PDF.
#[derive(Debug, Clone)]
pub struct PageDocument {
    pub index: usize,
    pub bytes: Vec<u8>,
}
